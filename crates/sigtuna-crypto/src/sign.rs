#![forbid(unsafe_code)]

//! Signature algorithms. Only RSA-SHA256 is carried; the signing pipeline
//! fixes both the digest and signature algorithm to SHA-256.

use sigtuna_core::{algorithm, Error};

/// Sign `data` with `private_key` using the algorithm named by `uri`.
pub fn sign(uri: &str, private_key: &rsa::RsaPrivateKey, data: &[u8]) -> Result<Vec<u8>, Error> {
    use sha2::Digest;
    match uri {
        algorithm::RSA_SHA256 => {
            let hashed = sha2::Sha256::digest(data);
            private_key
                .sign(rsa::Pkcs1v15Sign::new::<sha2::Sha256>(), &hashed)
                .map_err(|e| Error::Crypto(format!("RSA-SHA256 sign: {e}")))
        }
        _ => Err(Error::UnsupportedAlgorithm(format!("signature: {uri}"))),
    }
}

/// Verify an RSA-SHA256 signature. Exposed for tests and callers that need
/// to check their own output; full XML-DSig verification lives elsewhere.
pub fn verify(
    uri: &str,
    public_key: &rsa::RsaPublicKey,
    data: &[u8],
    signature: &[u8],
) -> Result<(), Error> {
    use sha2::Digest;
    match uri {
        algorithm::RSA_SHA256 => {
            let hashed = sha2::Sha256::digest(data);
            public_key
                .verify(rsa::Pkcs1v15Sign::new::<sha2::Sha256>(), &hashed, signature)
                .map_err(|e| Error::Crypto(format!("RSA-SHA256 verify: {e}")))
        }
        _ => Err(Error::UnsupportedAlgorithm(format!("signature: {uri}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::pkcs8::DecodePrivateKey;

    const KEY_A: &str = include_str!("../../../fixtures/rsa-a.pem");

    #[test]
    fn test_rsa_sha256_sign_verify() {
        let private = rsa::RsaPrivateKey::from_pkcs8_pem(KEY_A).unwrap();
        let public = private.to_public_key();
        let data = b"<SignedInfo>digest</SignedInfo>";
        let sig = sign(algorithm::RSA_SHA256, &private, data).unwrap();
        verify(algorithm::RSA_SHA256, &public, data, &sig).unwrap();
    }

    #[test]
    fn test_rsa_sha256_verify_rejects_tampered_data() {
        let private = rsa::RsaPrivateKey::from_pkcs8_pem(KEY_A).unwrap();
        let public = private.to_public_key();
        let sig = sign(algorithm::RSA_SHA256, &private, b"original").unwrap();
        assert!(verify(algorithm::RSA_SHA256, &public, b"tampered", &sig).is_err());
    }
}
