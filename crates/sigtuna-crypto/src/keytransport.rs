#![forbid(unsafe_code)]

//! Key transport algorithms (RSA PKCS#1 v1.5, RSA-OAEP).
//!
//! Decryption distinguishes a key mismatch from every other failure: the RSA
//! primitive reports a padding check failure when the wrong private key is
//! used, and only that signal maps to `Error::WrongKey`. Callers rely on the
//! distinction to drive the candidate-key trial loop.

use sigtuna_core::{algorithm, Error};

/// Trait for key transport algorithms.
pub trait KeyTransportAlgorithm: Send {
    fn uri(&self) -> &'static str;
    fn encrypt(&self, public_key: &rsa::RsaPublicKey, key_data: &[u8]) -> Result<Vec<u8>, Error>;
    fn decrypt(
        &self,
        private_key: &rsa::RsaPrivateKey,
        encrypted: &[u8],
    ) -> Result<Vec<u8>, Error>;
}

/// Create a key transport algorithm from its URI.
pub fn from_uri(uri: &str) -> Result<Box<dyn KeyTransportAlgorithm>, Error> {
    match uri {
        algorithm::RSA_PKCS1 => Ok(Box::new(RsaPkcs1Transport)),
        algorithm::RSA_OAEP => Ok(Box::new(RsaOaepTransport)),
        _ => Err(Error::UnsupportedAlgorithm(format!("key transport: {uri}"))),
    }
}

/// Map an RSA decrypt error. A padding failure means the ciphertext was not
/// produced under this key pair; anything else is surfaced as-is.
fn map_decrypt_error(e: rsa::Error) -> Error {
    match e {
        rsa::Error::Decryption => Error::WrongKey,
        other => Error::Crypto(format!("RSA decrypt: {other}")),
    }
}

struct RsaPkcs1Transport;

impl KeyTransportAlgorithm for RsaPkcs1Transport {
    fn uri(&self) -> &'static str {
        algorithm::RSA_PKCS1
    }

    fn encrypt(&self, public_key: &rsa::RsaPublicKey, key_data: &[u8]) -> Result<Vec<u8>, Error> {
        use rsa::Pkcs1v15Encrypt;
        let mut rng = rand::thread_rng();
        public_key
            .encrypt(&mut rng, Pkcs1v15Encrypt, key_data)
            .map_err(|e| Error::Crypto(format!("RSA PKCS#1 encrypt: {e}")))
    }

    fn decrypt(
        &self,
        private_key: &rsa::RsaPrivateKey,
        encrypted: &[u8],
    ) -> Result<Vec<u8>, Error> {
        use rsa::Pkcs1v15Encrypt;
        private_key
            .decrypt(Pkcs1v15Encrypt, encrypted)
            .map_err(map_decrypt_error)
    }
}

/// RSA-OAEP with MGF1/SHA-1, the `rsa-oaep-mgf1p` profile.
struct RsaOaepTransport;

impl KeyTransportAlgorithm for RsaOaepTransport {
    fn uri(&self) -> &'static str {
        algorithm::RSA_OAEP
    }

    fn encrypt(&self, public_key: &rsa::RsaPublicKey, key_data: &[u8]) -> Result<Vec<u8>, Error> {
        use rsa::Oaep;
        let mut rng = rand::thread_rng();
        public_key
            .encrypt(&mut rng, Oaep::new::<sha1::Sha1>(), key_data)
            .map_err(|e| Error::Crypto(format!("RSA-OAEP encrypt: {e}")))
    }

    fn decrypt(
        &self,
        private_key: &rsa::RsaPrivateKey,
        encrypted: &[u8],
    ) -> Result<Vec<u8>, Error> {
        use rsa::Oaep;
        private_key
            .decrypt(Oaep::new::<sha1::Sha1>(), encrypted)
            .map_err(map_decrypt_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::pkcs8::DecodePrivateKey;

    const KEY_A: &str = include_str!("../../../fixtures/rsa-a.pem");
    const KEY_B: &str = include_str!("../../../fixtures/rsa-b.pem");

    fn key_pair(pem: &str) -> (rsa::RsaPrivateKey, rsa::RsaPublicKey) {
        let private = rsa::RsaPrivateKey::from_pkcs8_pem(pem).unwrap();
        let public = private.to_public_key();
        (private, public)
    }

    #[test]
    fn test_pkcs1_roundtrip() {
        let (private, public) = key_pair(KEY_A);
        let transport = from_uri(algorithm::RSA_PKCS1).unwrap();
        let key = [0x17u8; 32];
        let ct = transport.encrypt(&public, &key).unwrap();
        let pt = transport.decrypt(&private, &ct).unwrap();
        assert_eq!(pt, key);
    }

    #[test]
    fn test_oaep_roundtrip() {
        let (private, public) = key_pair(KEY_A);
        let transport = from_uri(algorithm::RSA_OAEP).unwrap();
        let key = [0x17u8; 32];
        let ct = transport.encrypt(&public, &key).unwrap();
        let pt = transport.decrypt(&private, &ct).unwrap();
        assert_eq!(pt, key);
    }

    #[test]
    fn test_wrong_key_is_distinguished() {
        let (_, public_a) = key_pair(KEY_A);
        let (private_b, _) = key_pair(KEY_B);
        let transport = from_uri(algorithm::RSA_PKCS1).unwrap();
        let ct = transport.encrypt(&public_a, &[0x17u8; 32]).unwrap();
        let result = transport.decrypt(&private_b, &ct);
        assert!(matches!(result, Err(Error::WrongKey)));
    }

    #[test]
    fn test_unknown_transport_uri() {
        let result = from_uri("http://www.w3.org/2001/04/xmlenc#kw-aes256");
        assert!(matches!(result, Err(Error::UnsupportedAlgorithm(_))));
    }
}
