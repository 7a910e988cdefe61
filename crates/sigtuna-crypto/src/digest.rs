#![forbid(unsafe_code)]

//! Digest algorithms (SHA-1, SHA-256).

use sigtuna_core::{algorithm, Error};

/// Compute a digest over `data` using the algorithm named by `uri`.
pub fn digest(uri: &str, data: &[u8]) -> Result<Vec<u8>, Error> {
    use sha2::Digest;
    match uri {
        algorithm::SHA1 => {
            let mut hasher = sha1::Sha1::new();
            hasher.update(data);
            Ok(hasher.finalize().to_vec())
        }
        algorithm::SHA256 => {
            let mut hasher = sha2::Sha256::new();
            hasher.update(data);
            Ok(hasher.finalize().to_vec())
        }
        _ => Err(Error::UnsupportedAlgorithm(format!("digest: {uri}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        let out = digest(algorithm::SHA256, b"abc").unwrap();
        assert_eq!(
            hex::encode(out),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_sha1_known_vector() {
        let out = digest(algorithm::SHA1, b"abc").unwrap();
        assert_eq!(hex::encode(out), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn test_unknown_digest_uri() {
        let result = digest("http://www.w3.org/2001/04/xmldsig-more#md5", b"abc");
        assert!(matches!(result, Err(Error::UnsupportedAlgorithm(_))));
    }
}
