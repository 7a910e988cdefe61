#![forbid(unsafe_code)]

//! An X.509 certificate paired with its RSA private key.

use rsa::pkcs8::DecodePrivateKey;
use sigtuna_core::{Error, Result};

use crate::certificate::Certificate;
use crate::self_signed::SelfSignedCertificate;

#[derive(Clone)]
pub struct KeyPair {
    certificate: Certificate,
    private_key: rsa::RsaPrivateKey,
}

impl KeyPair {
    pub fn new(certificate: Certificate, private_key: rsa::RsaPrivateKey) -> Self {
        Self {
            certificate,
            private_key,
        }
    }

    /// Generate a fresh RSA key of `bits` and issue a self-signed
    /// certificate for it.
    pub fn generate(bits: usize) -> Result<Self> {
        let private_key = rsa::RsaPrivateKey::new(&mut rand::thread_rng(), bits)
            .map_err(|e| Error::Key(format!("RSA key generation: {e}")))?;
        let certificate = SelfSignedCertificate::certificate_for(&private_key)?;
        Ok(Self {
            certificate,
            private_key,
        })
    }

    /// Load a key pair from PEM text, certificate and PKCS#8 private key.
    pub fn from_pem(certificate_pem: &str, private_key_pem: &str) -> Result<Self> {
        let certificate = Certificate::from_pem(certificate_pem)?;
        let private_key = rsa::RsaPrivateKey::from_pkcs8_pem(private_key_pem)
            .map_err(|e| Error::Key(format!("private key parse: {e}")))?;
        Ok(Self {
            certificate,
            private_key,
        })
    }

    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    pub fn private_key(&self) -> &rsa::RsaPrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> rsa::RsaPublicKey {
        self.private_key.to_public_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_A: &str = include_str!("../../../fixtures/rsa-a.pem");
    const CERT_A: &str = include_str!("../../../fixtures/cert-a.pem");

    #[test]
    fn test_from_pem() {
        let pair = KeyPair::from_pem(CERT_A, KEY_A).unwrap();
        assert_eq!(
            pair.certificate().public_key().unwrap(),
            pair.public_key()
        );
    }

    #[test]
    fn test_from_pem_with_garbage_key() {
        let result = KeyPair::from_pem(CERT_A, "not a pem");
        assert!(matches!(result, Err(sigtuna_core::Error::Key(_))));
    }
}
