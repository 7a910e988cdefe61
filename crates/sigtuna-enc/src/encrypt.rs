#![forbid(unsafe_code)]

//! XML-Enc encryption: wraps a payload in an `<xenc:EncryptedData>`
//! envelope with the session key carried as an `<xenc:EncryptedKey>`.

use base64::Engine;
use sigtuna_core::{algorithm, id, ns, Result};
use sigtuna_crypto::AlgorithmRegistry;
use sigtuna_keys::{Certificate, EncryptedKey, KeyInfo};

/// Builds encryption envelopes for one recipient certificate.
///
/// Defaults to AES-256-CBC for the payload and RSA PKCS#1 v1.5 for key
/// transport; both are overridable before calling [`Encryption::encrypt`].
pub struct Encryption {
    certificate: Certificate,
    symmetric_algorithm: String,
    key_transport_algorithm: String,
}

impl Encryption {
    pub fn new(certificate: Certificate) -> Self {
        Self {
            certificate,
            symmetric_algorithm: algorithm::AES256_CBC.to_owned(),
            key_transport_algorithm: algorithm::RSA_PKCS1.to_owned(),
        }
    }

    pub fn symmetric_algorithm(mut self, uri: impl Into<String>) -> Self {
        self.symmetric_algorithm = uri.into();
        self
    }

    pub fn key_transport_algorithm(mut self, uri: impl Into<String>) -> Self {
        self.key_transport_algorithm = uri.into();
        self
    }

    /// Encrypt `plaintext` under a fresh session key and return the
    /// `<xenc:EncryptedData>` envelope.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<String> {
        let cipher = AlgorithmRegistry::symmetric(&self.symmetric_algorithm)?;
        let session_key = cipher.generate_key();
        let ciphertext = cipher.encrypt(&session_key, plaintext)?;

        let public_key = self.certificate.public_key()?;
        let encrypted_key = EncryptedKey::build(
            id::generate(),
            &public_key,
            &session_key,
            &self.key_transport_algorithm,
        )?;

        let mut key_info = KeyInfo::new();
        key_info.set_x509_certificate(self.certificate.clone());
        key_info.set_encrypted_key(encrypted_key);

        let cipher_b64 = base64::engine::general_purpose::STANDARD.encode(&ciphertext);

        let mut out = String::new();
        out.push_str(&format!(
            r#"<xenc:EncryptedData xmlns:xenc="{enc}" Id="{id}" Type="{enc_type}"><xenc:EncryptionMethod Algorithm="{alg}"/>"#,
            enc = ns::ENC,
            id = id::generate(),
            enc_type = ns::ENC_TYPE_ELEMENT,
            alg = self.symmetric_algorithm,
        ));
        key_info.write_xml(&mut out);
        out.push_str(&format!(
            "<xenc:CipherData><xenc:CipherValue>{cipher_b64}</xenc:CipherValue></xenc:CipherData></xenc:EncryptedData>"
        ));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CERT_A: &str = include_str!("../../../fixtures/cert-a.pem");

    fn certificate() -> Certificate {
        Certificate::from_pem(CERT_A).unwrap()
    }

    #[test]
    fn test_envelope_shape() {
        let xml = Encryption::new(certificate()).encrypt(b"<Doc/>").unwrap();
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let root = doc.root_element();
        assert_eq!(root.tag_name().name(), ns::node::ENCRYPTED_DATA);
        assert_eq!(root.attribute(ns::attr::TYPE), Some(ns::ENC_TYPE_ELEMENT));
        assert!(xml.contains(algorithm::AES256_CBC));
        assert!(xml.contains(algorithm::RSA_PKCS1));
        assert!(xml.contains("<xenc:EncryptedKey"));
        assert!(xml.contains("<ds:X509Certificate>"));
    }

    #[test]
    fn test_algorithm_overrides() {
        let xml = Encryption::new(certificate())
            .symmetric_algorithm(algorithm::AES128_GCM)
            .key_transport_algorithm(algorithm::RSA_OAEP)
            .encrypt(b"<Doc/>")
            .unwrap();
        assert!(xml.contains(algorithm::AES128_GCM));
        assert!(xml.contains(algorithm::RSA_OAEP));
    }

    #[test]
    fn test_unsupported_symmetric_algorithm() {
        let result = Encryption::new(certificate())
            .symmetric_algorithm("urn:example:not-a-cipher")
            .encrypt(b"<Doc/>");
        assert!(matches!(
            result,
            Err(sigtuna_core::Error::UnsupportedAlgorithm(_))
        ));
    }
}
