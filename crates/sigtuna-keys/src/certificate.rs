#![forbid(unsafe_code)]

//! X.509 certificate wrapper: public key extraction, subject key
//! identifier, fingerprints.

use der::{Decode, DecodePem, Encode, EncodePem};
use sigtuna_core::{Error, Result};

/// OID for the rsaEncryption SPKI algorithm.
const RSA_ENCRYPTION: der::asn1::ObjectIdentifier =
    der::asn1::ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");

/// OID for the subjectKeyIdentifier extension.
const SUBJECT_KEY_IDENTIFIER: der::asn1::ObjectIdentifier =
    der::asn1::ObjectIdentifier::new_unwrap("2.5.29.14");

/// An X.509 certificate held alongside its DER encoding.
#[derive(Clone)]
pub struct Certificate {
    der: Vec<u8>,
    cert: x509_cert::Certificate,
}

impl Certificate {
    /// Parse a certificate from DER bytes.
    pub fn from_der(der_bytes: &[u8]) -> Result<Self> {
        let cert = x509_cert::Certificate::from_der(der_bytes)
            .map_err(|e| Error::Certificate(format!("DER parse: {e}")))?;
        Ok(Self {
            der: der_bytes.to_vec(),
            cert,
        })
    }

    /// Parse a certificate from PEM text.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let cert = x509_cert::Certificate::from_pem(pem.as_bytes())
            .map_err(|e| Error::Certificate(format!("PEM parse: {e}")))?;
        let der = cert
            .to_der()
            .map_err(|e| Error::Certificate(format!("DER encode: {e}")))?;
        Ok(Self { der, cert })
    }

    /// Wrap an already-parsed certificate.
    pub fn from_x509(cert: x509_cert::Certificate) -> Result<Self> {
        let der = cert
            .to_der()
            .map_err(|e| Error::Certificate(format!("DER encode: {e}")))?;
        Ok(Self { der, cert })
    }

    /// The DER encoding.
    pub fn to_der(&self) -> &[u8] {
        &self.der
    }

    /// The PEM encoding.
    pub fn to_pem(&self) -> Result<String> {
        self.cert
            .to_pem(der::pem::LineEnding::LF)
            .map_err(|e| Error::Certificate(format!("PEM encode: {e}")))
    }

    /// Base64 of the DER encoding without line breaks, the form carried in
    /// an `<ds:X509Certificate>` element.
    pub fn stripped(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.der)
    }

    /// Extract the RSA public key from the certificate.
    ///
    /// Fails with `UnsupportedKeyAlgorithm` when the certified key is not
    /// RSA; only RSA-class keys are supported for key transport.
    pub fn public_key(&self) -> Result<rsa::RsaPublicKey> {
        use rsa::pkcs8::DecodePublicKey;

        let spki = &self.cert.tbs_certificate.subject_public_key_info;
        if spki.algorithm.oid != RSA_ENCRYPTION {
            return Err(Error::UnsupportedKeyAlgorithm(format!(
                "{} is not supported; only RSA keys are",
                spki.algorithm.oid
            )));
        }
        let spki_der = spki
            .to_der()
            .map_err(|e| Error::Certificate(format!("SPKI encode: {e}")))?;
        rsa::RsaPublicKey::from_public_key_der(&spki_der)
            .map_err(|e| Error::Key(format!("invalid RSA public key: {e}")))
    }

    /// Base64 of the raw key identifier bytes from the subjectKeyIdentifier
    /// extension. Absent, not an error, when the certificate lacks the
    /// extension.
    pub fn subject_key_identifier(&self) -> Option<String> {
        use base64::Engine;

        let extensions = self.cert.tbs_certificate.extensions.as_ref()?;
        let ext = extensions
            .iter()
            .find(|e| e.extn_id == SUBJECT_KEY_IDENTIFIER)?;
        // The extension value wraps the key identifier in an inner
        // OCTET STRING.
        let inner = der::asn1::OctetString::from_der(ext.extn_value.as_bytes()).ok()?;
        Some(base64::engine::general_purpose::STANDARD.encode(inner.as_bytes()))
    }

    /// Fingerprint of the certificate: upper-case colon-separated hex of
    /// the digest over the DER encoding.
    pub fn fingerprint(&self, digest_uri: &str) -> Result<String> {
        let digest = sigtuna_crypto::AlgorithmRegistry::digest(digest_uri, &self.der)?;
        Ok(hex::encode_upper(digest)
            .as_bytes()
            .chunks(2)
            .map(|pair| std::str::from_utf8(pair).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(":"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigtuna_core::algorithm;

    const CERT_A: &str = include_str!("../../../fixtures/cert-a.pem");
    const EC_CERT: &str = include_str!("../../../fixtures/ec-cert.pem");

    #[test]
    fn test_pem_der_roundtrip() {
        let cert = Certificate::from_pem(CERT_A).unwrap();
        let again = Certificate::from_der(cert.to_der()).unwrap();
        assert_eq!(cert.to_der(), again.to_der());
    }

    #[test]
    fn test_public_key_is_rsa() {
        let cert = Certificate::from_pem(CERT_A).unwrap();
        cert.public_key().unwrap();
    }

    #[test]
    fn test_non_rsa_key_is_rejected() {
        let cert = Certificate::from_pem(EC_CERT).unwrap();
        let result = cert.public_key();
        assert!(matches!(result, Err(Error::UnsupportedKeyAlgorithm(_))));
    }

    #[test]
    fn test_subject_key_identifier_present() {
        let cert = Certificate::from_pem(CERT_A).unwrap();
        let ski = cert.subject_key_identifier().unwrap();
        use base64::Engine;
        let raw = base64::engine::general_purpose::STANDARD
            .decode(ski)
            .unwrap();
        assert_eq!(raw.len(), 20); // SHA-1 based key identifier
    }

    #[test]
    fn test_fingerprint_format() {
        let cert = Certificate::from_pem(CERT_A).unwrap();
        let fp = cert.fingerprint(algorithm::SHA256).unwrap();
        assert_eq!(fp.len(), 32 * 2 + 31);
        assert!(fp
            .chars()
            .all(|c| c == ':' || c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }
}
