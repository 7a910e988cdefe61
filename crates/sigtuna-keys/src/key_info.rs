#![forbid(unsafe_code)]

//! The `<ds:KeyInfo>` data model.
//!
//! Every child element is optional and absent until a caller puts
//! something there. Serialization always emits the children that are
//! present in schema order: KeyName, KeyValue, RetrievalMethod, X509Data,
//! EncryptedKey.

use base64::Engine;
use rsa::traits::PublicKeyParts;
use sigtuna_core::escape::{escape_attr, escape_text};
use sigtuna_core::{algorithm, ns, Error, Result};
use sigtuna_crypto::AlgorithmRegistry;

use crate::certificate::Certificate;
use crate::encrypted_key::EncryptedKey;

const B64: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD;

/// A bare RSA public key carried as `<ds:RSAKeyValue>`.
#[derive(Clone, Default)]
pub struct RsaKeyValue {
    modulus: Vec<u8>,
    exponent: Vec<u8>,
}

impl RsaKeyValue {
    pub fn from_public_key(key: &rsa::RsaPublicKey) -> Self {
        Self {
            modulus: key.n().to_bytes_be(),
            exponent: key.e().to_bytes_be(),
        }
    }

    pub fn modulus(&self) -> &[u8] {
        &self.modulus
    }

    pub fn exponent(&self) -> &[u8] {
        &self.exponent
    }

    pub fn set_modulus(&mut self, modulus: Vec<u8>) {
        self.modulus = modulus;
    }

    pub fn set_exponent(&mut self, exponent: Vec<u8>) {
        self.exponent = exponent;
    }

    /// Reconstruct the RSA public key from the carried components.
    pub fn public_key(&self) -> Result<rsa::RsaPublicKey> {
        if self.modulus.is_empty() || self.exponent.is_empty() {
            return Err(Error::MissingKeyMaterial(
                "RSAKeyValue without modulus or exponent".into(),
            ));
        }
        rsa::RsaPublicKey::new(
            rsa::BigUint::from_bytes_be(&self.modulus),
            rsa::BigUint::from_bytes_be(&self.exponent),
        )
        .map_err(|e| Error::Key(format!("invalid RSAKeyValue: {e}")))
    }
}

/// The `<ds:KeyValue>` container.
#[derive(Clone, Default)]
pub struct KeyValue {
    rsa: Option<RsaKeyValue>,
}

impl KeyValue {
    pub fn rsa_key_value(&self) -> Option<&RsaKeyValue> {
        self.rsa.as_ref()
    }

    /// The RSAKeyValue child, created empty on first access.
    pub fn rsa_key_value_mut(&mut self) -> &mut RsaKeyValue {
        self.rsa.get_or_insert_with(RsaKeyValue::default)
    }
}

/// A `<ds:RetrievalMethod>` pointer to key material held elsewhere in the
/// document.
#[derive(Clone)]
pub struct RetrievalMethod {
    uri: String,
    type_uri: String,
}

impl Default for RetrievalMethod {
    fn default() -> Self {
        Self {
            uri: String::new(),
            type_uri: algorithm::ENCRYPTED_KEY.to_owned(),
        }
    }
}

impl RetrievalMethod {
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn type_uri(&self) -> &str {
        &self.type_uri
    }

    pub fn set_uri(&mut self, uri: impl Into<String>) {
        self.uri = uri.into();
    }

    pub fn set_type_uri(&mut self, type_uri: impl Into<String>) {
        self.type_uri = type_uri.into();
    }
}

/// A public-key encryptor resolved from key material inside a KeyInfo.
pub struct AsymmetricCipher {
    public_key: rsa::RsaPublicKey,
    algorithm: String,
}

impl AsymmetricCipher {
    pub fn public_key(&self) -> &rsa::RsaPublicKey {
        &self.public_key
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let transport = AlgorithmRegistry::key_transport(&self.algorithm)?;
        transport.encrypt(&self.public_key, plaintext)
    }
}

/// The `<ds:KeyInfo>` element.
#[derive(Clone, Default)]
pub struct KeyInfo {
    key_name: Option<String>,
    key_value: Option<KeyValue>,
    retrieval_method: Option<RetrievalMethod>,
    x509_certificate: Option<Certificate>,
    encrypted_key: Option<EncryptedKey>,
}

impl KeyInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_name(&self) -> Option<&str> {
        self.key_name.as_deref()
    }

    pub fn set_key_name(&mut self, name: impl Into<String>) {
        self.key_name = Some(name.into());
    }

    pub fn key_value(&self) -> Option<&KeyValue> {
        self.key_value.as_ref()
    }

    /// The KeyValue child, created empty on first access.
    pub fn key_value_mut(&mut self) -> &mut KeyValue {
        self.key_value.get_or_insert_with(KeyValue::default)
    }

    pub fn retrieval_method(&self) -> Option<&RetrievalMethod> {
        self.retrieval_method.as_ref()
    }

    /// The RetrievalMethod child, created on first access with the
    /// EncryptedKey type URI already set.
    pub fn retrieval_method_mut(&mut self) -> &mut RetrievalMethod {
        self.retrieval_method
            .get_or_insert_with(RetrievalMethod::default)
    }

    pub fn x509_certificate(&self) -> Option<&Certificate> {
        self.x509_certificate.as_ref()
    }

    pub fn set_x509_certificate(&mut self, certificate: Certificate) {
        self.x509_certificate = Some(certificate);
    }

    pub fn encrypted_key(&self) -> Option<&EncryptedKey> {
        self.encrypted_key.as_ref()
    }

    pub fn set_encrypted_key(&mut self, encrypted_key: EncryptedKey) {
        self.encrypted_key = Some(encrypted_key);
    }

    /// The subject key identifier of the carried certificate, when both
    /// the certificate and its extension are present.
    pub fn subject_key_identifier(&self) -> Option<String> {
        self.x509_certificate
            .as_ref()
            .and_then(Certificate::subject_key_identifier)
    }

    /// Resolve an encryptor from the key material in this KeyInfo,
    /// preferring the certificate over a bare RSAKeyValue.
    ///
    /// Fails with `MissingKeyMaterial` when neither is present and with
    /// `UnsupportedKeyAlgorithm` when the certificate carries a non-RSA
    /// key. Neither case is worth retrying with another source.
    pub fn asymmetric_cipher(&self, algorithm_uri: &str) -> Result<AsymmetricCipher> {
        let public_key = if let Some(certificate) = &self.x509_certificate {
            certificate.public_key()?
        } else if let Some(rsa) = self.key_value.as_ref().and_then(KeyValue::rsa_key_value) {
            rsa.public_key()?
        } else {
            return Err(Error::MissingKeyMaterial(
                "KeyInfo carries neither an X509 certificate nor an RSAKeyValue".into(),
            ));
        };
        // Validate the URI up front so an unknown transport fails here,
        // not at encrypt time.
        AlgorithmRegistry::key_transport(algorithm_uri)?;
        Ok(AsymmetricCipher {
            public_key,
            algorithm: algorithm_uri.to_owned(),
        })
    }

    /// Append the `<ds:KeyInfo>` fragment to `out`. Children appear in
    /// schema order regardless of assignment order.
    pub fn write_xml(&self, out: &mut String) {
        out.push_str(&format!(r#"<ds:KeyInfo xmlns:ds="{}">"#, ns::DSIG));
        if let Some(name) = &self.key_name {
            out.push_str(&format!(
                "<ds:KeyName>{}</ds:KeyName>",
                escape_text(name)
            ));
        }
        if let Some(key_value) = &self.key_value {
            out.push_str("<ds:KeyValue>");
            if let Some(rsa) = &key_value.rsa {
                out.push_str(&format!(
                    "<ds:RSAKeyValue><ds:Modulus>{}</ds:Modulus><ds:Exponent>{}</ds:Exponent></ds:RSAKeyValue>",
                    B64.encode(&rsa.modulus),
                    B64.encode(&rsa.exponent),
                ));
            }
            out.push_str("</ds:KeyValue>");
        }
        if let Some(rm) = &self.retrieval_method {
            out.push_str(&format!(
                r#"<ds:RetrievalMethod URI="{}" Type="{}"/>"#,
                escape_attr(&rm.uri),
                escape_attr(&rm.type_uri)
            ));
        }
        if let Some(certificate) = &self.x509_certificate {
            out.push_str(&format!(
                "<ds:X509Data><ds:X509Certificate>{}</ds:X509Certificate></ds:X509Data>",
                certificate.stripped()
            ));
        }
        if let Some(encrypted_key) = &self.encrypted_key {
            encrypted_key.write_xml(out);
        }
        out.push_str("</ds:KeyInfo>");
    }

    /// The `<ds:KeyInfo>` fragment as a string.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out);
        out
    }

    /// Parse a `<ds:KeyInfo>` element. Unknown children are skipped.
    pub fn from_node(node: roxmltree::Node<'_, '_>) -> Result<Self> {
        let mut key_info = Self::default();
        for child in node.children().filter(roxmltree::Node::is_element) {
            match child.tag_name().name() {
                ns::node::KEY_NAME => {
                    key_info.key_name = Some(child.text().unwrap_or("").to_owned());
                }
                ns::node::KEY_VALUE => {
                    if let Some(rsa_node) =
                        find_child_element(child, ns::DSIG, ns::node::RSA_KEY_VALUE)
                    {
                        let rsa = key_info.key_value_mut().rsa_key_value_mut();
                        rsa.modulus = decode_child_b64(rsa_node, ns::node::RSA_MODULUS)?;
                        rsa.exponent = decode_child_b64(rsa_node, ns::node::RSA_EXPONENT)?;
                    }
                }
                ns::node::RETRIEVAL_METHOD => {
                    let rm = key_info.retrieval_method_mut();
                    if let Some(uri) = child.attribute(ns::attr::URI) {
                        rm.uri = uri.to_owned();
                    }
                    if let Some(type_uri) = child.attribute(ns::attr::TYPE) {
                        rm.type_uri = type_uri.to_owned();
                    }
                }
                ns::node::X509_DATA => {
                    if let Some(cert_node) =
                        find_child_element(child, ns::DSIG, ns::node::X509_CERTIFICATE)
                    {
                        let der = decode_b64_text(cert_node)?;
                        key_info.x509_certificate = Some(Certificate::from_der(&der)?);
                    }
                }
                ns::node::ENCRYPTED_KEY => {
                    key_info.encrypted_key = Some(EncryptedKey::from_node(child)?);
                }
                _ => {}
            }
        }
        Ok(key_info)
    }

    /// Parse the first `<ds:KeyInfo>` in an XML document.
    pub fn parse(xml: &str) -> Result<Self> {
        let doc =
            roxmltree::Document::parse(xml).map_err(|e| Error::XmlParse(e.to_string()))?;
        let node = doc
            .descendants()
            .find(|n| {
                n.is_element()
                    && n.tag_name().name() == ns::node::KEY_INFO
                    && n.tag_name().namespace() == Some(ns::DSIG)
            })
            .ok_or_else(|| Error::MissingElement("KeyInfo".into()))?;
        Self::from_node(node)
    }
}

fn find_child_element<'a>(
    parent: roxmltree::Node<'a, 'a>,
    ns_uri: &str,
    local_name: &str,
) -> Option<roxmltree::Node<'a, 'a>> {
    parent.children().find(|n| {
        n.is_element()
            && n.tag_name().name() == local_name
            && n.tag_name().namespace().unwrap_or("") == ns_uri
    })
}

fn decode_b64_text(node: roxmltree::Node<'_, '_>) -> Result<Vec<u8>> {
    let clean: String = node
        .text()
        .unwrap_or("")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    B64.decode(&clean)
        .map_err(|e| Error::Base64(format!("{}: {e}", node.tag_name().name())))
}

fn decode_child_b64(parent: roxmltree::Node<'_, '_>, local_name: &str) -> Result<Vec<u8>> {
    let child = find_child_element(parent, ns::DSIG, local_name)
        .ok_or_else(|| Error::MissingElement(local_name.into()))?;
    decode_b64_text(child)
}
