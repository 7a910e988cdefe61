#![forbid(unsafe_code)]

//! XML-Enc decryption with a list of candidate private keys.
//!
//! Processing order:
//! 1. Parse `<EncryptedData>` and read the `<EncryptionMethod>` URI
//! 2. Read `<KeyInfo>` to find the `<EncryptedKey>`
//! 3. Try each candidate private key against the wrapped key, in order
//! 4. Decrypt the `<CipherValue>` with the unwrapped session key
//! 5. Replace `<EncryptedData>` with the plaintext

use base64::Engine;
use sigtuna_core::{ns, Error, Result};
use sigtuna_crypto::AlgorithmRegistry;
use sigtuna_keys::{EncryptedKey, KeyInfo};

/// A parsed `<xenc:EncryptedData>` element.
pub struct EncryptedData {
    algorithm: String,
    cipher_value: Vec<u8>,
    key_info: Option<KeyInfo>,
}

impl EncryptedData {
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn cipher_value(&self) -> &[u8] {
        &self.cipher_value
    }

    pub fn key_info(&self) -> Option<&KeyInfo> {
        self.key_info.as_ref()
    }

    /// Parse an `<xenc:EncryptedData>` element.
    pub fn from_node(node: roxmltree::Node<'_, '_>) -> Result<Self> {
        let method = find_child_element(node, ns::ENC, ns::node::ENCRYPTION_METHOD)
            .ok_or_else(|| Error::MissingElement("EncryptionMethod".into()))?;
        let algorithm = method
            .attribute(ns::attr::ALGORITHM)
            .ok_or_else(|| Error::MissingAttribute("Algorithm on EncryptionMethod".into()))?;

        let key_info = match find_child_element(node, ns::DSIG, ns::node::KEY_INFO) {
            Some(ki) => Some(KeyInfo::from_node(ki)?),
            None => None,
        };

        let cipher_data = find_child_element(node, ns::ENC, ns::node::CIPHER_DATA)
            .ok_or_else(|| Error::MissingElement("CipherData".into()))?;
        let cipher_value = find_child_element(cipher_data, ns::ENC, ns::node::CIPHER_VALUE)
            .ok_or_else(|| Error::MissingElement("CipherValue".into()))?;
        let clean: String = cipher_value
            .text()
            .unwrap_or("")
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let cipher_value = base64::engine::general_purpose::STANDARD
            .decode(&clean)
            .map_err(|e| Error::Base64(format!("CipherValue: {e}")))?;

        Ok(Self {
            algorithm: algorithm.to_owned(),
            cipher_value,
            key_info,
        })
    }

    /// Parse the first `<xenc:EncryptedData>` in an XML document.
    pub fn parse(xml: &str) -> Result<Self> {
        let doc =
            roxmltree::Document::parse(xml).map_err(|e| Error::XmlParse(e.to_string()))?;
        let node = find_encrypted_data(&doc)
            .ok_or_else(|| Error::MissingElement("EncryptedData".into()))?;
        Self::from_node(node)
    }
}

/// Decrypts encryption envelopes with an ordered list of candidate
/// private keys.
///
/// Key rotation is the normal reason for more than one candidate: a
/// document may have been encrypted for a certificate that is no longer
/// the current one. Each candidate is tried in order and only a
/// wrong-key mismatch moves the loop along; any other failure aborts
/// immediately.
pub struct Decryption {
    private_keys: Vec<rsa::RsaPrivateKey>,
}

impl Decryption {
    pub fn new(private_keys: Vec<rsa::RsaPrivateKey>) -> Self {
        Self { private_keys }
    }

    /// Decrypt a parsed envelope to raw plaintext bytes.
    pub fn decrypt_data(&self, data: &EncryptedData) -> Result<Vec<u8>> {
        // Look the cipher up first so an unsupported algorithm fails
        // before any key is tried.
        let cipher = AlgorithmRegistry::symmetric(&data.algorithm)?;
        let encrypted_key = data
            .key_info
            .as_ref()
            .and_then(KeyInfo::encrypted_key)
            .ok_or_else(|| {
                Error::MissingKeyMaterial("EncryptedData carries no EncryptedKey".into())
            })?;
        let (session_key, _) = self.unwrap_session_key(encrypted_key)?;
        cipher.decrypt(&session_key, &data.cipher_value)
    }

    /// Decrypt an XML document that must contain an `<EncryptedData>`
    /// element and return the plaintext it hides.
    pub fn decrypt_xml(&self, xml: &str) -> Result<String> {
        let data = EncryptedData::parse(xml)?;
        let plaintext = self.decrypt_data(&data)?;
        String::from_utf8(plaintext)
            .map_err(|e| Error::Decryption(format!("plaintext is not valid UTF-8: {e}")))
    }

    /// Replace the first `<EncryptedData>` element in `xml` with its
    /// plaintext. A document without one comes back unchanged.
    pub fn decrypt_node(&self, xml: &str) -> Result<String> {
        let doc =
            roxmltree::Document::parse(xml).map_err(|e| Error::XmlParse(e.to_string()))?;
        let node = match find_encrypted_data(&doc) {
            Some(node) => node,
            None => return Ok(xml.to_owned()),
        };
        let data = EncryptedData::from_node(node)?;
        let plaintext = self.decrypt_data(&data)?;
        let plaintext = String::from_utf8(plaintext)
            .map_err(|e| Error::Decryption(format!("plaintext is not valid UTF-8: {e}")))?;

        let range = node.range();
        let mut result = String::with_capacity(xml.len());
        result.push_str(&xml[..range.start]);
        result.push_str(&plaintext);
        result.push_str(&xml[range.end..]);
        Ok(result)
    }

    #[deprecated(since = "0.1.0", note = "use `decrypt_xml` instead")]
    pub fn decrypt(&self, xml: &str) -> Result<String> {
        tracing::warn!("Decryption::decrypt is deprecated, use decrypt_xml");
        self.decrypt_xml(xml)
    }

    /// Try each candidate key against the wrapped key in order, stopping
    /// at the first match. Returns the session key and how many
    /// candidates were consumed. Only a wrong-key mismatch is absorbed;
    /// any other error propagates immediately.
    fn unwrap_session_key(&self, encrypted_key: &EncryptedKey) -> Result<(Vec<u8>, usize)> {
        let mut attempted = 0;
        for private_key in &self.private_keys {
            attempted += 1;
            match encrypted_key.resolve(private_key) {
                Ok(session_key) => return Ok((session_key, attempted)),
                Err(Error::WrongKey) => continue,
                Err(other) => return Err(other),
            }
        }
        Err(Error::DecryptionFailed { attempted })
    }
}

fn find_encrypted_data<'a>(
    doc: &'a roxmltree::Document<'a>,
) -> Option<roxmltree::Node<'a, 'a>> {
    doc.descendants().find(|n| {
        n.is_element()
            && n.tag_name().name() == ns::node::ENCRYPTED_DATA
            && n.tag_name().namespace() == Some(ns::ENC)
    })
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
