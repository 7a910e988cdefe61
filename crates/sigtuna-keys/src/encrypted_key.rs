#![forbid(unsafe_code)]

//! The `<xenc:EncryptedKey>` wrapped-key unit: a symmetric key encrypted
//! under an asymmetric public key for transport.

use sigtuna_core::escape::escape_attr;
use sigtuna_core::{ns, Error, Result};
use sigtuna_crypto::AlgorithmRegistry;

/// A symmetric key wrapped under a recipient's RSA public key.
///
/// Built on the sending side from fresh key material, or parsed from the
/// wire and later resolved with a candidate private key.
#[derive(Clone)]
pub struct EncryptedKey {
    id: String,
    algorithm: String,
    cipher_value: Vec<u8>,
}

impl EncryptedKey {
    /// Wrap `key` under `public_key` using the key transport algorithm
    /// named by `algorithm_uri`.
    pub fn build(
        id: impl Into<String>,
        public_key: &rsa::RsaPublicKey,
        key: &[u8],
        algorithm_uri: &str,
    ) -> Result<Self> {
        let transport = AlgorithmRegistry::key_transport(algorithm_uri)?;
        let cipher_value = transport.encrypt(public_key, key)?;
        Ok(Self {
            id: id.into(),
            algorithm: algorithm_uri.to_owned(),
            cipher_value,
        })
    }

    /// Unwrap the symmetric key with `private_key`.
    ///
    /// Returns `Error::WrongKey` when the key does not correspond to the
    /// ciphertext; any other failure keeps its own error kind so callers
    /// can tell a mismatch from a malformed block.
    pub fn resolve(&self, private_key: &rsa::RsaPrivateKey) -> Result<Vec<u8>> {
        let transport = AlgorithmRegistry::key_transport(&self.algorithm)?;
        transport.decrypt(private_key, &self.cipher_value)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn cipher_value(&self) -> &[u8] {
        &self.cipher_value
    }

    /// Append the `<xenc:EncryptedKey>` fragment to `out`.
    pub fn write_xml(&self, out: &mut String) {
        use base64::Engine;
        let cipher_b64 = base64::engine::general_purpose::STANDARD.encode(&self.cipher_value);
        out.push_str(&format!(
            r#"<xenc:EncryptedKey xmlns:xenc="{enc}" Id="{id}"><xenc:EncryptionMethod Algorithm="{alg}"/><xenc:CipherData><xenc:CipherValue>{cv}</xenc:CipherValue></xenc:CipherData></xenc:EncryptedKey>"#,
            enc = ns::ENC,
            id = escape_attr(&self.id),
            alg = escape_attr(&self.algorithm),
            cv = cipher_b64,
        ));
    }

    /// The `<xenc:EncryptedKey>` fragment as a string.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out);
        out
    }

    /// Parse an `<xenc:EncryptedKey>` element.
    pub fn from_node(node: roxmltree::Node<'_, '_>) -> Result<Self> {
        use base64::Engine;

        let id = node.attribute(ns::attr::ID).unwrap_or_default().to_owned();

        let method = find_child_element(node, ns::ENC, ns::node::ENCRYPTION_METHOD)
            .ok_or_else(|| Error::MissingElement("EncryptionMethod on EncryptedKey".into()))?;
        let algorithm = method.attribute(ns::attr::ALGORITHM).ok_or_else(|| {
            Error::MissingAttribute("Algorithm on EncryptedKey EncryptionMethod".into())
        })?;

        let cipher_data = find_child_element(node, ns::ENC, ns::node::CIPHER_DATA)
            .ok_or_else(|| Error::MissingElement("CipherData on EncryptedKey".into()))?;
        let cipher_value = find_child_element(cipher_data, ns::ENC, ns::node::CIPHER_VALUE)
            .ok_or_else(|| Error::MissingElement("CipherValue on EncryptedKey".into()))?;

        let b64_text = cipher_value.text().unwrap_or("");
        let clean: String = b64_text.chars().filter(|c| !c.is_whitespace()).collect();
        let cipher_value = base64::engine::general_purpose::STANDARD
            .decode(&clean)
            .map_err(|e| Error::Base64(format!("EncryptedKey CipherValue: {e}")))?;

        Ok(Self {
            id,
            algorithm: algorithm.to_owned(),
            cipher_value,
        })
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

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::pkcs8::DecodePrivateKey;
    use sigtuna_core::algorithm;

    const KEY_A: &str = include_str!("../../../fixtures/rsa-a.pem");
    const KEY_B: &str = include_str!("../../../fixtures/rsa-b.pem");

    fn private_key(pem: &str) -> rsa::RsaPrivateKey {
        rsa::RsaPrivateKey::from_pkcs8_pem(pem).unwrap()
    }

    #[test]
    fn test_build_resolve_roundtrip() {
        let private = private_key(KEY_A);
        let key = [0x5au8; 32];
        let ek =
            EncryptedKey::build("_ek1", &private.to_public_key(), &key, algorithm::RSA_PKCS1)
                .unwrap();
        assert_eq!(ek.resolve(&private).unwrap(), key);
    }

    #[test]
    fn test_resolve_with_wrong_key() {
        let private_a = private_key(KEY_A);
        let private_b = private_key(KEY_B);
        let ek = EncryptedKey::build(
            "_ek1",
            &private_a.to_public_key(),
            &[0x5au8; 32],
            algorithm::RSA_OAEP,
        )
        .unwrap();
        assert!(matches!(ek.resolve(&private_b), Err(Error::WrongKey)));
    }

    #[test]
    fn test_xml_roundtrip() {
        let private = private_key(KEY_A);
        let key = [0x5au8; 16];
        let ek =
            EncryptedKey::build("_ek9", &private.to_public_key(), &key, algorithm::RSA_PKCS1)
                .unwrap();

        let xml = ek.to_xml();
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let parsed = EncryptedKey::from_node(doc.root_element()).unwrap();

        assert_eq!(parsed.id(), "_ek9");
        assert_eq!(parsed.algorithm(), algorithm::RSA_PKCS1);
        assert_eq!(parsed.resolve(&private).unwrap(), key);
    }

    #[test]
    fn test_missing_cipher_value() {
        let xml = format!(
            r#"<xenc:EncryptedKey xmlns:xenc="{}" Id="_x"><xenc:EncryptionMethod Algorithm="{}"/><xenc:CipherData></xenc:CipherData></xenc:EncryptedKey>"#,
            ns::ENC,
            algorithm::RSA_PKCS1
        );
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let result = EncryptedKey::from_node(doc.root_element());
        assert!(matches!(result, Err(Error::MissingElement(_))));
    }
}
