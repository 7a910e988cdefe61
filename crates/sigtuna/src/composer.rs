#![forbid(unsafe_code)]

//! The sign-then-encrypt composer.
//!
//! A [`Composer`] turns a rendered XML model into its final wire form.
//! With no configuration it passes the rendering through untouched; with
//! a signing key pair it envelopes a signature; with an encryption
//! certificate it wraps the result in an `<xenc:EncryptedData>`
//! envelope. When both are configured the signature always goes in
//! first, whatever order the configuration calls were made in, so the
//! signature is covered by the encryption rather than the other way
//! around.

use sigtuna_core::Result;
use sigtuna_dsig::sign_enveloped;
use sigtuna_enc::Encryption;
use sigtuna_keys::{Certificate, KeyPair};

/// A model that can render itself to XML for signing and encryption.
pub trait Renderer {
    /// Produce the XML document.
    fn render(&self) -> Result<String>;

    /// The ID attribute value an enveloped signature references.
    fn reference_id(&self) -> &str;
}

/// Assembles signed and encrypted documents from a [`Renderer`].
#[derive(Default)]
pub struct Composer {
    signing_key_pair: Option<KeyPair>,
    encryption_certificate: Option<Certificate>,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Envelope a signature with `key_pair` when composing.
    pub fn sign_with(mut self, key_pair: KeyPair) -> Self {
        self.signing_key_pair = Some(key_pair);
        self
    }

    /// Encrypt the composed document for `certificate`.
    pub fn encrypt_with(mut self, certificate: Certificate) -> Self {
        self.encryption_certificate = Some(certificate);
        self
    }

    /// Render `model` and apply the configured signing and encryption
    /// steps, signature first.
    pub fn to_xml(&self, model: &impl Renderer) -> Result<String> {
        let mut xml = model.render()?;
        if let Some(key_pair) = &self.signing_key_pair {
            xml = sign_enveloped(key_pair, model.reference_id(), &xml)?;
        }
        if let Some(certificate) = &self.encryption_certificate {
            xml = Encryption::new(certificate.clone()).encrypt(xml.as_bytes())?;
        }
        Ok(xml)
    }
}
