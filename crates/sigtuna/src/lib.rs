#![forbid(unsafe_code)]

//! XML security envelopes: enveloped signatures, encryption envelopes
//! and multi-key decryption.
//!
//! The [`Composer`] is the usual entry point. Give it a type that
//! renders XML, optionally a signing key pair and an encryption
//! certificate, and it produces the final document:
//!
//! ```no_run
//! use sigtuna::{Composer, KeyPair, Renderer, Result};
//!
//! struct Assertion;
//!
//! impl Renderer for Assertion {
//!     fn render(&self) -> Result<String> {
//!         Ok(r#"<Assertion ID="_a1"></Assertion>"#.into())
//!     }
//!     fn reference_id(&self) -> &str {
//!         "_a1"
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! let key_pair = KeyPair::generate(2048)?;
//! let xml = Composer::new().sign_with(key_pair).to_xml(&Assertion)?;
//! # Ok(())
//! # }
//! ```

pub mod composer;

pub use composer::{Composer, Renderer};
pub use sigtuna_core::{algorithm, id, ns, Error, Result};
pub use sigtuna_dsig::sign_enveloped;
pub use sigtuna_enc::{Decryption, EncryptedData, Encryption};
pub use sigtuna_keys::{
    Certificate, EncryptedKey, KeyInfo, KeyPair, SelfSignedCertificate,
};
