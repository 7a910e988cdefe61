#![forbid(unsafe_code)]

//! Key material handling for the Sigtuna XML security library.
//!
//! Carries the `<ds:KeyInfo>` data model with its serialization, the
//! `<xenc:EncryptedKey>` wrapped-key unit, X.509 certificate handling
//! (public key extraction, subject key identifier, fingerprints) and
//! self-signed certificate issuance.

pub mod certificate;
pub mod encrypted_key;
pub mod key_info;
pub mod key_pair;
pub mod self_signed;

pub use certificate::Certificate;
pub use encrypted_key::EncryptedKey;
pub use key_info::{AsymmetricCipher, KeyInfo, KeyValue, RetrievalMethod, RsaKeyValue};
pub use key_pair::KeyPair;
pub use self_signed::SelfSignedCertificate;
