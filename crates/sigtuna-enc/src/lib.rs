#![forbid(unsafe_code)]

//! XML-Enc support for the Sigtuna XML security library.
//!
//! [`Encryption`] builds an `<xenc:EncryptedData>` envelope around a
//! payload: a fresh session key encrypts the payload and travels inside
//! the envelope wrapped under the recipient's public key. [`Decryption`]
//! undoes that with a list of candidate private keys, trying each until
//! one unwraps the session key.

pub mod decrypt;
pub mod encrypt;

pub use decrypt::{Decryption, EncryptedData};
pub use encrypt::Encryption;
