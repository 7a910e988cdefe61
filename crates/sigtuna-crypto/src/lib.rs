#![forbid(unsafe_code)]

//! Cryptographic algorithm dispatch for the Sigtuna XML security library.
//!
//! Every algorithm is addressed by its XML Security URI and reached through
//! a trait object; nothing outside this crate touches a concrete cipher.

pub mod cipher;
pub mod digest;
pub mod keytransport;
pub mod registry;
pub mod sign;

pub use cipher::SymmetricAlgorithm;
pub use keytransport::KeyTransportAlgorithm;
pub use registry::AlgorithmRegistry;
