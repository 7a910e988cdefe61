#![forbid(unsafe_code)]

//! Enveloped XML signature generation for the Sigtuna XML security
//! library. The digest and signature algorithms are fixed to SHA-256.

pub mod sign;

pub use sign::sign_enveloped;
