#![forbid(unsafe_code)]

//! Shared foundations for the Sigtuna XML security library: the error
//! taxonomy, algorithm URI constants, and XML namespace constants.

pub mod algorithm;
pub mod error;
pub mod escape;
pub mod id;
pub mod ns;

pub use error::{Error, Result};
