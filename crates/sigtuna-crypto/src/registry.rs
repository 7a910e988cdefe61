#![forbid(unsafe_code)]

//! Algorithm registry mapping URIs to factory functions.

use crate::cipher::SymmetricAlgorithm;
use crate::keytransport::KeyTransportAlgorithm;
use sigtuna_core::Error;

/// Central registry for all cryptographic algorithms. Core code dispatches
/// by URI through this facade and never names a concrete implementation.
pub struct AlgorithmRegistry;

impl AlgorithmRegistry {
    /// Look up a symmetric cipher algorithm by URI.
    pub fn symmetric(uri: &str) -> Result<Box<dyn SymmetricAlgorithm>, Error> {
        crate::cipher::from_uri(uri)
    }

    /// Look up a key transport algorithm by URI.
    pub fn key_transport(uri: &str) -> Result<Box<dyn KeyTransportAlgorithm>, Error> {
        crate::keytransport::from_uri(uri)
    }

    /// Compute a digest by URI.
    pub fn digest(uri: &str, data: &[u8]) -> Result<Vec<u8>, Error> {
        crate::digest::digest(uri, data)
    }

    /// Sign data by URI.
    pub fn sign(
        uri: &str,
        private_key: &rsa::RsaPrivateKey,
        data: &[u8],
    ) -> Result<Vec<u8>, Error> {
        crate::sign::sign(uri, private_key, data)
    }
}
