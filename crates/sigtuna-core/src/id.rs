#![forbid(unsafe_code)]

//! Random XML ID generation.

use rand::RngCore;

/// Generate a fresh ID attribute value. The leading underscore keeps the
/// value a valid NCName even though the random part may start with a
/// digit.
pub fn generate() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("_{}", hex::encode(bytes))
}
