#![forbid(unsafe_code)]

/// Errors produced by the Sigtuna XML security library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    #[error("invalid XML structure: {0}")]
    XmlStructure(String),

    #[error("missing required element: {0}")]
    MissingElement(String),

    #[error("missing required attribute: {0}")]
    MissingAttribute(String),

    #[error("base64 decode error: {0}")]
    Base64(String),

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The key material references a key family outside the supported
    /// asymmetric family. Never retried.
    #[error("unsupported key algorithm: {0}")]
    UnsupportedKeyAlgorithm(String),

    /// An asymmetric cipher was requested but no key source is configured.
    #[error("missing key material: {0}")]
    MissingKeyMaterial(String),

    /// A specific private key does not match a wrapped key. This is the
    /// only error kind the key-trial loop absorbs.
    #[error("private key does not match the wrapped key")]
    WrongKey,

    /// Every candidate private key was tried and none matched. Carries the
    /// number of candidates attempted, never any key material.
    #[error("unable to unwrap the symmetric key after {attempted} candidate key(s)")]
    DecryptionFailed { attempted: usize },

    #[error("cryptographic error: {0}")]
    Crypto(String),

    #[error("encryption error: {0}")]
    Encryption(String),

    #[error("decryption error: {0}")]
    Decryption(String),

    #[error("key error: {0}")]
    Key(String),

    #[error("certificate error: {0}")]
    Certificate(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
