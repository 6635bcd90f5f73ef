// Error types for key generation, hybrid encryption and the file formats

use thiserror::Error;

/// Everything that can go wrong in this crate
#[derive(Debug, Error)]
pub enum Error {
    /// A key file does not hold two usable decimal integers
    #[error("key file format error: {0}")]
    KeyFileFormat(String),

    /// Tag verification failed, or the unwrapped session key is not a valid 128-bit key
    #[error("ciphertext corrupted: {0}")]
    Integrity(String),

    /// Prime search gave up after the configured number of attempts
    #[error("prime search exceeded {attempts} attempts")]
    PrimalityLoopExceeded { attempts: u64 },

    #[error("invalid key generation config: {0}")]
    InvalidConfig(String),

    /// The ciphertext envelope could not be decoded or encoded
    #[error("malformed ciphertext envelope: {0}")]
    EnvelopeFormat(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("invalid UTF-8 in decrypted text: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when the error signals tampering or a wrong private key
    pub fn is_integrity(&self) -> bool {
        matches!(self, Error::Integrity(_))
    }
}

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
