//! Error types for the fraud and security subsystem

use thiserror::Error;

/// Subsystem error
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or missing required input (caller bug, not retryable)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Ciphertext could not be decoded or authenticated
    #[error("Decryption failed: {0}")]
    DecryptionFailure(String),

    /// Cipher-layer failure while encrypting
    #[error("Encryption failed: {0}")]
    EncryptionFailure(String),

    /// Required configuration absent or unusable at startup
    #[error("Missing configuration: {0}")]
    ConfigurationMissing(String),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
