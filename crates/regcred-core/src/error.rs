//! Error types for regcred-core

use thiserror::Error;

/// Result type alias for credential store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Credential store error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to set credsStore: {0}")]
    SetCredentialsStore(#[source] Box<Error>),

    #[error("plaintext put is disabled")]
    PlaintextPutDisabled,

    #[error("bad credential format: {0}")]
    BadCredentialFormat(String),

    #[error("invalid config format: {0}")]
    InvalidConfigFormat(String),

    #[error("credential helper {helper} not found: {message}")]
    HelperNotFound { helper: String, message: String },

    #[error("credential helper {helper} failed: {message}")]
    Helper { helper: String, message: String },

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl Error {
    /// Build a helper failure from the helper name and its output
    pub fn helper(helper: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Helper {
            helper: helper.into(),
            message: message.into(),
        }
    }

    /// Returns true if this error was produced by the plaintext store refusing a write
    pub fn is_plaintext_put_disabled(&self) -> bool {
        matches!(self, Self::PlaintextPutDisabled)
    }
}
