//! Error taxonomy.

use parley_crypto::CryptoError;
use thiserror::Error;

/// Result type for Parley operations.
pub type ParleyResult<T> = Result<T, ParleyError>;

/// Errors surfaced by the client library.
///
/// Transport and encoding failures pass through unchanged; nothing in the
/// library retries. Capability errors are raised before any I/O.
#[derive(Debug, Error)]
pub enum ParleyError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("malformed payload: {0}")]
    Encoding(String),

    #[error("operation not supported: {0}")]
    Capability(String),

    /// The consumer went away; returned to producers still emitting.
    #[error("operation cancelled")]
    Cancelled,

    #[error("crypto error: {0}")]
    Crypto(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ParleyError {
    pub fn capability(msg: impl Into<String>) -> Self {
        Self::Capability(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Returns true for failures of the network or native engine.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<serde_json::Error> for ParleyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encoding(err.to_string())
    }
}

impl From<hex::FromHexError> for ParleyError {
    fn from(err: hex::FromHexError) -> Self {
        Self::Encoding(format!("invalid hex: {err}"))
    }
}

impl From<CryptoError> for ParleyError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::Decryption(msg) => Self::Decryption(msg),
            CryptoError::Malformed(msg) => Self::Decryption(format!("malformed ciphertext: {msg}")),
            other => Self::Crypto(other.to_string()),
        }
    }
}
