use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid wallet address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
