//! # Error Types
//!
//! Parse and validation failures for the core value types. Higher crates
//! wrap these in their own error enums.

use thiserror::Error;

/// Error raised while constructing or parsing a core value type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Address string is not 20 bytes of hex.
    #[error("invalid address {input:?}: {reason}")]
    InvalidAddress {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Amount string is not a non-negative integer in base units.
    #[error("invalid amount {0:?}: expected a non-negative integer in base units")]
    InvalidAmount(String),

    /// Timestamp is malformed or not UTC.
    #[error("invalid timestamp {input:?}: {reason}")]
    InvalidTimestamp {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },
}
