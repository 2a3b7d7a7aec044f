//! Error type for the parser.
//!
//! The header check is the only fatal condition. Every other malformed input
//! is absorbed by coercion or dropped by the extractor.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No row matched the header signature, so column positions are unknown.
    #[error("header row not found (expected {expected})")]
    HeaderNotFound { expected: String },
}
