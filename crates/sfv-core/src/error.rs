//! Error types for structured field parsing, serialization, and validation.

use thiserror::Error;

use crate::profile::Profile;
use crate::validation::ViolationList;

/// Errors that can occur while parsing, building, serializing, or
/// accessing structured field values.
#[derive(Error, Debug)]
pub enum SfvError {
    /// The input (or a candidate value) does not match the field grammar.
    /// Includes the 0-based byte offset where the error was detected.
    #[error("syntax error at byte {offset}: {message}")]
    Syntax { offset: usize, message: String },

    /// A value kind that the active grammar profile does not support.
    #[error("{feature} values require the current profile (active profile: {profile})")]
    MissingFeature {
        feature: &'static str,
        profile: Profile,
    },

    /// A structurally valid value that violates a model bound
    /// (e.g., an out-of-range integer).
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A strict lookup addressed a key or index that is not present.
    #[error("no member at offset {offset}")]
    InvalidOffset { offset: String },

    /// One or more declarative validation rules failed.
    #[error("validation failed: {0}")]
    Validation(ViolationList),
}

/// Convenience alias used throughout sfv-core.
pub type Result<T> = std::result::Result<T, SfvError>;
