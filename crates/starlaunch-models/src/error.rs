//! Error types for the `starlaunch-models` crate.
//!
//! All fallible constructors in this crate return variants of [`ModelError`].

/// Errors produced when constructing or validating model types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// A required field was empty after trimming surrounding whitespace.
    #[error("missing required field: {field}")]
    MissingField {
        /// The name of the missing field.
        field: String,
    },

    /// A mission identifier could not be parsed.
    #[error("invalid mission id \"{value}\": {reason}")]
    InvalidMissionId {
        /// The value that failed validation.
        value: String,
        /// Human-readable explanation.
        reason: String,
    },

    /// A chat channel name is not usable as a subject token.
    #[error("invalid channel \"{value}\": {reason}")]
    InvalidChannel {
        /// The value that failed validation.
        value: String,
        /// Human-readable explanation.
        reason: String,
    },
}
