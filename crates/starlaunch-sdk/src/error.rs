//! SDK error types.
//!
//! [`SdkError`] is the single error type returned by every fallible
//! operation in the SDK. The first four variants are the failure classes the
//! control room reacts to; the rest wrap the underlying transport,
//! serialization and I/O errors.

use starlaunch_models::ModelError;

/// Error type for all SDK operations.
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    /// A client-side precondition failed; no request was sent.
    #[error("validation failed: {0}")]
    Validation(#[from] ModelError),

    /// The collaborator reported that the resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The collaborator answered with a structured error payload.
    #[error("rejected by server: {0}")]
    ServerRejection(String),

    /// A stream or channel failed or was closed by the remote side.
    #[error("transport error: {0}")]
    Transport(String),

    /// Invalid or missing configuration (e.g. bad URL).
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP request failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// NATS transport error.
    #[error("NATS error: {0}")]
    Nats(String),

    /// JSON serialization / deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SdkError {
    /// True for failures caused by the network or the remote end going away.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Http(_) | Self::Nats(_) | Self::Io(_))
    }
}

impl From<async_nats::ConnectError> for SdkError {
    fn from(e: async_nats::ConnectError) -> Self {
        SdkError::Nats(e.to_string())
    }
}

impl From<async_nats::PublishError> for SdkError {
    fn from(e: async_nats::PublishError) -> Self {
        SdkError::Nats(e.to_string())
    }
}

impl From<async_nats::SubscribeError> for SdkError {
    fn from(e: async_nats::SubscribeError) -> Self {
        SdkError::Nats(e.to_string())
    }
}
