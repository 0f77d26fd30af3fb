//! Broadcast chat payloads.
//!
//! Operators publish a [`ChatMessage`] as a `new_message` event; the relay
//! re-publishes it to every connected client as a `broadcast_message`.
//! Messages whose username is [`SYSTEM_USERNAME`] originate from the relay
//! itself.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Reserved username marking relay-originated messages.
pub const SYSTEM_USERNAME: &str = "Sistema";

/// Username the relay applies when an operator message carries none.
pub const ANONYMOUS_USERNAME: &str = "Operador";

/// Text of the announcement published when an operator connects.
pub const OPERATOR_CONNECTED_NOTICE: &str = "Nuevo operador conectado";

// ---------------------------------------------------------------------------
// ChannelId
// ---------------------------------------------------------------------------

/// Name of a shared chat channel (e.g. `"control-room"`).
///
/// The name becomes one token of every chat subject, so it is restricted to
/// ASCII letters, digits, `-` and `_`.
///
/// # Examples
///
/// ```
/// use starlaunch_models::ChannelId;
///
/// let id: ChannelId = "control-room".parse().unwrap();
/// assert_eq!(id.to_string(), "control-room");
/// assert!(ChannelId::new("pad.a").is_err());
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelId(String);

impl ChannelId {
    /// Validate `id` as a channel name.
    pub fn new(id: &str) -> Result<Self, ModelError> {
        let invalid = |reason: &str| ModelError::InvalidChannel {
            value: id.to_string(),
            reason: reason.to_string(),
        };
        if id.is_empty() {
            return Err(invalid("empty name"));
        }
        if let Some(c) = id
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(invalid(&format!("character {c:?} not allowed")));
        }
        Ok(Self(id.to_string()))
    }

    /// Return the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ChannelId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ChannelId {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(&s)
    }
}

impl From<ChannelId> for String {
    fn from(id: ChannelId) -> Self {
        id.0
    }
}

// ---------------------------------------------------------------------------
// ChatMessage
// ---------------------------------------------------------------------------

/// One chat line, in both directions.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Author display name, or [`SYSTEM_USERNAME`].
    pub username: String,
    /// Message body.
    pub message: String,
}

impl ChatMessage {
    /// Build a message from an operator.
    pub fn new(username: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            message: message.into(),
        }
    }

    /// Build a relay-originated message.
    pub fn system(message: impl Into<String>) -> Self {
        Self::new(SYSTEM_USERNAME, message)
    }

    /// True when the message was emitted by the relay.
    pub fn is_system(&self) -> bool {
        self.username == SYSTEM_USERNAME
    }
}

// ---------------------------------------------------------------------------
// Relay-side normalisation
// ---------------------------------------------------------------------------

/// A `new_message` event as received by the relay, before normalisation.
///
/// Both fields are optional on the wire.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct OutgoingChat {
    /// Claimed author.
    #[serde(default)]
    pub username: Option<String>,
    /// Raw message body.
    #[serde(default)]
    pub message: Option<String>,
}

impl OutgoingChat {
    /// Turn the raw event into the message to broadcast.
    ///
    /// Returns `None` when the trimmed body is empty. A missing or blank
    /// username becomes [`ANONYMOUS_USERNAME`].
    pub fn into_broadcast(self) -> Option<ChatMessage> {
        let message = self.message.unwrap_or_default();
        let message = message.trim();
        if message.is_empty() {
            return None;
        }
        let username = match self.username.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => ANONYMOUS_USERNAME.to_string(),
        };
        Some(ChatMessage::new(username, message))
    }
}

// ---------------------------------------------------------------------------
// PresenceNotice
// ---------------------------------------------------------------------------

/// Published by a client right after it joins a channel.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PresenceNotice {
    /// The operator that connected.
    pub operator: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
