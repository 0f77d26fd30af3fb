//! Canonical NATS subject definitions for the chat channel.
//!
//! Clients and the relay must agree on subject names, so every subject is
//! built through [`ChatSubjects`].
//!
//! # Subject layout
//!
//! ```text
//! starlaunch.v1.{channel}.chat.new_message   ← clients PUBLISH operator messages
//! starlaunch.v1.{channel}.chat.broadcast     ← clients SUBSCRIBE, relay PUBLISHES
//! starlaunch.v1.{channel}.chat.presence      ← clients announce themselves on connect
//! ```

use starlaunch_models::ChannelId;

/// Current subject version prefix.
const VERSION: &str = "v1";

/// Kinds of traffic carried on a chat channel; the last subject token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ChatEvent {
    /// Operator message on its way to the relay.
    NewMessage,
    /// Relay rebroadcast to every client.
    Broadcast,
    /// Client announcement after connecting.
    Presence,
}

/// Central authority for all chat subject names.
///
/// # Examples
///
/// ```
/// use starlaunch_models::ChannelId;
/// use starlaunch_sdk::ChatSubjects;
///
/// let channel = ChannelId::new("control-room").unwrap();
/// assert_eq!(
///     ChatSubjects::broadcast(&channel),
///     "starlaunch.v1.control-room.chat.broadcast",
/// );
/// ```
pub struct ChatSubjects;

impl ChatSubjects {
    /// Subject for `event` on `channel`.
    pub fn subject(channel: &ChannelId, event: ChatEvent) -> String {
        format!("starlaunch.{VERSION}.{channel}.chat.{event}")
    }

    /// Subject a client publishes an operator message to.
    pub fn new_message(channel: &ChannelId) -> String {
        Self::subject(channel, ChatEvent::NewMessage)
    }

    /// Subject carrying relay broadcasts to every client on the channel.
    pub fn broadcast(channel: &ChannelId) -> String {
        Self::subject(channel, ChatEvent::Broadcast)
    }

    /// Subject a client publishes a [`starlaunch_models::PresenceNotice`] to
    /// right after connecting.
    pub fn presence(channel: &ChannelId) -> String {
        Self::subject(channel, ChatEvent::Presence)
    }
}
