//! Per-channel relay loop.

use anyhow::Result;
use futures::StreamExt;
use starlaunch_models::{
    ChannelId, ChatMessage, OPERATOR_CONNECTED_NOTICE, OutgoingChat, PresenceNotice,
};
use starlaunch_sdk::ChatSubjects;
use tracing::{debug, error, info, warn};

/// Relays one chat channel.
///
/// Every `new_message` publication is normalised and republished on the
/// broadcast subject, the sender included. Every presence notice produces a
/// `Sistema` announcement for the whole channel.
pub struct ChatRelay {
    channel: ChannelId,
    client: async_nats::Client,
}

impl ChatRelay {
    /// Connect to NATS for `channel`.
    pub async fn new(channel: ChannelId, nats_url: &str) -> Result<Self> {
        let client = async_nats::connect(nats_url)
            .await
            .map_err(|e| anyhow::anyhow!("NATS connection failed: {e}"))?;
        Ok(Self { channel, client })
    }

    /// Relay until either subscription ends.
    pub async fn run(&self) {
        let inbound_subject = ChatSubjects::new_message(&self.channel);
        let presence_subject = ChatSubjects::presence(&self.channel);
        info!(channel = %self.channel, %inbound_subject, "relay listening");

        let mut messages = match self.client.subscribe(inbound_subject).await {
            Ok(sub) => sub,
            Err(e) => {
                error!(channel = %self.channel, error = %e, "failed to subscribe");
                return;
            }
        };
        let mut presence = match self.client.subscribe(presence_subject).await {
            Ok(sub) => sub,
            Err(e) => {
                error!(channel = %self.channel, error = %e, "failed to subscribe");
                return;
            }
        };

        loop {
            tokio::select! {
                maybe_message = messages.next() => {
                    let Some(message) = maybe_message else {
                        break;
                    };
                    if let Some(broadcast) = normalise(&message.payload) {
                        debug!(channel = %self.channel, username = %broadcast.username, "relaying message");
                        self.broadcast(&broadcast).await;
                    }
                }
                maybe_notice = presence.next() => {
                    let Some(notice) = maybe_notice else {
                        break;
                    };
                    match serde_json::from_slice::<PresenceNotice>(&notice.payload) {
                        Ok(notice) => info!(channel = %self.channel, operator = %notice.operator, "operator connected"),
                        Err(e) => debug!(error = %e, "presence notice without operator"),
                    }
                    self.broadcast(&ChatMessage::system(OPERATOR_CONNECTED_NOTICE)).await;
                }
            }
        }
        warn!(channel = %self.channel, "subscription closed, relay stopping");
    }

    async fn broadcast(&self, message: &ChatMessage) {
        let payload = match serde_json::to_vec(message) {
            Ok(p) => p,
            Err(e) => {
                error!(error = %e, "failed to encode broadcast");
                return;
            }
        };
        if let Err(e) = self
            .client
            .publish(ChatSubjects::broadcast(&self.channel), payload.into())
            .await
        {
            error!(channel = %self.channel, error = %e, "failed to publish broadcast");
        }
    }
}

/// Turn a raw `new_message` payload into the message to broadcast.
///
/// Malformed payloads and blank messages yield `None`.
fn normalise(payload: &[u8]) -> Option<ChatMessage> {
    match serde_json::from_slice::<OutgoingChat>(payload) {
        Ok(outgoing) => outgoing.into_broadcast(),
        Err(e) => {
            warn!(error = %e, "ignoring malformed chat message");
            None
        }
    }
}
