//! Chat over NATS subjects shared with the relay.

use futures::StreamExt;
use starlaunch_models::{ChannelId, ChatMessage, OperatorName, PresenceNotice};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{ChatChannel, ChatConnector};
use crate::error::SdkError;
use crate::subjects::ChatSubjects;

/// Connects to a chat channel through a NATS server.
///
/// On connect the client subscribes to the channel's broadcast subject,
/// then announces itself on the presence subject so the relay can greet it.
#[derive(Debug, Clone)]
pub struct NatsChatConnector {
    nats_url: String,
    channel: ChannelId,
}

impl NatsChatConnector {
    /// Connector for `channel` on the server at `nats_url`.
    pub fn new(nats_url: &str, channel: ChannelId) -> Self {
        Self {
            nats_url: nats_url.to_string(),
            channel,
        }
    }

    /// The channel this connector joins.
    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }
}

impl ChatConnector for NatsChatConnector {
    async fn connect(&self, operator: &OperatorName) -> Result<ChatChannel, SdkError> {
        let client = async_nats::connect(self.nats_url.as_str()).await?;

        // Subscribe first so the greeting triggered by the presence notice
        // is not missed.
        let broadcasts = client.subscribe(ChatSubjects::broadcast(&self.channel)).await?;

        let notice = serde_json::to_vec(&PresenceNotice {
            operator: operator.to_string(),
        })?;
        client
            .publish(ChatSubjects::presence(&self.channel), notice.into())
            .await?;
        client
            .flush()
            .await
            .map_err(|e| SdkError::Nats(e.to_string()))?;

        let (outbound, mut outgoing) = mpsc::unbounded_channel::<ChatMessage>();
        let subject = ChatSubjects::new_message(&self.channel);
        tokio::spawn(async move {
            while let Some(msg) = outgoing.recv().await {
                let bytes = match serde_json::to_vec(&msg) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        warn!(error = %e, "failed to encode chat message");
                        continue;
                    }
                };
                if let Err(e) = client.publish(subject.clone(), bytes.into()).await {
                    warn!(error = %e, "failed to publish chat message");
                    continue;
                }
                if let Err(e) = client.flush().await {
                    warn!(error = %e, "failed to flush chat message");
                }
            }
            debug!("chat writer stopped");
        });

        let inbound = broadcasts
            .filter_map(|message| async move {
                match serde_json::from_slice::<ChatMessage>(&message.payload) {
                    Ok(msg) => Some(msg),
                    Err(e) => {
                        debug!(error = %e, "ignoring malformed broadcast");
                        None
                    }
                }
            })
            .boxed();

        Ok(ChatChannel { outbound, inbound })
    }
}
