//! Shared broadcast chat.
//!
//! A [`ChatSession`] holds at most one connection for the whole process.
//! The first [`init`](ChatSession::init) connects; later calls are no-ops.
//! Outgoing messages are not echoed locally: the relay broadcasts every
//! message back to all clients, the sender included, and that broadcast is
//! what ends up in the feed. The feed keeps the last
//! [`CHAT_HISTORY_CAPACITY`] lines.

mod nats;

pub use nats::NatsChatConnector;

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use futures::StreamExt;
use starlaunch_models::{ChatMessage, OperatorName};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::SdkError;

/// Number of chat lines the feed retains.
pub const CHAT_HISTORY_CAPACITY: usize = 200;

// ---------------------------------------------------------------------------
// Transport seam
// ---------------------------------------------------------------------------

/// Both halves of a live chat connection.
pub struct ChatChannel {
    /// Messages queued here are published as `new_message` events.
    pub outbound: mpsc::UnboundedSender<ChatMessage>,
    /// `broadcast_message` events in delivery order. Ends when the
    /// connection is lost.
    pub inbound: BoxStream<'static, ChatMessage>,
}

/// Opens chat connections.
pub trait ChatConnector: Send + Sync + 'static {
    /// Connect to the shared channel as `operator`.
    fn connect(
        &self,
        operator: &OperatorName,
    ) -> impl Future<Output = Result<ChatChannel, SdkError>> + Send;
}

// ---------------------------------------------------------------------------
// Feed entries
// ---------------------------------------------------------------------------

/// Who wrote a chat line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatAuthor {
    /// The relay (`"Sistema"`); rendered with distinct styling.
    System,
    /// A named operator.
    Operator(String),
}

/// A received chat line, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    /// Author, with the system sentinel resolved.
    pub author: ChatAuthor,
    /// Message body.
    pub message: String,
    /// Local arrival time.
    pub received_at: DateTime<Utc>,
}

impl ChatEntry {
    /// True for relay-originated lines.
    pub fn is_system(&self) -> bool {
        self.author == ChatAuthor::System
    }
}

impl From<ChatMessage> for ChatEntry {
    fn from(msg: ChatMessage) -> Self {
        let author = if msg.is_system() {
            ChatAuthor::System
        } else {
            ChatAuthor::Operator(msg.username)
        };
        Self {
            author,
            message: msg.message,
            received_at: Utc::now(),
        }
    }
}

impl fmt::Display for ChatEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let time = self.received_at.format("%H:%M:%S");
        match &self.author {
            ChatAuthor::System => write!(f, "{time} [Sistema] {}", self.message),
            ChatAuthor::Operator(name) => write!(f, "{time} [{name}] {}", self.message),
        }
    }
}

/// Receives chat lines as they arrive.
pub trait ChatObserver: Send + Sync {
    /// A broadcast arrived and was appended to the feed.
    fn on_message(&self, entry: &ChatEntry);
}

#[derive(Default)]
struct Feed {
    entries: Mutex<VecDeque<ChatEntry>>,
    observers: Mutex<Vec<Arc<dyn ChatObserver>>>,
}

impl Feed {
    fn append(&self, entry: ChatEntry) {
        {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            if entries.len() == CHAT_HISTORY_CAPACITY {
                entries.pop_front();
            }
            entries.push_back(entry.clone());
        }
        let observers = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for observer in observers {
            observer.on_message(&entry);
        }
    }
}

// ---------------------------------------------------------------------------
// ChatSession
// ---------------------------------------------------------------------------

struct ActiveChat {
    operator: OperatorName,
    outbound: mpsc::UnboundedSender<ChatMessage>,
    pump: JoinHandle<()>,
}

impl Drop for ActiveChat {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

/// The process-wide chat connection.
pub struct ChatSession<C> {
    connector: C,
    feed: Arc<Feed>,
    active: Option<ActiveChat>,
}

impl<C: ChatConnector> ChatSession<C> {
    /// A session that has not connected yet.
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            feed: Arc::default(),
            active: None,
        }
    }

    /// Register an observer for every subsequent chat line.
    pub fn observe(&self, observer: Arc<dyn ChatObserver>) {
        self.feed
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    /// Connect as `operator` (blank or absent means `"operador"`).
    ///
    /// Does nothing once a connection exists, whatever name is passed.
    pub async fn init(&mut self, operator: Option<&str>) -> Result<(), SdkError> {
        if let Some(active) = &self.active {
            debug!(operator = %active.operator, "chat already initialised, ignoring");
            return Ok(());
        }
        let operator = OperatorName::or_default(operator);
        let channel = self.connector.connect(&operator).await?;

        let pump = tokio::spawn(pump(self.feed.clone(), channel.inbound));
        info!(%operator, "chat connected");
        self.active = Some(ActiveChat {
            operator,
            outbound: channel.outbound,
            pump,
        });
        Ok(())
    }

    /// Publish `text` as the current operator.
    ///
    /// Blank text is ignored. The message is not added to the local feed;
    /// it shows up when the relay broadcasts it back.
    pub fn send(&self, text: &str) -> Result<(), SdkError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        let active = self
            .active
            .as_ref()
            .ok_or_else(|| SdkError::Transport("chat is not connected".into()))?;
        active
            .outbound
            .send(ChatMessage::new(active.operator.as_str(), text))
            .map_err(|_| SdkError::Transport("chat connection closed".into()))
    }

    /// The operator the connection was opened as.
    pub fn operator(&self) -> Option<&OperatorName> {
        self.active.as_ref().map(|a| &a.operator)
    }

    /// True once `init` has connected.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// The retained history, oldest first.
    pub fn messages(&self) -> Vec<ChatEntry> {
        self.feed
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

async fn pump(feed: Arc<Feed>, mut inbound: BoxStream<'static, ChatMessage>) {
    while let Some(msg) = inbound.next().await {
        feed.append(ChatEntry::from(msg));
    }
    // No reconnect: the feed simply stops growing.
    warn!("chat connection lost");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[derive(Default)]
    struct FakeInner {
        connects: AtomicUsize,
        operators: Mutex<Vec<String>>,
        inbound: Mutex<Option<mpsc::UnboundedSender<ChatMessage>>>,
        outbound: Mutex<Option<mpsc::UnboundedReceiver<ChatMessage>>>,
    }

    #[derive(Clone, Default)]
    struct FakeConnector {
        inner: Arc<FakeInner>,
    }

    impl FakeConnector {
        fn deliver(&self, msg: ChatMessage) {
            if let Some(tx) = self.inner.inbound.lock().unwrap().as_ref() {
                tx.send(msg).unwrap();
            }
        }

        fn published(&self) -> Vec<ChatMessage> {
            let mut guard = self.inner.outbound.lock().unwrap();
            let mut out = Vec::new();
            if let Some(rx) = guard.as_mut() {
                while let Ok(msg) = rx.try_recv() {
                    out.push(msg);
                }
            }
            out
        }
    }

    impl ChatConnector for FakeConnector {
        async fn connect(&self, operator: &OperatorName) -> Result<ChatChannel, SdkError> {
            self.inner.connects.fetch_add(1, Ordering::SeqCst);
            self.inner.operators.lock().unwrap().push(operator.to_string());

            let (outbound, out_rx) = mpsc::unbounded_channel();
            let (in_tx, in_rx) = mpsc::unbounded_channel();
            *self.inner.outbound.lock().unwrap() = Some(out_rx);
            *self.inner.inbound.lock().unwrap() = Some(in_tx);

            let inbound = futures::stream::unfold(in_rx, |mut rx| async move {
                rx.recv().await.map(|msg| (msg, rx))
            });
            Ok(ChatChannel {
                outbound,
                inbound: inbound.boxed(),
            })
        }
    }

    #[derive(Default)]
    struct Lines(Mutex<Vec<String>>);

    impl ChatObserver for Lines {
        fn on_message(&self, entry: &ChatEntry) {
            let line = entry.to_string();
            // Drop the `HH:MM:SS ` arrival stamp.
            self.0.lock().unwrap().push(line[9..].to_string());
        }
    }

    async fn eventually(cond: impl Fn() -> bool) {
        let waited = tokio::time::timeout(Duration::from_secs(2), async {
            while !cond() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(waited.is_ok(), "condition not reached");
    }

    #[tokio::test]
    async fn init_twice_keeps_first_connection_and_name() {
        let connector = FakeConnector::default();
        let mut chat = ChatSession::new(connector.clone());

        chat.init(Some("ana")).await.unwrap();
        chat.init(Some("luis")).await.unwrap();

        assert_eq!(connector.inner.connects.load(Ordering::SeqCst), 1);
        assert_eq!(*connector.inner.operators.lock().unwrap(), vec!["ana"]);
        assert_eq!(chat.operator().unwrap().as_str(), "ana");

        chat.send("hola").unwrap();
        assert_eq!(connector.published(), vec![ChatMessage::new("ana", "hola")]);
    }

    #[tokio::test]
    async fn blank_operator_uses_default_name() {
        let connector = FakeConnector::default();
        let mut chat = ChatSession::new(connector.clone());
        chat.init(Some("  ")).await.unwrap();
        assert_eq!(chat.operator().unwrap().as_str(), "operador");
    }

    #[tokio::test]
    async fn blank_text_is_not_sent() {
        let connector = FakeConnector::default();
        let mut chat = ChatSession::new(connector.clone());
        chat.init(None).await.unwrap();

        chat.send("   ").unwrap();
        chat.send("").unwrap();
        chat.send("  copy that ").unwrap();

        assert_eq!(
            connector.published(),
            vec![ChatMessage::new("operador", "copy that")]
        );
    }

    #[tokio::test]
    async fn send_does_not_echo_locally() {
        let connector = FakeConnector::default();
        let mut chat = ChatSession::new(connector.clone());
        chat.init(Some("ana")).await.unwrap();

        chat.send("hola").unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(chat.messages().is_empty());
    }

    #[tokio::test]
    async fn send_before_init_is_a_transport_error() {
        let chat = ChatSession::new(FakeConnector::default());
        let err = chat.send("hola").unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn broadcasts_are_appended_in_delivery_order() {
        let connector = FakeConnector::default();
        let mut chat = ChatSession::new(connector.clone());
        let lines = Arc::new(Lines::default());
        chat.observe(lines.clone());
        chat.init(Some("ana")).await.unwrap();

        connector.deliver(ChatMessage::system("Nuevo operador conectado"));
        connector.deliver(ChatMessage::new("luis", "T-10"));
        connector.deliver(ChatMessage::new("ana", "go"));
        eventually(|| chat.messages().len() == 3).await;

        let messages = chat.messages();
        assert!(messages[0].is_system());
        assert_eq!(messages[1].author, ChatAuthor::Operator("luis".into()));
        assert_eq!(
            *lines.0.lock().unwrap(),
            vec!["[Sistema] Nuevo operador conectado", "[luis] T-10", "[ana] go"]
        );
    }

    #[tokio::test]
    async fn history_keeps_only_the_latest_lines() {
        let connector = FakeConnector::default();
        let mut chat = ChatSession::new(connector.clone());
        chat.init(Some("ana")).await.unwrap();

        for i in 0..CHAT_HISTORY_CAPACITY + 5 {
            connector.deliver(ChatMessage::new("luis", format!("línea {i}")));
        }
        eventually(|| {
            chat.messages()
                .last()
                .is_some_and(|e| e.message == format!("línea {}", CHAT_HISTORY_CAPACITY + 4))
        })
        .await;

        let messages = chat.messages();
        assert_eq!(messages.len(), CHAT_HISTORY_CAPACITY);
        assert_eq!(messages[0].message, "línea 5");
    }

    #[test]
    fn entry_shows_arrival_time() {
        let entry = ChatEntry {
            author: ChatAuthor::Operator("luis".into()),
            message: "T-10".into(),
            received_at: DateTime::parse_from_rfc3339("2026-03-01T14:03:07Z")
                .unwrap()
                .with_timezone(&Utc),
        };
        assert_eq!(entry.to_string(), "14:03:07 [luis] T-10");

        let system = ChatEntry {
            author: ChatAuthor::System,
            ..entry
        };
        assert_eq!(system.to_string(), "14:03:07 [Sistema] T-10");
    }
}
