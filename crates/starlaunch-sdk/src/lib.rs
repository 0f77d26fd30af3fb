//! # Starlaunch SDK
//!
//! Client-side coordination layer for the **Starlaunch** mission control
//! room.
//!
//! The SDK provides:
//!
//! * [`ControlRoom`]: login, mission selection, live telemetry and chat
//!   behind one handle.
//! * [`MissionSelectionController`]: keeps the detail pane and the
//!   telemetry stream on the same mission, dropping stale responses.
//! * [`TelemetrySubscription`]: at most one live telemetry stream, with
//!   teardown before every switch.
//! * [`ChatSession`]: the single shared chat connection.
//! * [`MissionDirectory`] / [`OperatorLogin`]: the HTTP API.
//! * [`ChatSubjects`]: NATS subjects shared with the chat relay.
//! * [`SdkError`]: unified error type.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use starlaunch_models::{ChannelId, MissionId};
//! use starlaunch_sdk::{ControlRoom, RoomSettings};
//!
//! # async fn run() -> Result<(), starlaunch_sdk::SdkError> {
//! let room = ControlRoom::open(&RoomSettings {
//!     api_url: "http://localhost:5000/api".into(),
//!     nats_url: "nats://localhost:4222".into(),
//!     chat_channel: ChannelId::new("control-room")?,
//!     default_mission: Some(MissionId::new(1)),
//! })
//! .await?;
//!
//! room.login("ana").await?;
//! room.bootstrap().await?;
//! room.select_mission(MissionId::new(2)).await;
//! room.send_chat("T-10 y contando").await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod chat;
pub mod controller;
pub mod directory;
pub mod error;
pub mod login;
pub mod room;
pub mod session;
pub mod subjects;
pub mod telemetry;

pub use api::ApiClient;
pub use chat::{
    ChatAuthor, ChatChannel, ChatConnector, ChatEntry, ChatObserver, ChatSession,
    NatsChatConnector, CHAT_HISTORY_CAPACITY,
};
pub use controller::{CreateOutcome, MissionSelectionController, MissionView, SelectOutcome};
pub use directory::MissionDirectory;
pub use error::SdkError;
pub use login::{Operator, OperatorLogin};
pub use room::{ControlRoom, RoomSettings};
pub use session::{MissionDetail, SessionContext};
pub use subjects::{ChatEvent, ChatSubjects};
pub use telemetry::{
    FrameStream, Opened, SseTelemetrySource, SubscriptionState, TelemetryLog, TelemetryLogEntry,
    TelemetryObserver, TelemetrySource, TelemetrySubscription,
};
