#![deny(missing_docs)]

//! # Starlaunch Models
//!
//! Core data types exchanged between the control-room client, the mission
//! persistence service, the telemetry stream and the chat relay.
//!
//! ## Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`mission`] | `MissionId`, `Mission`, validated `NewMission` |
//! | [`telemetry`] | `TelemetrySample` stream payload |
//! | [`chat`] | `ChatMessage`, `PresenceNotice`, `ChannelId` |
//! | [`operator`] | `OperatorName`, login request / response |
//! | [`error`] | `ModelError` |

pub mod chat;
pub mod error;
pub mod mission;
pub mod operator;
pub mod telemetry;

// Re-export all public types at crate root for convenience.
pub use chat::*;
pub use error::*;
pub use mission::*;
pub use operator::*;
pub use telemetry::*;
