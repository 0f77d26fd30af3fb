//! Live telemetry for the selected mission.
//!
//! * [`TelemetrySource`] opens a raw frame stream for one mission; the
//!   production implementation is [`SseTelemetrySource`].
//! * [`TelemetrySubscription`] owns at most one live stream, parses frames
//!   and fans samples out to registered [`TelemetryObserver`]s.
//! * [`TelemetryLog`] keeps the most recent samples for display and is
//!   itself an observer.

mod log;
mod source;
mod subscription;

pub use log::{TelemetryLog, TelemetryLogEntry, TELEMETRY_LOG_CAPACITY};
pub use source::{FrameStream, SseTelemetrySource, TelemetrySource};
pub use subscription::{Opened, SubscriptionState, TelemetrySubscription};

use starlaunch_models::{MissionId, TelemetrySample};

/// Receives telemetry from a [`TelemetrySubscription`].
///
/// Callbacks run on the stream's pump task while the subscription holds its
/// delivery lock, so they must not block and must not call back into the
/// subscription.
pub trait TelemetryObserver: Send + Sync {
    /// A well-formed sample arrived on the live stream.
    fn on_sample(&self, mission: MissionId, sample: &TelemetrySample);

    /// The live stream failed or was closed by the server. The subscription
    /// is `Idle` afterwards and will not reconnect on its own.
    fn on_closed(&self, _mission: MissionId) {}
}
