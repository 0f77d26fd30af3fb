//! Telemetry frame generation.

use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use rand::Rng;
use starlaunch_models::TelemetrySample;
use tracing::warn;

use crate::state::TelemetryMode;

/// Status before orbit is reached.
pub const COUNTDOWN_STATUS: &str = "Cuenta regresiva";
/// Status once altitude exceeds [`ORBIT_ALTITUDE`].
pub const IN_ORBIT_STATUS: &str = "En órbita";
/// Altitude (m) above which the climb reports orbit.
pub const ORBIT_ALTITUDE: f64 = 100_000.0;

/// A rocket that climbs by a random step on every tick.
#[derive(Debug, Clone)]
pub struct Climb {
    altitude: f64,
    velocity: f64,
    fuel: f64,
    status: &'static str,
}

impl Default for Climb {
    fn default() -> Self {
        Self {
            altitude: 0.0,
            velocity: 0.0,
            fuel: 100.0,
            status: COUNTDOWN_STATUS,
        }
    }
}

impl Climb {
    /// Advance one tick and report the new reading.
    pub fn advance(&mut self) -> TelemetrySample {
        let mut rng = rand::thread_rng();
        self.altitude += rng.gen_range(80.0..200.0);
        self.velocity += rng.gen_range(30.0..80.0);
        self.fuel = (self.fuel - rng.gen_range(0.1..0.5)).max(0.0);
        if self.altitude > ORBIT_ALTITUDE {
            self.status = IN_ORBIT_STATUS;
        }

        TelemetrySample {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            altitude: self.altitude,
            velocity: self.velocity,
            fuel: self.fuel,
            status: self.status.to_string(),
        }
    }
}

/// Event payloads for one stream.
pub(crate) fn frames(mode: TelemetryMode) -> BoxStream<'static, String> {
    match mode {
        TelemetryMode::Simulated { interval } => simulated(interval),
        TelemetryMode::Scripted { frames, interval } => stream::iter(frames)
            .then(move |frame| async move {
                tokio::time::sleep(interval).await;
                frame
            })
            .boxed(),
    }
}

fn simulated(interval: Duration) -> BoxStream<'static, String> {
    stream::unfold((Climb::default(), true), move |(mut climb, first)| async move {
        if !first {
            tokio::time::sleep(interval).await;
        }
        let sample = climb.advance();
        let frame = match serde_json::to_string(&sample) {
            Ok(frame) => Some(frame),
            Err(e) => {
                warn!(error = %e, "failed to encode telemetry sample");
                None
            }
        };
        Some((frame, (climb, false)))
    })
    .filter_map(|frame| async move { frame })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn climb_rises_and_burns_fuel() {
        let mut climb = Climb::default();
        let first = climb.advance();
        let second = climb.advance();

        assert!(first.altitude >= 80.0 && first.altitude < 200.0);
        assert!(second.altitude > first.altitude);
        assert!(second.velocity > first.velocity);
        assert!(second.fuel < first.fuel);
        assert_eq!(second.status, COUNTDOWN_STATUS);
    }

    #[test]
    fn fuel_never_goes_negative() {
        let mut climb = Climb {
            fuel: 0.2,
            ..Climb::default()
        };
        for _ in 0..5 {
            assert!(climb.advance().fuel >= 0.0);
        }
    }

    #[test]
    fn orbit_status_above_threshold() {
        let mut climb = Climb {
            altitude: ORBIT_ALTITUDE,
            ..Climb::default()
        };
        assert_eq!(climb.advance().status, IN_ORBIT_STATUS);
    }

    #[tokio::test]
    async fn scripted_stream_ends_after_last_frame() {
        let mode = TelemetryMode::Scripted {
            frames: vec!["a".into(), "b".into()],
            interval: Duration::from_millis(1),
        };
        let sent: Vec<String> = frames(mode).collect().await;
        assert_eq!(sent, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn simulated_frames_are_samples() {
        let mode = TelemetryMode::Simulated {
            interval: Duration::from_millis(1),
        };
        let sent: Vec<String> = frames(mode).take(2).collect().await;
        for frame in sent {
            let sample = TelemetrySample::from_frame(&frame).unwrap();
            assert!(sample.timestamp.ends_with('Z'));
        }
    }
}
