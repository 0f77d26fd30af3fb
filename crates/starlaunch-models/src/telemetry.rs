//! Telemetry stream payloads.
//!
//! A [`TelemetrySample`] only ever exists as a stream event; the client does
//! not persist it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One point-in-time reading for the selected mission.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TelemetrySample {
    /// Server-formatted timestamp (ISO-8601 in practice, not parsed).
    pub timestamp: String,
    /// Altitude in metres.
    pub altitude: f64,
    /// Velocity in metres per second.
    pub velocity: f64,
    /// Remaining fuel, expected within 0–100 % but not enforced.
    pub fuel: f64,
    /// Free-form flight phase label.
    pub status: String,
}

impl TelemetrySample {
    /// Parse one stream frame. Fails on anything that is not a complete sample.
    pub fn from_frame(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}

impl fmt::Display for TelemetrySample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] Altitud {:.1} m, Velocidad {:.1} m/s, Combustible {:.1} %, Estado {}",
            self.timestamp, self.altitude, self.velocity, self.fuel, self.status
        )
    }
}
