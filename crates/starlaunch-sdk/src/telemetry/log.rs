//! Bounded display log of recent telemetry samples.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use starlaunch_models::{MissionId, TelemetrySample};

use super::TelemetryObserver;

/// Number of entries the log retains.
pub const TELEMETRY_LOG_CAPACITY: usize = 20;

/// A formatted projection of one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryLogEntry {
    /// The sample the line was rendered from.
    pub sample: TelemetrySample,
    /// Rendered display line.
    pub line: String,
}

impl From<&TelemetrySample> for TelemetryLogEntry {
    fn from(sample: &TelemetrySample) -> Self {
        Self {
            sample: sample.clone(),
            line: sample.to_string(),
        }
    }
}

impl fmt::Display for TelemetryLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line)
    }
}

/// Most-recent-first ring of the last [`TELEMETRY_LOG_CAPACITY`] samples.
///
/// When full, recording a new sample evicts the oldest one.
#[derive(Debug, Clone)]
pub struct TelemetryLog {
    entries: VecDeque<TelemetryLogEntry>,
    capacity: usize,
}

impl Default for TelemetryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryLog {
    /// An empty log with the standard capacity.
    pub fn new() -> Self {
        Self::with_capacity(TELEMETRY_LOG_CAPACITY)
    }

    /// An empty log holding at most `capacity` entries (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Prepend a formatted entry and drop entries beyond capacity.
    pub fn record(&mut self, sample: &TelemetrySample) {
        self.entries.push_front(TelemetryLogEntry::from(sample));
        self.entries.truncate(self.capacity);
    }

    /// Current contents, most recent first.
    pub fn entries(&self) -> impl Iterator<Item = &TelemetryLogEntry> {
        self.entries.iter()
    }

    /// The most recent entry, if any.
    pub fn latest(&self) -> Option<&TelemetryLogEntry> {
        self.entries.front()
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of retained entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl TelemetryObserver for Mutex<TelemetryLog> {
    fn on_sample(&self, _mission: MissionId, sample: &TelemetrySample) {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(sample);
    }
}
