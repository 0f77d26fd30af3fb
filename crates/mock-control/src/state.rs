//! In-memory mission store and request bookkeeping.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use starlaunch_models::{Mission, MissionId, NewMission};

/// Name of the mission present on a fresh store.
pub const SEED_MISSION_NAME: &str = "Odyssey One";
/// Status of the seeded mission.
pub const SEED_MISSION_STATUS: &str = "Preparación";
/// Flight plan of the seeded mission.
pub const SEED_FLIGHT_PLAN: &str =
    "Lanzamiento desde plataforma A, órbita baja terrestre, fase de prueba de sistemas.";

/// What `GET /telemetry/stream` sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelemetryMode {
    /// An endless simulated climb, one sample per interval.
    Simulated {
        /// Pause between samples.
        interval: Duration,
    },
    /// These raw `data:` payloads, one per interval; the stream ends after
    /// the last one.
    Scripted {
        /// Event payloads, sent verbatim.
        frames: Vec<String>,
        /// Pause before each frame.
        interval: Duration,
    },
}

impl Default for TelemetryMode {
    fn default() -> Self {
        Self::Simulated {
            interval: Duration::from_secs(1),
        }
    }
}

struct Store {
    missions: Vec<Mission>,
    next_id: i64,
}

struct Inner {
    store: Mutex<Store>,
    telemetry: Mutex<TelemetryMode>,
    detail_delays: Mutex<HashMap<MissionId, Duration>>,
    create_hits: AtomicUsize,
    telemetry_requests: Mutex<Vec<Option<MissionId>>>,
    open_streams: AtomicUsize,
}

/// Handler state. Cloning shares the same store.
#[derive(Clone)]
pub struct MockState {
    inner: Arc<Inner>,
}

impl Default for MockState {
    fn default() -> Self {
        Self::new(TelemetryMode::default())
    }
}

impl MockState {
    /// A store seeded with mission 1, streaming telemetry per `telemetry`.
    pub fn new(telemetry: TelemetryMode) -> Self {
        let seed = Mission {
            id: MissionId::new(1),
            name: SEED_MISSION_NAME.to_string(),
            status: SEED_MISSION_STATUS.to_string(),
            flight_plan: SEED_FLIGHT_PLAN.to_string(),
        };
        Self {
            inner: Arc::new(Inner {
                store: Mutex::new(Store {
                    missions: vec![seed],
                    next_id: 2,
                }),
                telemetry: Mutex::new(telemetry),
                detail_delays: Mutex::default(),
                create_hits: AtomicUsize::new(0),
                telemetry_requests: Mutex::default(),
                open_streams: AtomicUsize::new(0),
            }),
        }
    }

    // ------------------------------------------------------------------
    // Missions
    // ------------------------------------------------------------------

    /// Every mission, ordered by id.
    pub fn missions(&self) -> Vec<Mission> {
        self.store().missions.clone()
    }

    /// One mission by id.
    pub fn mission(&self, id: MissionId) -> Option<Mission> {
        self.store().missions.iter().find(|m| m.id == id).cloned()
    }

    /// Store a validated mission and assign it the next id.
    pub fn insert(&self, request: &NewMission) -> Mission {
        let mut store = self.store();
        let mission = Mission {
            id: MissionId::new(store.next_id),
            name: request.name().to_string(),
            status: request.status().to_string(),
            flight_plan: request.flight_plan().to_string(),
        };
        store.next_id += 1;
        store.missions.push(mission.clone());
        mission
    }

    /// Hold `GET /missions/{id}` for `delay` before answering.
    pub fn set_detail_delay(&self, id: MissionId, delay: Duration) {
        lock(&self.inner.detail_delays).insert(id, delay);
    }

    pub(crate) fn detail_delay(&self, id: MissionId) -> Option<Duration> {
        lock(&self.inner.detail_delays).get(&id).copied()
    }

    pub(crate) fn record_create(&self) {
        self.inner.create_hits.fetch_add(1, Ordering::SeqCst);
    }

    /// Number of `POST /missions` requests received, valid or not.
    pub fn create_hits(&self) -> usize {
        self.inner.create_hits.load(Ordering::SeqCst)
    }

    // ------------------------------------------------------------------
    // Telemetry
    // ------------------------------------------------------------------

    /// Change what new telemetry streams send.
    pub fn set_telemetry(&self, mode: TelemetryMode) {
        *lock(&self.inner.telemetry) = mode;
    }

    pub(crate) fn telemetry(&self) -> TelemetryMode {
        lock(&self.inner.telemetry).clone()
    }

    pub(crate) fn record_telemetry_request(&self, mission: Option<MissionId>) -> StreamGuard {
        lock(&self.inner.telemetry_requests).push(mission);
        self.inner.open_streams.fetch_add(1, Ordering::SeqCst);
        StreamGuard {
            inner: self.inner.clone(),
        }
    }

    /// The `mission_id` of every telemetry stream request, in arrival order.
    pub fn telemetry_requests(&self) -> Vec<Option<MissionId>> {
        lock(&self.inner.telemetry_requests).clone()
    }

    /// Telemetry streams currently being served.
    pub fn open_streams(&self) -> usize {
        self.inner.open_streams.load(Ordering::SeqCst)
    }

    fn store(&self) -> std::sync::MutexGuard<'_, Store> {
        lock(&self.inner.store)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Counts an open telemetry stream until the response body is dropped.
pub(crate) struct StreamGuard {
    inner: Arc<Inner>,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.inner.open_streams.fetch_sub(1, Ordering::SeqCst);
    }
}
