//! Single-stream telemetry subscription.
//!
//! The subscription is a two-state machine (`Idle` / `Subscribed`). Every
//! `start` tears the current stream down before spawning the next one, so at
//! most one stream is ever live. Each stream is one task that opens the
//! connection and then pumps its frames; teardown aborts that task and waits
//! for it, which also cancels an open that has not answered yet.
//!
//! Delivery is guarded by a generation counter checked under the hub lock:
//! once teardown has bumped the generation, a stale task can no longer reach
//! the observers or mark itself active, even if a frame was already in
//! flight.

use std::sync::Arc;

use futures::StreamExt;
use starlaunch_models::{MissionId, TelemetrySample};
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::source::{FrameStream, TelemetrySource};
use super::TelemetryObserver;
use crate::error::SdkError;

/// Observable state of a [`TelemetrySubscription`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    /// No live stream.
    Idle,
    /// A stream for the given mission is live.
    Subscribed(MissionId),
}

/// Resolves once the stream started by [`TelemetrySubscription::start`] is
/// open, or with the error that prevented it.
pub type Opened = oneshot::Receiver<Result<(), SdkError>>;

struct Hub {
    generation: u64,
    active: Option<MissionId>,
    observers: Vec<Arc<dyn TelemetryObserver>>,
}

/// The task of the current stream. Dropping it aborts the task, which in
/// turn drops the stream or the pending open.
struct LiveStream {
    mission: MissionId,
    task: JoinHandle<()>,
}

impl LiveStream {
    async fn close(mut self) {
        self.task.abort();
        // Cancelled or already finished; either way the stream is gone.
        let _ = (&mut self.task).await;
    }
}

impl Drop for LiveStream {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Owns at most one live telemetry stream.
///
/// All methods take `&self`. `start` and `unsubscribe` are serialised on
/// the `live` slot, and the last `start` wins.
pub struct TelemetrySubscription<S> {
    source: Arc<S>,
    hub: Arc<Mutex<Hub>>,
    live: Mutex<Option<LiveStream>>,
}

impl<S: TelemetrySource> TelemetrySubscription<S> {
    /// An idle subscription drawing streams from `source`.
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
            hub: Arc::new(Mutex::new(Hub {
                generation: 0,
                active: None,
                observers: Vec::new(),
            })),
            live: Mutex::new(None),
        }
    }

    /// Register an observer for every subsequent sample.
    pub async fn observe(&self, observer: Arc<dyn TelemetryObserver>) {
        self.hub.lock().await.observers.push(observer);
    }

    /// Current state. A stream that failed on its own, or one that is still
    /// opening, reports `Idle`.
    pub async fn state(&self) -> SubscriptionState {
        match self.hub.lock().await.active {
            Some(mission) => SubscriptionState::Subscribed(mission),
            None => SubscriptionState::Idle,
        }
    }

    /// Replace whatever stream is live with one for `mission` and wait for
    /// it to open.
    ///
    /// If opening fails the subscription stays `Idle` and the error is
    /// returned. If another `start` or `unsubscribe` supersedes this one
    /// first, `Ok(())` is returned and nothing was opened.
    pub async fn subscribe(&self, mission: MissionId) -> Result<(), SdkError> {
        let opened = self.start(mission).await;
        opened.await.unwrap_or(Ok(()))
    }

    /// Tear down the current stream and begin opening one for `mission`
    /// without waiting for the server.
    ///
    /// The previous stream is torn down unconditionally, even when it was
    /// for the same mission. The returned receiver reports how the open
    /// went; dropping it is fine.
    pub async fn start(&self, mission: MissionId) -> Opened {
        let mut live = self.live.lock().await;
        let generation = self.teardown(&mut live).await;
        let (tx, rx) = oneshot::channel();
        let task = tokio::spawn(run_stream(
            self.source.clone(),
            self.hub.clone(),
            generation,
            mission,
            tx,
        ));
        *live = Some(LiveStream { mission, task });
        rx
    }

    /// Tear down the live stream, if any. Idempotent.
    pub async fn unsubscribe(&self) {
        let mut live = self.live.lock().await;
        self.teardown(&mut live).await;
    }

    /// Bump the generation and close the current task. Returns the new
    /// generation.
    async fn teardown(&self, live: &mut Option<LiveStream>) -> u64 {
        let generation = {
            let mut hub = self.hub.lock().await;
            hub.generation += 1;
            hub.active = None;
            hub.generation
        };
        if let Some(live) = live.take() {
            let mission = live.mission;
            live.close().await;
            debug!(%mission, "telemetry stream torn down");
        }
        generation
    }
}

async fn run_stream<S: TelemetrySource>(
    source: Arc<S>,
    hub: Arc<Mutex<Hub>>,
    generation: u64,
    mission: MissionId,
    opened: oneshot::Sender<Result<(), SdkError>>,
) {
    let frames = match source.open(mission).await {
        Ok(frames) => frames,
        Err(e) => {
            warn!(%mission, error = %e, "failed to open telemetry stream");
            let _ = opened.send(Err(e));
            return;
        }
    };

    {
        let mut hub = hub.lock().await;
        if hub.generation != generation {
            return;
        }
        hub.active = Some(mission);
    }
    info!(%mission, "telemetry subscribed");
    let _ = opened.send(Ok(()));

    pump(hub, generation, mission, frames).await;
}

async fn pump(hub: Arc<Mutex<Hub>>, generation: u64, mission: MissionId, mut frames: FrameStream) {
    let failure = loop {
        let payload = match frames.next().await {
            Some(Ok(payload)) => payload,
            Some(Err(e)) => break Some(e),
            None => break None,
        };
        let sample = match TelemetrySample::from_frame(&payload) {
            Ok(sample) => sample,
            Err(e) => {
                debug!(%mission, error = %e, "dropping malformed telemetry frame");
                continue;
            }
        };

        let hub = hub.lock().await;
        if hub.generation != generation {
            return;
        }
        for observer in &hub.observers {
            observer.on_sample(mission, &sample);
        }
    };
    drop(frames);

    let mut hub = hub.lock().await;
    if hub.generation != generation {
        return;
    }
    hub.active = None;
    match failure {
        Some(e) => warn!(%mission, error = %e, "telemetry stream failed, subscription closed"),
        None => warn!(%mission, "telemetry stream closed by server"),
    }
    for observer in &hub.observers {
        observer.on_closed(mission);
    }
}
