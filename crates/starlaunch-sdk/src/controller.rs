//! Mission selection orchestration.
//!
//! [`MissionSelectionController`] ties the mission directory and the
//! telemetry subscription together around one [`SessionContext`].
//!
//! Detail fetches are tagged with the mission they were issued for. When the
//! response arrives the session lock is taken and the response is dropped if
//! the operator has moved on. The telemetry stream is started under the same
//! lock, so a stale selection can neither overwrite the detail pane nor
//! steal the stream. Only the hand-off happens there: the stream opens in
//! its own task, and no network wait ever holds the session lock.

use std::sync::{Arc, PoisonError};

use starlaunch_models::{Mission, MissionId, TelemetrySample};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::directory::MissionDirectory;
use crate::error::SdkError;
use crate::login::Operator;
use crate::session::{MissionDetail, SessionContext};
use crate::telemetry::{
    SubscriptionState, TelemetryLog, TelemetryLogEntry, TelemetryObserver, TelemetrySource,
    TelemetrySubscription,
};

/// UI callbacks for mission state changes.
pub trait MissionView: Send + Sync {
    /// A fresh mission list was loaded.
    fn on_missions(&self, _missions: &[Mission]) {}
    /// The detail pane changed.
    fn on_detail(&self, _detail: &MissionDetail) {}
}

/// Result of [`MissionSelectionController::select_mission`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The response was applied to the session.
    Applied(MissionDetail),
    /// Another mission was selected while this one was being fetched.
    Superseded {
        /// The mission this call asked for.
        requested: MissionId,
        /// The mission selected now.
        current: Option<MissionId>,
    },
}

/// Result of [`MissionSelectionController::create_mission`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The mission was stored and the list refreshed.
    Created(Mission),
    /// A required field was empty; nothing was sent.
    Invalid(String),
    /// The server refused the mission; the reason is its own text.
    Rejected(String),
    /// The request never completed.
    Failed(String),
}

/// Owns the session context and drives detail + telemetry on selection.
pub struct MissionSelectionController<S> {
    directory: MissionDirectory,
    session: Mutex<SessionContext>,
    telemetry: TelemetrySubscription<S>,
    log: Arc<std::sync::Mutex<TelemetryLog>>,
    views: std::sync::Mutex<Vec<Arc<dyn MissionView>>>,
}

impl<S: TelemetrySource> MissionSelectionController<S> {
    /// Build a controller. `provisional_mission` is treated as selected
    /// until the operator picks something else.
    pub async fn new(
        directory: MissionDirectory,
        source: S,
        provisional_mission: Option<MissionId>,
    ) -> Self {
        let telemetry = TelemetrySubscription::new(source);
        let log = Arc::new(std::sync::Mutex::new(TelemetryLog::new()));
        telemetry.observe(log.clone()).await;
        Self {
            directory,
            session: Mutex::new(SessionContext::new(provisional_mission)),
            telemetry,
            log,
            views: std::sync::Mutex::default(),
        }
    }

    /// Register a view for mission list and detail changes.
    pub fn observe_missions(&self, view: Arc<dyn MissionView>) {
        self.views
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(view);
    }

    /// Forward live samples to `observer` as well as the telemetry log.
    pub async fn observe_telemetry(&self, observer: Arc<dyn TelemetryObserver>) {
        self.telemetry.observe(observer).await;
    }

    /// The mission directory this controller fetches from.
    pub fn directory(&self) -> &MissionDirectory {
        &self.directory
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Select `id`: fetch its detail and, if it exists, resubscribe
    /// telemetry to it.
    ///
    /// Returns once the detail is applied; the new stream keeps opening in
    /// the background and shows up in [`Self::telemetry_state`] when live.
    ///
    /// A missing mission leaves the detail pane in the not-found state and
    /// keeps `id` as the current mission. Failures never escape; they end up
    /// in the returned detail state.
    pub async fn select_mission(&self, id: MissionId) -> SelectOutcome {
        self.session.lock().await.current_mission = Some(id);
        info!(mission = %id, "mission selected");
        self.load_detail(id, false).await
    }

    /// Load the mission list, default the selection to its first entry if
    /// nothing is selected, refresh the detail pane and restart telemetry
    /// for the current mission.
    pub async fn bootstrap(&self) -> Result<Vec<Mission>, SdkError> {
        let missions = self.directory.list_missions().await.map_err(|e| {
            warn!(error = %e, "failed to load mission list");
            e
        })?;
        for view in self.views() {
            view.on_missions(&missions);
        }

        let current = {
            let mut session = self.session.lock().await;
            session.missions = missions.clone();
            if session.current_mission.is_none() {
                session.current_mission = missions.first().map(|m| m.id);
            }
            session.current_mission
        };

        if let Some(id) = current {
            self.load_detail(id, true).await;
        }
        Ok(missions)
    }

    /// Create a mission and, on success, reload the list.
    pub async fn create_mission(&self, name: &str, status: &str, flight_plan: &str) -> CreateOutcome {
        match self.directory.create_mission(name, status, flight_plan).await {
            Ok(mission) => {
                info!(mission = %mission.id, name = %mission.name, "mission created");
                if let Err(e) = self.bootstrap().await {
                    debug!(error = %e, "mission list refresh after create failed");
                }
                CreateOutcome::Created(mission)
            }
            Err(SdkError::Validation(e)) => CreateOutcome::Invalid(e.to_string()),
            Err(SdkError::ServerRejection(reason)) => {
                warn!(%reason, "mission creation rejected");
                CreateOutcome::Rejected(reason)
            }
            Err(e) => {
                warn!(error = %e, "mission creation failed");
                CreateOutcome::Failed(e.to_string())
            }
        }
    }

    /// Record the logged-in operator.
    pub async fn set_operator(&self, operator: Operator) {
        self.session.lock().await.operator = Some(operator);
    }

    /// Stop the live stream, if any.
    pub async fn stop_telemetry(&self) {
        self.telemetry.unsubscribe().await;
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// A copy of the current session.
    pub async fn snapshot(&self) -> SessionContext {
        self.session.lock().await.clone()
    }

    /// The mission currently selected.
    pub async fn current_mission(&self) -> Option<MissionId> {
        self.session.lock().await.current_mission
    }

    /// The detail pane state.
    pub async fn detail(&self) -> MissionDetail {
        self.session.lock().await.detail.clone()
    }

    /// Telemetry subscription state.
    pub async fn telemetry_state(&self) -> SubscriptionState {
        self.telemetry.state().await
    }

    /// Telemetry log contents, most recent first.
    pub fn log_entries(&self) -> Vec<TelemetryLogEntry> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries()
            .cloned()
            .collect()
    }

    /// The latest reading, if any sample has arrived.
    pub fn latest_sample(&self) -> Option<TelemetrySample> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .latest()
            .map(|entry| entry.sample.clone())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn views(&self) -> Vec<Arc<dyn MissionView>> {
        self.views
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn load_detail(&self, id: MissionId, always_subscribe: bool) -> SelectOutcome {
        let fetched = self.directory.get_mission(id).await;

        let mut session = self.session.lock().await;
        if session.current_mission != Some(id) {
            debug!(requested = %id, current = ?session.current_mission, "discarding stale mission detail");
            return SelectOutcome::Superseded {
                requested: id,
                current: session.current_mission,
            };
        }

        let detail = MissionDetail::from_fetch(id, fetched);
        match &detail {
            MissionDetail::NotFound(_) => info!(mission = %id, "mission not found"),
            MissionDetail::Unavailable { reason, .. } => {
                warn!(mission = %id, %reason, "mission detail unavailable")
            }
            _ => {}
        }
        session.detail = detail.clone();
        for view in self.views() {
            view.on_detail(&detail);
        }

        if always_subscribe || matches!(detail, MissionDetail::Loaded(_)) {
            // Open failures are logged by the stream task; the feed just
            // goes stale.
            drop(self.telemetry.start(id).await);
        }
        drop(session);

        SelectOutcome::Applied(detail)
    }
}
