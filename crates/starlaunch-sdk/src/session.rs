//! Explicit per-client session state.

use starlaunch_models::{Mission, MissionId};

use crate::error::SdkError;
use crate::login::Operator;

/// What the mission-detail pane should show.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MissionDetail {
    /// No mission has been selected yet.
    #[default]
    Unselected,
    /// The selected mission's record.
    Loaded(Mission),
    /// The persistence service does not know this id.
    NotFound(MissionId),
    /// The fetch failed for another reason; the view is stale.
    Unavailable {
        /// The mission that was requested.
        mission: MissionId,
        /// Human-readable failure.
        reason: String,
    },
}

impl MissionDetail {
    /// Map a detail fetch onto the view state.
    pub fn from_fetch(mission: MissionId, fetched: Result<Mission, SdkError>) -> Self {
        match fetched {
            Ok(record) => Self::Loaded(record),
            Err(SdkError::NotFound(_)) => Self::NotFound(mission),
            Err(e) => Self::Unavailable {
                mission,
                reason: e.to_string(),
            },
        }
    }

    /// The loaded mission, if any.
    pub fn mission(&self) -> Option<&Mission> {
        match self {
            Self::Loaded(mission) => Some(mission),
            _ => None,
        }
    }
}

/// State shared by the controller's operations.
///
/// The live telemetry and chat handles are owned by their components, not
/// stored here.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    /// Logged-in operator, if any.
    pub operator: Option<Operator>,
    /// Mission the operator is looking at. May hold a provisional id before
    /// the first mission list arrives.
    pub current_mission: Option<MissionId>,
    /// Last fetched mission list.
    pub missions: Vec<Mission>,
    /// Detail pane state.
    pub detail: MissionDetail,
}

impl SessionContext {
    /// A fresh session, optionally pre-selecting a provisional mission.
    pub fn new(provisional_mission: Option<MissionId>) -> Self {
        Self {
            current_mission: provisional_mission,
            ..Self::default()
        }
    }
}
