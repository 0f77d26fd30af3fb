//! Mission records as stored by the persistence service.
//!
//! The client never mutates a [`Mission`]; it is fetched, displayed, and
//! replaced wholesale on the next fetch. New missions are described by a
//! [`NewMission`], which enforces the required-field rules before any
//! request leaves the client.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Status label applied to a new mission when none is given.
pub const DEFAULT_MISSION_STATUS: &str = "Planeada";

// ---------------------------------------------------------------------------
// MissionId
// ---------------------------------------------------------------------------

/// Server-assigned identifier of a mission.
///
/// # Examples
///
/// ```
/// use starlaunch_models::MissionId;
///
/// let id: MissionId = "42".parse().unwrap();
/// assert_eq!(id, MissionId::new(42));
/// assert_eq!(id.to_string(), "42");
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct MissionId(i64);

impl MissionId {
    /// Wrap a raw identifier.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Return the raw identifier.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for MissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for MissionId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl FromStr for MissionId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|e| ModelError::InvalidMissionId {
                value: s.to_string(),
                reason: e.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Mission
// ---------------------------------------------------------------------------

/// A named task with a status label and a flight plan.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Mission {
    /// Unique, server-assigned id.
    pub id: MissionId,
    /// Display name.
    pub name: String,
    /// Free-form status label (e.g. "Preparación").
    pub status: String,
    /// Flight plan text. The list endpoint omits it, so it defaults to empty.
    #[serde(default)]
    pub flight_plan: String,
}

impl Mission {
    /// One-line label used in mission pickers: `"1 - Odyssey One (Preparación)"`.
    pub fn label(&self) -> String {
        format!("{} - {} ({})", self.id, self.name, self.status)
    }
}

// ---------------------------------------------------------------------------
// NewMission
// ---------------------------------------------------------------------------

/// A validated mission-creation request.
///
/// Construction trims every field, rejects an empty `name` or `flight_plan`,
/// and substitutes [`DEFAULT_MISSION_STATUS`] for an empty status.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NewMission {
    name: String,
    status: String,
    flight_plan: String,
}

impl NewMission {
    /// Validate and normalise the creation fields.
    pub fn new(name: &str, status: &str, flight_plan: &str) -> Result<Self, ModelError> {
        let name = name.trim();
        let flight_plan = flight_plan.trim();
        if name.is_empty() {
            return Err(ModelError::MissingField {
                field: "name".into(),
            });
        }
        if flight_plan.is_empty() {
            return Err(ModelError::MissingField {
                field: "flight_plan".into(),
            });
        }
        let status = match status.trim() {
            "" => DEFAULT_MISSION_STATUS,
            s => s,
        };
        Ok(Self {
            name: name.to_string(),
            status: status.to_string(),
            flight_plan: flight_plan.to_string(),
        })
    }

    /// Mission name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Status label (never empty).
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Flight plan text.
    pub fn flight_plan(&self) -> &str {
        &self.flight_plan
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
