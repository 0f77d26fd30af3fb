//! Request/response access to the mission persistence service.

use reqwest::StatusCode;
use serde::Deserialize;
use starlaunch_models::{Mission, MissionId, NewMission};
use tracing::debug;

use crate::api::{failure_reason, ApiClient, ErrorBody};
use crate::error::SdkError;

/// A single-mission reply: either the record or an error payload.
#[derive(Deserialize)]
#[serde(untagged)]
enum MissionReply {
    Found(Mission),
    Missing(ErrorBody),
}

/// Mission list, detail and creation over the REST API.
///
/// Holds no state beyond the HTTP client; caching is the caller's concern.
#[derive(Debug, Clone)]
pub struct MissionDirectory {
    api: ApiClient,
}

impl MissionDirectory {
    /// Wrap an API client.
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `GET /missions`: the full collection, unpaginated.
    pub async fn list_missions(&self) -> Result<Vec<Mission>, SdkError> {
        let res = self.api.http().get(self.api.url("/missions")).send().await?;
        if !res.status().is_success() {
            return Err(SdkError::ServerRejection(failure_reason(res).await));
        }
        let missions: Vec<Mission> = res.json().await?;
        debug!(count = missions.len(), "mission list fetched");
        Ok(missions)
    }

    /// `GET /missions/{id}`.
    ///
    /// A 404, or any reply carrying an `error` payload instead of a mission,
    /// becomes [`SdkError::NotFound`].
    pub async fn get_mission(&self, id: MissionId) -> Result<Mission, SdkError> {
        let res = self
            .api
            .http()
            .get(self.api.url(&format!("/missions/{id}")))
            .send()
            .await?;
        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return Err(SdkError::NotFound(failure_reason(res).await));
        }
        if !status.is_success() {
            return Err(SdkError::ServerRejection(failure_reason(res).await));
        }
        match res.json::<MissionReply>().await? {
            MissionReply::Found(mission) => Ok(mission),
            MissionReply::Missing(body) => Err(SdkError::NotFound(body.error)),
        }
    }

    /// `POST /missions`.
    ///
    /// The fields are validated locally first; an empty name or flight plan
    /// fails with [`SdkError::Validation`] and nothing is sent. A server
    /// error payload is returned verbatim as [`SdkError::ServerRejection`].
    /// On success the caller should refresh its mission list.
    pub async fn create_mission(
        &self,
        name: &str,
        status: &str,
        flight_plan: &str,
    ) -> Result<Mission, SdkError> {
        let request = NewMission::new(name, status, flight_plan)?;
        self.submit(&request).await
    }

    /// `POST /missions` with an already validated request.
    pub async fn submit(&self, request: &NewMission) -> Result<Mission, SdkError> {
        let res = self
            .api
            .http()
            .post(self.api.url("/missions"))
            .json(request)
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(SdkError::ServerRejection(failure_reason(res).await));
        }
        let mission: Mission = res.json().await?;
        debug!(mission = %mission.id, name = %mission.name, "mission created");
        Ok(mission)
    }
}
