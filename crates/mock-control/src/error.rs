//! Error replies of the mock API.
//!
//! [`ApiError`] implements [`axum::response::IntoResponse`] so handlers can
//! return `Result<…, ApiError>` directly. Every reply carries an
//! `{"error": "..."}` body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Failure modes of the mission endpoints.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No mission has the requested id.
    #[error("Mission not found")]
    MissionNotFound,

    /// A create request lacked a name or a flight plan.
    #[error("Missing name or flight_plan")]
    MissingFields,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::MissionNotFound => StatusCode::NOT_FOUND,
            Self::MissingFields => StatusCode::BAD_REQUEST,
        };

        tracing::warn!(%status, error = %self, "request failed");
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
