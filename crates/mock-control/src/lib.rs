//! Mock Starlaunch control API.
//!
//! An in-memory stand-in for the mission persistence and telemetry service,
//! served under `/api`:
//!
//! | Route | Behaviour |
//! |-------|-----------|
//! | `POST /login` | `{"operator", "token"}`; a missing name logs in as `operador` |
//! | `GET /missions` | id, name and status of every mission |
//! | `GET /missions/{id}` | full record, or 404 `{"error": "Mission not found"}` |
//! | `POST /missions` | 201 with the stored record, or 400 on a missing field |
//! | `GET /telemetry/stream` | `text/event-stream` of telemetry samples |
//!
//! Tests embed it with [`spawn`]; the `mock-control` binary serves it on a
//! fixed port.

mod error;
mod state;
pub mod telemetry;

pub use error::ApiError;
pub use state::{
    MockState, TelemetryMode, SEED_FLIGHT_PLAN, SEED_MISSION_NAME, SEED_MISSION_STATUS,
};

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use starlaunch_models::{LoginResponse, Mission, MissionId, NewMission, OperatorName};
use tokio::net::TcpListener;
use tracing::{error, info};

// ---------------------------------------------------------------------------
// Request / Response DTOs
// ---------------------------------------------------------------------------

/// Body of `POST /login`. Unparseable bodies count as empty.
#[derive(Deserialize, Default)]
struct LoginBody {
    #[serde(default)]
    username: Option<String>,
}

/// Body of `POST /missions`. Unparseable bodies count as empty.
#[derive(Deserialize, Default)]
struct CreateBody {
    #[serde(default)]
    name: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    flight_plan: String,
}

/// List entry: the list endpoint does not include flight plans.
#[derive(Serialize)]
struct MissionSummary {
    id: MissionId,
    name: String,
    status: String,
}

impl From<Mission> for MissionSummary {
    fn from(m: Mission) -> Self {
        Self {
            id: m.id,
            name: m.name,
            status: m.status,
        }
    }
}

#[derive(Deserialize)]
struct TelemetryQuery {
    #[serde(default)]
    mission_id: Option<i64>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn login(body: Bytes) -> Json<LoginResponse> {
    let body: LoginBody = serde_json::from_slice(&body).unwrap_or_default();
    let operator = OperatorName::or_default(body.username.as_deref());
    info!(%operator, "login");
    Json(LoginResponse {
        token: Some(format!("token-{operator}")),
        operator: operator.to_string(),
    })
}

async fn list_missions(State(state): State<MockState>) -> Json<Vec<MissionSummary>> {
    Json(state.missions().into_iter().map(MissionSummary::from).collect())
}

async fn mission_detail(
    State(state): State<MockState>,
    Path(id): Path<i64>,
) -> Result<Json<Mission>, ApiError> {
    let id = MissionId::new(id);
    if let Some(delay) = state.detail_delay(id) {
        tokio::time::sleep(delay).await;
    }
    state.mission(id).map(Json).ok_or(ApiError::MissionNotFound)
}

async fn create_mission(
    State(state): State<MockState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Mission>), ApiError> {
    state.record_create();
    let body: CreateBody = serde_json::from_slice(&body).unwrap_or_default();
    let request = NewMission::new(&body.name, &body.status, &body.flight_plan)
        .map_err(|_| ApiError::MissingFields)?;
    let mission = state.insert(&request);
    info!(mission = %mission.id, name = %mission.name, "mission created");
    Ok((StatusCode::CREATED, Json(mission)))
}

async fn telemetry_stream(
    State(state): State<MockState>,
    Query(query): Query<TelemetryQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mission = query.mission_id.map(MissionId::new);
    let guard = state.record_telemetry_request(mission);
    info!(mission = ?mission, "telemetry stream opened");

    let events = telemetry::frames(state.telemetry()).map(move |frame| {
        let _open = &guard;
        Ok(Event::default().data(frame))
    });
    Sse::new(events)
}

// ---------------------------------------------------------------------------
// Serving
// ---------------------------------------------------------------------------

/// The full API, mounted under `/api`.
pub fn router(state: MockState) -> Router {
    let api = Router::new()
        .route("/login", post(login))
        .route("/missions", get(list_missions).post(create_mission))
        .route("/missions/{id}", get(mission_detail))
        .route("/telemetry/stream", get(telemetry_stream))
        .with_state(state);
    Router::new().nest("/api", api)
}

/// Serve [`router`] on an ephemeral loopback port in the background.
pub async fn spawn(state: MockState) -> std::io::Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router(state)).await {
            error!(error = %e, "mock control API stopped");
        }
    });
    Ok(addr)
}
