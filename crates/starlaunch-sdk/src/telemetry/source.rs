//! Where telemetry frames come from.

use std::future::Future;

use eventsource_stream::Eventsource;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::header::ACCEPT;
use starlaunch_models::MissionId;
use tracing::debug;

use crate::api::{failure_reason, ApiClient};
use crate::error::SdkError;

/// Raw event payloads of one live stream. An `Err` item means the stream
/// itself failed; the stream ending means the server closed it.
pub type FrameStream = BoxStream<'static, Result<String, SdkError>>;

/// Opens server-push streams.
///
/// Dropping the returned [`FrameStream`] must release the underlying
/// connection.
pub trait TelemetrySource: Send + Sync + 'static {
    /// Open a stream delivering frames for `mission`.
    fn open(&self, mission: MissionId) -> impl Future<Output = Result<FrameStream, SdkError>> + Send;
}

/// `GET /telemetry/stream` as a `text/event-stream`.
#[derive(Debug, Clone)]
pub struct SseTelemetrySource {
    api: ApiClient,
}

impl SseTelemetrySource {
    /// Wrap an API client.
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

impl TelemetrySource for SseTelemetrySource {
    async fn open(&self, mission: MissionId) -> Result<FrameStream, SdkError> {
        let res = self
            .api
            .http()
            .get(self.api.url("/telemetry/stream"))
            .query(&[("mission_id", mission.get())])
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(SdkError::Transport(failure_reason(res).await));
        }
        debug!(%mission, "telemetry stream opened");

        let frames = res.bytes_stream().eventsource().map(|event| match event {
            Ok(event) => Ok(event.data),
            Err(e) => Err(SdkError::Transport(e.to_string())),
        });
        Ok(frames.boxed())
    }
}
