//! The control-room façade: login, missions, telemetry and chat behind one
//! handle.

use std::sync::Arc;

use starlaunch_models::{ChannelId, Mission, MissionId};
use tokio::sync::Mutex;
use tracing::warn;

use crate::api::ApiClient;
use crate::chat::{ChatConnector, ChatEntry, ChatObserver, ChatSession, NatsChatConnector};
use crate::controller::{CreateOutcome, MissionSelectionController, SelectOutcome};
use crate::directory::MissionDirectory;
use crate::error::SdkError;
use crate::login::{Operator, OperatorLogin};
use crate::telemetry::{SseTelemetrySource, TelemetrySource};

/// Connection settings for [`ControlRoom::open`].
#[derive(Debug, Clone)]
pub struct RoomSettings {
    /// Base URL of the control API, e.g. `http://localhost:5000/api`.
    pub api_url: String,
    /// NATS server carrying the chat channel.
    pub nats_url: String,
    /// Chat channel to join.
    pub chat_channel: ChannelId,
    /// Mission treated as selected before the first list arrives.
    pub default_mission: Option<MissionId>,
}

/// One operator's control-room client.
pub struct ControlRoom<S, C> {
    login: OperatorLogin,
    controller: MissionSelectionController<S>,
    chat: Mutex<ChatSession<C>>,
}

impl ControlRoom<SseTelemetrySource, NatsChatConnector> {
    /// Build a room against the HTTP API and NATS chat described by
    /// `settings`. Nothing is fetched or connected yet.
    pub async fn open(settings: &RoomSettings) -> Result<Self, SdkError> {
        let api = ApiClient::new(&settings.api_url)?;
        let controller = MissionSelectionController::new(
            MissionDirectory::new(api.clone()),
            SseTelemetrySource::new(api.clone()),
            settings.default_mission,
        )
        .await;
        let chat = ChatSession::new(NatsChatConnector::new(
            &settings.nats_url,
            settings.chat_channel.clone(),
        ));
        Ok(Self::new(OperatorLogin::new(api), controller, chat))
    }
}

impl<S: TelemetrySource, C: ChatConnector> ControlRoom<S, C> {
    /// Assemble a room from its parts.
    pub fn new(
        login: OperatorLogin,
        controller: MissionSelectionController<S>,
        chat: ChatSession<C>,
    ) -> Self {
        Self {
            login,
            controller,
            chat: Mutex::new(chat),
        }
    }

    /// Log in and join the chat under the confirmed name.
    ///
    /// A chat connection failure is logged and does not fail the login.
    /// Logging in again updates the session's operator but keeps the first
    /// chat connection and its name.
    pub async fn login(&self, username: &str) -> Result<Operator, SdkError> {
        let operator = self.login.login(username).await?;
        self.controller.set_operator(operator.clone()).await;

        let mut chat = self.chat.lock().await;
        if let Err(e) = chat.init(Some(operator.name.as_str())).await {
            warn!(error = %e, "chat unavailable, continuing without it");
        }
        Ok(operator)
    }

    /// Mission and telemetry orchestration.
    pub fn controller(&self) -> &MissionSelectionController<S> {
        &self.controller
    }

    /// See [`MissionSelectionController::bootstrap`].
    pub async fn bootstrap(&self) -> Result<Vec<Mission>, SdkError> {
        self.controller.bootstrap().await
    }

    /// See [`MissionSelectionController::select_mission`].
    pub async fn select_mission(&self, id: MissionId) -> SelectOutcome {
        self.controller.select_mission(id).await
    }

    /// See [`MissionSelectionController::create_mission`].
    pub async fn create_mission(
        &self,
        name: &str,
        status: &str,
        flight_plan: &str,
    ) -> CreateOutcome {
        self.controller.create_mission(name, status, flight_plan).await
    }

    /// Send a chat line as the logged-in operator.
    pub async fn send_chat(&self, text: &str) -> Result<(), SdkError> {
        self.chat.lock().await.send(text)
    }

    /// Register a chat observer.
    pub async fn observe_chat(&self, observer: Arc<dyn ChatObserver>) {
        self.chat.lock().await.observe(observer);
    }

    /// Chat feed so far.
    pub async fn chat_messages(&self) -> Vec<ChatEntry> {
        self.chat.lock().await.messages()
    }

    /// True once the chat connection is up.
    pub async fn chat_connected(&self) -> bool {
        self.chat.lock().await.is_active()
    }

    /// Stop telemetry. The chat connection ends when the room is dropped.
    pub async fn shutdown(&self) {
        self.controller.stop_telemetry().await;
    }
}
