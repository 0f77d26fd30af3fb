mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use mock_control::{MockState, TelemetryMode, SEED_MISSION_NAME};
use starlaunch_models::{Mission, MissionId};
use starlaunch_sdk::{
    ApiClient, CreateOutcome, FrameStream, MissionDetail, MissionDirectory,
    MissionSelectionController, MissionView, SdkError, SelectOutcome, SseTelemetrySource,
    SubscriptionState, TelemetrySource,
};

fn fast_state() -> MockState {
    MockState::new(TelemetryMode::Simulated {
        interval: Duration::from_millis(10),
    })
}

async fn controller(
    api: ApiClient,
    provisional: Option<MissionId>,
) -> MissionSelectionController<SseTelemetrySource> {
    MissionSelectionController::new(
        MissionDirectory::new(api.clone()),
        SseTelemetrySource::new(api),
        provisional,
    )
    .await
}

async fn wait_for_stream<S: TelemetrySource>(ctrl: &MissionSelectionController<S>, mission: MissionId) {
    let waited = tokio::time::timeout(Duration::from_secs(5), async {
        while ctrl.telemetry_state().await != SubscriptionState::Subscribed(mission) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(waited.is_ok(), "stream for mission {mission} never went live");
}

/// Accepts the request and never answers.
struct StalledSource;

impl TelemetrySource for StalledSource {
    async fn open(&self, _mission: MissionId) -> Result<FrameStream, SdkError> {
        std::future::pending().await
    }
}

#[derive(Default)]
struct Views {
    lists: Mutex<Vec<usize>>,
    details: Mutex<Vec<MissionDetail>>,
}

impl MissionView for Views {
    fn on_missions(&self, missions: &[Mission]) {
        self.lists.lock().unwrap().push(missions.len());
    }

    fn on_detail(&self, detail: &MissionDetail) {
        self.details.lock().unwrap().push(detail.clone());
    }
}

#[tokio::test]
async fn bootstrap_loads_provisional_mission_and_streams_it() {
    let state = fast_state();
    let views = Arc::new(Views::default());
    let ctrl = controller(common::start(state.clone()).await, Some(MissionId::new(1))).await;
    ctrl.observe_missions(views.clone());

    let missions = ctrl.bootstrap().await.unwrap();
    assert_eq!(missions.len(), 1);

    let detail = ctrl.detail().await;
    assert_eq!(detail.mission().map(|m| m.name.as_str()), Some(SEED_MISSION_NAME));
    wait_for_stream(&ctrl, MissionId::new(1)).await;
    assert_eq!(*views.lists.lock().unwrap(), vec![1]);
    assert_eq!(views.details.lock().unwrap().len(), 1);

    common::eventually("telemetry log", || !ctrl.log_entries().is_empty()).await;
    let latest = ctrl.latest_sample().unwrap();
    assert_eq!(ctrl.log_entries()[0].sample, latest);
    ctrl.stop_telemetry().await;
}

#[tokio::test]
async fn bootstrap_defaults_to_first_mission() {
    let state = fast_state();
    let ctrl = controller(common::start(state.clone()).await, None).await;
    assert_eq!(ctrl.current_mission().await, None);

    ctrl.bootstrap().await.unwrap();
    assert_eq!(ctrl.current_mission().await, Some(MissionId::new(1)));
    wait_for_stream(&ctrl, MissionId::new(1)).await;
    assert_eq!(state.telemetry_requests(), vec![Some(MissionId::new(1))]);
    ctrl.stop_telemetry().await;
}

#[tokio::test]
async fn bootstrap_restarts_telemetry_for_current_selection() {
    let state = fast_state();
    let ctrl = controller(common::start(state.clone()).await, None).await;

    ctrl.bootstrap().await.unwrap();
    wait_for_stream(&ctrl, MissionId::new(1)).await;
    ctrl.bootstrap().await.unwrap();
    wait_for_stream(&ctrl, MissionId::new(1)).await;

    assert_eq!(
        state.telemetry_requests(),
        vec![Some(MissionId::new(1)), Some(MissionId::new(1))]
    );
    common::eventually("single stream", || state.open_streams() == 1).await;
    ctrl.stop_telemetry().await;
}

#[tokio::test]
async fn missing_mission_keeps_selection_and_stream() {
    let state = fast_state();
    let ctrl = controller(common::start(state.clone()).await, None).await;
    ctrl.bootstrap().await.unwrap();
    wait_for_stream(&ctrl, MissionId::new(1)).await;

    let outcome = ctrl.select_mission(MissionId::new(99)).await;
    assert_eq!(
        outcome,
        SelectOutcome::Applied(MissionDetail::NotFound(MissionId::new(99)))
    );
    assert_eq!(ctrl.current_mission().await, Some(MissionId::new(99)));
    assert_eq!(
        ctrl.telemetry_state().await,
        SubscriptionState::Subscribed(MissionId::new(1))
    );
    assert_eq!(state.telemetry_requests().len(), 1);
    ctrl.stop_telemetry().await;
}

#[tokio::test]
async fn stale_detail_response_is_discarded() {
    let state = fast_state();
    let api = common::start(state.clone()).await;
    let ctrl = controller(api, None).await;

    let second = match ctrl.create_mission("Artemis", "", "Translunar").await {
        CreateOutcome::Created(mission) => mission,
        other => panic!("expected Created, got {other:?}"),
    };
    wait_for_stream(&ctrl, MissionId::new(1)).await;
    state.set_detail_delay(MissionId::new(1), Duration::from_millis(300));
    let requests_before = state.telemetry_requests().len();

    let (first, latest) = tokio::join!(ctrl.select_mission(MissionId::new(1)), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        ctrl.select_mission(second.id).await
    });

    assert_eq!(
        first,
        SelectOutcome::Superseded {
            requested: MissionId::new(1),
            current: Some(second.id),
        }
    );
    assert!(matches!(latest, SelectOutcome::Applied(MissionDetail::Loaded(ref m)) if m.id == second.id));
    assert_eq!(ctrl.detail().await.mission().map(|m| m.id), Some(second.id));
    wait_for_stream(&ctrl, second.id).await;
    let requests = state.telemetry_requests();
    assert_eq!(requests.last(), Some(&Some(second.id)));
    assert!(!requests[requests_before..].contains(&Some(MissionId::new(1))));
    ctrl.stop_telemetry().await;
}

#[tokio::test]
async fn create_refreshes_list() {
    let state = fast_state();
    let views = Arc::new(Views::default());
    let ctrl = controller(common::start(state.clone()).await, None).await;
    ctrl.observe_missions(views.clone());

    let outcome = ctrl.create_mission("Artemis", "Lista", "Translunar").await;
    assert!(matches!(outcome, CreateOutcome::Created(ref m) if m.status == "Lista"));

    let session = ctrl.snapshot().await;
    assert_eq!(session.missions.len(), 2);
    assert_eq!(*views.lists.lock().unwrap(), vec![2]);
    ctrl.stop_telemetry().await;
}

#[tokio::test]
async fn invalid_create_is_reported_without_a_request() {
    let state = fast_state();
    let ctrl = controller(common::start(state.clone()).await, None).await;

    let outcome = ctrl.create_mission("", "", "Translunar").await;
    assert!(matches!(outcome, CreateOutcome::Invalid(_)));
    assert_eq!(state.create_hits(), 0);
}

#[tokio::test]
async fn unreachable_api_surfaces_unavailable_detail() {
    let api = ApiClient::new("http://127.0.0.1:9/api").unwrap();
    let ctrl = controller(api, None).await;

    assert!(ctrl.bootstrap().await.unwrap_err().is_transport());
    let outcome = ctrl.select_mission(MissionId::new(1)).await;
    assert!(matches!(
        outcome,
        SelectOutcome::Applied(MissionDetail::Unavailable { mission, .. }) if mission == MissionId::new(1)
    ));
    assert_eq!(ctrl.telemetry_state().await, SubscriptionState::Idle);
    assert!(matches!(
        ctrl.create_mission("Artemis", "", "LEO").await,
        CreateOutcome::Failed(_)
    ));
}

#[tokio::test]
async fn stalled_telemetry_open_leaves_controller_responsive() {
    let state = fast_state();
    let api = common::start(state.clone()).await;
    let ctrl =
        MissionSelectionController::new(MissionDirectory::new(api), StalledSource, None).await;
    let second = match ctrl.create_mission("Artemis", "", "Translunar").await {
        CreateOutcome::Created(mission) => mission,
        other => panic!("expected Created, got {other:?}"),
    };
    let limit = Duration::from_secs(1);

    let first = tokio::time::timeout(limit, ctrl.select_mission(MissionId::new(1)))
        .await
        .expect("select_mission(1) blocked on the telemetry open");
    assert!(matches!(first, SelectOutcome::Applied(MissionDetail::Loaded(_))));

    let current = tokio::time::timeout(limit, ctrl.current_mission())
        .await
        .expect("current_mission blocked on the telemetry open");
    assert_eq!(current, Some(MissionId::new(1)));

    let switched = tokio::time::timeout(limit, ctrl.select_mission(second.id))
        .await
        .expect("select_mission(2) blocked on the telemetry open");
    assert!(matches!(switched, SelectOutcome::Applied(MissionDetail::Loaded(ref m)) if m.id == second.id));
    assert_eq!(ctrl.detail().await.mission().map(|m| m.id), Some(second.id));
    assert_eq!(ctrl.telemetry_state().await, SubscriptionState::Idle);

    tokio::time::timeout(limit, ctrl.stop_telemetry())
        .await
        .expect("stop_telemetry blocked on the telemetry open");
}
