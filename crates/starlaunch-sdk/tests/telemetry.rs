mod common;

use std::sync::Arc;
use std::time::Duration;

use common::Recorder;
use mock_control::{MockState, TelemetryMode};
use starlaunch_models::MissionId;
use starlaunch_sdk::{SseTelemetrySource, SubscriptionState, TelemetrySubscription};

fn sample_frame(altitude: f64) -> String {
    format!(
        r#"{{"timestamp":"2026-01-01T00:00:00Z","altitude":{altitude},"velocity":10.0,"fuel":99.5,"status":"Cuenta regresiva"}}"#
    )
}

#[tokio::test]
async fn malformed_frames_are_skipped_and_server_close_goes_idle() {
    let state = MockState::new(TelemetryMode::Scripted {
        frames: vec![
            sample_frame(120.0),
            "not json".into(),
            r#"{"altitude":5}"#.into(),
            sample_frame(260.0),
        ],
        interval: Duration::from_millis(5),
    });
    let api = common::start(state.clone()).await;

    let subscription = TelemetrySubscription::new(SseTelemetrySource::new(api));
    let recorder = Arc::new(Recorder::default());
    subscription.observe(recorder.clone()).await;

    subscription.subscribe(MissionId::new(1)).await.unwrap();
    common::eventually("server close", || !recorder.closed.lock().unwrap().is_empty()).await;

    let altitudes: Vec<f64> = recorder
        .samples
        .lock()
        .unwrap()
        .iter()
        .map(|(_, s)| s.altitude)
        .collect();
    assert_eq!(altitudes, vec![120.0, 260.0]);
    assert_eq!(subscription.state().await, SubscriptionState::Idle);
    assert_eq!(state.telemetry_requests(), vec![Some(MissionId::new(1))]);
}

#[tokio::test]
async fn switching_missions_keeps_one_stream_open() {
    let state = MockState::new(TelemetryMode::Simulated {
        interval: Duration::from_millis(10),
    });
    let api = common::start(state.clone()).await;

    let subscription = TelemetrySubscription::new(SseTelemetrySource::new(api));
    let recorder = Arc::new(Recorder::default());
    subscription.observe(recorder.clone()).await;

    subscription.subscribe(MissionId::new(1)).await.unwrap();
    common::eventually("first sample", || recorder.sample_count() > 0).await;

    subscription.subscribe(MissionId::new(2)).await.unwrap();
    let switched_at = recorder.sample_count();
    common::eventually("old stream released", || state.open_streams() == 1).await;
    common::eventually("new samples", || recorder.sample_count() > switched_at + 2).await;

    let after_switch = recorder.missions_seen().split_off(switched_at);
    assert!(after_switch.iter().all(|m| *m == MissionId::new(2)));
    assert_eq!(
        subscription.state().await,
        SubscriptionState::Subscribed(MissionId::new(2))
    );
    assert_eq!(
        state.telemetry_requests(),
        vec![Some(MissionId::new(1)), Some(MissionId::new(2))]
    );

    subscription.unsubscribe().await;
    subscription.unsubscribe().await;
    common::eventually("stream released", || state.open_streams() == 0).await;
    assert_eq!(subscription.state().await, SubscriptionState::Idle);
}

#[tokio::test]
async fn unreachable_stream_stays_idle() {
    let api = starlaunch_sdk::ApiClient::new("http://127.0.0.1:9/api").unwrap();
    let subscription = TelemetrySubscription::new(SseTelemetrySource::new(api));

    let err = subscription.subscribe(MissionId::new(1)).await.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(subscription.state().await, SubscriptionState::Idle);
}
