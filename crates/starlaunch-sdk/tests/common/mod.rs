#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::StreamExt;
use mock_control::MockState;
use starlaunch_models::{ChatMessage, MissionId, OperatorName, TelemetrySample};
use starlaunch_sdk::{ApiClient, ChatChannel, ChatConnector, SdkError, TelemetryObserver};
use tokio::sync::mpsc;

/// Serve `state` on a loopback port and return a client for it.
pub async fn start(state: MockState) -> ApiClient {
    let addr = mock_control::spawn(state).await.unwrap();
    ApiClient::new(&format!("http://{addr}/api")).unwrap()
}

pub async fn eventually(what: &str, cond: impl Fn() -> bool) {
    let waited = tokio::time::timeout(Duration::from_secs(5), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(waited.is_ok(), "timed out waiting for {what}");
}

/// Records every telemetry callback.
#[derive(Default)]
pub struct Recorder {
    pub samples: Mutex<Vec<(MissionId, TelemetrySample)>>,
    pub closed: Mutex<Vec<MissionId>>,
}

impl Recorder {
    pub fn sample_count(&self) -> usize {
        self.samples.lock().unwrap().len()
    }

    pub fn missions_seen(&self) -> Vec<MissionId> {
        self.samples.lock().unwrap().iter().map(|(m, _)| *m).collect()
    }
}

impl TelemetryObserver for Recorder {
    fn on_sample(&self, mission: MissionId, sample: &TelemetrySample) {
        self.samples.lock().unwrap().push((mission, sample.clone()));
    }

    fn on_closed(&self, mission: MissionId) {
        self.closed.lock().unwrap().push(mission);
    }
}

/// In-memory chat transport that counts connections.
#[derive(Clone, Default)]
pub struct LoopbackChat {
    pub connects: Arc<AtomicUsize>,
    pub names: Arc<Mutex<Vec<String>>>,
    pub refuse: bool,
}

impl LoopbackChat {
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl ChatConnector for LoopbackChat {
    async fn connect(&self, operator: &OperatorName) -> Result<ChatChannel, SdkError> {
        if self.refuse {
            return Err(SdkError::Transport("connection refused".into()));
        }
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.names.lock().unwrap().push(operator.to_string());

        // Echo every outbound message back, like the relay does.
        let (outbound, rx) = mpsc::unbounded_channel::<ChatMessage>();
        let inbound = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|msg| (msg, rx))
        });
        Ok(ChatChannel {
            outbound,
            inbound: inbound.boxed(),
        })
    }
}
