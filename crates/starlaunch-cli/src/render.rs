//! Console text for SDK states.

use starlaunch_models::{Mission, TelemetrySample};
use starlaunch_sdk::{CreateOutcome, MissionDetail, SubscriptionState};

pub fn mission_list(missions: &[Mission]) -> String {
    if missions.is_empty() {
        return "(sin misiones)".to_string();
    }
    missions
        .iter()
        .map(Mission::label)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn detail(detail: &MissionDetail) -> String {
    match detail {
        MissionDetail::Unselected => "(ninguna misión seleccionada)".to_string(),
        MissionDetail::Loaded(m) => format!(
            "{}\nEstado: {}\nPlan de vuelo: {}",
            m.name, m.status, m.flight_plan
        ),
        MissionDetail::NotFound(_) => "Misión no encontrada".to_string(),
        MissionDetail::Unavailable { reason, .. } => format!("Error: {reason}"),
    }
}

pub fn create(outcome: &CreateOutcome) -> String {
    match outcome {
        CreateOutcome::Created(m) => format!("Misión creada con ID {}", m.id),
        CreateOutcome::Invalid(_) => "Falta nombre o plan de vuelo".to_string(),
        CreateOutcome::Rejected(reason) | CreateOutcome::Failed(reason) => {
            format!("Error: {reason}")
        }
    }
}

/// The "latest reading" panel.
pub fn latest(sample: &TelemetrySample) -> String {
    format!(
        "Altitud: {:.1} m\nVelocidad: {:.1} m/s\nCombustible: {:.1} %\nEstado: {}\nHora: {}",
        sample.altitude, sample.velocity, sample.fuel, sample.status, sample.timestamp
    )
}

pub fn telemetry_state(state: SubscriptionState) -> String {
    match state {
        SubscriptionState::Idle => "telemetría inactiva".to_string(),
        SubscriptionState::Subscribed(mission) => format!("telemetría de la misión {mission}"),
    }
}
