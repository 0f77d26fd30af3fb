//! Mock control API server for local development.

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use mock_control::{MockState, TelemetryMode};
use tracing::info;

/// In-memory Starlaunch mission and telemetry API.
#[derive(Parser, Debug)]
#[command(name = "mock-control", about = "In-memory Starlaunch mission and telemetry API")]
struct Args {
    /// Listen port (overrides `MOCK_CONTROL_PORT`, default 5000).
    #[arg(long)]
    port: Option<u16>,

    /// Milliseconds between simulated telemetry samples.
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let port = args.port.unwrap_or_else(|| {
        std::env::var("MOCK_CONTROL_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5000)
    });

    let state = MockState::new(TelemetryMode::Simulated {
        interval: Duration::from_millis(args.interval_ms),
    });

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(address = %addr, "mock control API listening on /api");
    axum::serve(listener, mock_control::router(state))
        .await
        .context("server error")?;
    Ok(())
}
