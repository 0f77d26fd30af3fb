//! Starlaunch chat relay: rebroadcasts operator messages on one or more
//! channels.

use clap::Parser;
use starlaunch_models::ChannelId;

mod relay;

/// Starlaunch chat relay.
#[derive(Parser, Debug)]
#[command(name = "starlaunch-relay", about = "Starlaunch chat relay")]
struct Args {
    /// Channel to relay; repeat for several.
    #[arg(long = "channel", default_value = "control-room")]
    channels: Vec<ChannelId>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging (controlled via RUST_LOG env var).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let nats_url =
        std::env::var("NATS_URL").unwrap_or_else(|_| "nats://localhost:4222".to_string());

    let mut handles = Vec::new();
    for channel in args.channels {
        let relay = relay::ChatRelay::new(channel, &nats_url).await?;
        let handle = tokio::spawn(async move {
            relay.run().await;
        });
        handles.push(handle);
    }

    for handle in handles {
        let _ = handle.await;
    }

    Ok(())
}
