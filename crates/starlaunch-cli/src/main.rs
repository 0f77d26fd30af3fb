//! Starlaunch operator console.

mod config;
mod console;
mod render;

use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use starlaunch_models::{MissionId, TelemetrySample};
use starlaunch_sdk::{
    ApiClient, MissionDetail, MissionDirectory, SseTelemetrySource, TelemetryObserver,
    TelemetrySubscription,
};
use tokio::sync::mpsc;

use crate::config::{ClientConfig, Overrides};

#[derive(Parser, Debug)]
#[command(name = "starlaunch-cli")]
#[command(about = "Starlaunch mission control console")]
#[command(author, version, long_about = None)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct ConnectionArgs {
    /// Control API base URL (ex: http://localhost:5000/api)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// NATS server for chat (ex: nats://localhost:4222)
    #[arg(long, global = true)]
    nats_url: Option<String>,

    /// Chat channel to join
    #[arg(long, global = true)]
    channel: Option<String>,

    /// Mission selected before the mission list loads
    #[arg(long, global = true)]
    mission: Option<MissionId>,
}

impl From<ConnectionArgs> for Overrides {
    fn from(args: ConnectionArgs) -> Self {
        Self {
            api_url: args.api_url,
            nats_url: args.nats_url,
            chat_channel: args.channel,
            default_mission: args.mission,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Mission commands
    Missions {
        #[command(subcommand)]
        action: MissionCommand,
    },
    /// Print live telemetry for a mission
    Watch {
        /// Mission to watch (defaults to the configured mission)
        mission: Option<MissionId>,
        /// Stop after this many samples
        #[arg(long)]
        count: Option<usize>,
    },
    /// Interactive control room: chat, missions and telemetry
    Console {
        /// Operator name (prompted for when absent)
        #[arg(long)]
        username: Option<String>,
    },
    /// Show the effective configuration
    Config {
        /// Also write it to the config file
        #[arg(long)]
        save: bool,
    },
}

#[derive(Subcommand, Debug)]
enum MissionCommand {
    /// List all missions
    List,
    /// Show one mission
    Show { id: MissionId },
    /// Create a mission
    Create {
        #[arg(long)]
        name: String,
        /// Defaults to "Planeada"
        #[arg(long, default_value = "")]
        status: String,
        #[arg(long)]
        flight_plan: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::load();
    config.apply_overrides(cli.connection.into());

    match cli.command {
        Commands::Missions { action } => missions(&config, action).await,
        Commands::Watch { mission, count } => {
            let Some(mission) = mission.or(config.default_mission) else {
                anyhow::bail!("no mission given and no default mission configured");
            };
            watch(&config, mission, count).await
        }
        Commands::Console { username } => console::run(&config, username).await,
        Commands::Config { save } => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            if save {
                let path = config.save()?;
                println!("Saved to {}", path.display());
            }
            Ok(())
        }
    }
}

async fn missions(config: &ClientConfig, action: MissionCommand) -> Result<()> {
    let directory = MissionDirectory::new(ApiClient::new(&config.api_url)?);
    match action {
        MissionCommand::List => {
            let missions = directory.list_missions().await?;
            println!("{}", render::mission_list(&missions));
        }
        MissionCommand::Show { id } => {
            let detail = MissionDetail::from_fetch(id, directory.get_mission(id).await);
            println!("{}", render::detail(&detail));
        }
        MissionCommand::Create {
            name,
            status,
            flight_plan,
        } => {
            let mission = directory.create_mission(&name, &status, &flight_plan).await?;
            println!("Misión creada con ID {}", mission.id);
        }
    }
    Ok(())
}

enum WatchEvent {
    Sample(TelemetrySample),
    Closed,
}

struct Forward(mpsc::UnboundedSender<WatchEvent>);

impl TelemetryObserver for Forward {
    fn on_sample(&self, _mission: MissionId, sample: &TelemetrySample) {
        let _ = self.0.send(WatchEvent::Sample(sample.clone()));
    }

    fn on_closed(&self, _mission: MissionId) {
        let _ = self.0.send(WatchEvent::Closed);
    }
}

async fn watch(config: &ClientConfig, mission: MissionId, count: Option<usize>) -> Result<()> {
    let api = ApiClient::new(&config.api_url)?;
    let subscription = TelemetrySubscription::new(SseTelemetrySource::new(api));
    let (tx, mut rx) = mpsc::unbounded_channel();
    subscription.observe(Arc::new(Forward(tx))).await;
    subscription.subscribe(mission).await?;

    let mut seen = 0;
    loop {
        let event = tokio::select! {
            event = rx.recv() => event,
            _ = tokio::signal::ctrl_c() => None,
        };
        match event {
            Some(WatchEvent::Sample(sample)) => {
                println!("{sample}");
                seen += 1;
                if count.is_some_and(|limit| seen >= limit) {
                    break;
                }
            }
            Some(WatchEvent::Closed) => {
                eprintln!("telemetry stream closed");
                break;
            }
            None => break,
        }
    }

    subscription.unsubscribe().await;
    Ok(())
}
