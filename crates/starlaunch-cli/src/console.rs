//! Interactive control-room console.
//!
//! Plain lines are sent to the chat; lines starting with `/` are commands.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use starlaunch_models::{Mission, MissionId, TelemetrySample};
use starlaunch_sdk::{
    ChatEntry, ChatObserver, ControlRoom, MissionDetail, MissionView, TelemetryObserver,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use crate::config::ClientConfig;
use crate::render;

const HELP: &str = "\
/missions                          listar misiones
/select <id>                       seleccionar misión
/create <nombre> | <estado> | <plan>  crear misión
/log                               últimas lecturas de telemetría
/latest                            lectura más reciente
/live on|off                       mostrar telemetría en vivo
/status                            sesión actual
/quit                              salir
<texto>                            enviar al chat";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Missions,
    Select(MissionId),
    Create {
        name: String,
        status: String,
        flight_plan: String,
    },
    Log,
    Latest,
    Live(bool),
    Status,
    Help,
    Quit,
    Chat(String),
    Empty,
    Invalid(String),
}

fn parse(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Chat(line.to_string());
    };
    let (word, args) = rest.split_once(' ').unwrap_or((rest, ""));
    let args = args.trim();
    match word {
        "missions" => Command::Missions,
        "select" => match args.parse() {
            Ok(id) => Command::Select(id),
            Err(e) => Command::Invalid(e.to_string()),
        },
        "create" => {
            let parts: Vec<&str> = args.split('|').map(str::trim).collect();
            match parts.as_slice() {
                [name, status, flight_plan] => Command::Create {
                    name: (*name).to_string(),
                    status: (*status).to_string(),
                    flight_plan: (*flight_plan).to_string(),
                },
                _ => Command::Invalid("uso: /create <nombre> | <estado> | <plan>".into()),
            }
        }
        "log" => Command::Log,
        "latest" => Command::Latest,
        "live" => match args {
            "on" => Command::Live(true),
            "off" => Command::Live(false),
            _ => Command::Invalid("uso: /live on|off".into()),
        },
        "status" => Command::Status,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => Command::Invalid(format!("comando desconocido: /{other}")),
    }
}

// ---------------------------------------------------------------------------
// Printers
// ---------------------------------------------------------------------------

struct ChatPrinter;

impl ChatObserver for ChatPrinter {
    fn on_message(&self, entry: &ChatEntry) {
        println!("{entry}");
    }
}

struct ViewPrinter;

impl MissionView for ViewPrinter {
    fn on_missions(&self, missions: &[Mission]) {
        println!("{}", render::mission_list(missions));
    }

    fn on_detail(&self, detail: &MissionDetail) {
        println!("{}", render::detail(detail));
    }
}

#[derive(Default)]
struct LivePrinter {
    enabled: AtomicBool,
}

impl TelemetryObserver for LivePrinter {
    fn on_sample(&self, _mission: MissionId, sample: &TelemetrySample) {
        if self.enabled.load(Ordering::Relaxed) {
            println!("{sample}");
        }
    }

    fn on_closed(&self, mission: MissionId) {
        println!("Telemetría de la misión {mission} detenida");
    }
}

// ---------------------------------------------------------------------------
// Loop
// ---------------------------------------------------------------------------

pub async fn run(config: &ClientConfig, username: Option<String>) -> Result<()> {
    let room = ControlRoom::open(&config.room_settings()?).await?;
    let live = Arc::new(LivePrinter::default());
    room.controller().observe_missions(Arc::new(ViewPrinter));
    room.controller().observe_telemetry(live.clone()).await;
    room.observe_chat(Arc::new(ChatPrinter)).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let username = match username {
        Some(name) => name,
        None => {
            println!("Operador:");
            lines.next_line().await?.unwrap_or_default()
        }
    };
    let operator = room.login(&username).await?;
    println!("Conectado como {}", operator.name);
    if !room.chat_connected().await {
        println!("(chat no disponible)");
    }

    if let Err(e) = room.bootstrap().await {
        println!("Error: {e}");
    }
    println!("Escribe /help para ver los comandos.");

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };

        match parse(&line) {
            Command::Empty => {}
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            Command::Invalid(reason) => println!("{reason}"),
            Command::Chat(text) => {
                if let Err(e) = room.send_chat(&text).await {
                    warn!(error = %e, "chat message not sent");
                }
            }
            Command::Missions => {
                if let Err(e) = room.bootstrap().await {
                    println!("Error: {e}");
                }
            }
            Command::Select(id) => {
                room.select_mission(id).await;
            }
            Command::Create {
                name,
                status,
                flight_plan,
            } => {
                let outcome = room.create_mission(&name, &status, &flight_plan).await;
                println!("{}", render::create(&outcome));
            }
            Command::Log => {
                for entry in room.controller().log_entries() {
                    println!("{entry}");
                }
            }
            Command::Latest => match room.controller().latest_sample() {
                Some(sample) => println!("{}", render::latest(&sample)),
                None => println!("(sin telemetría)"),
            },
            Command::Live(on) => live.enabled.store(on, Ordering::Relaxed),
            Command::Status => {
                let session = room.controller().snapshot().await;
                if let Some(op) = &session.operator {
                    println!("Operador: {}", op.name);
                }
                match session.current_mission {
                    Some(id) => println!("Misión actual: {id}"),
                    None => println!("Misión actual: ninguna"),
                }
                println!(
                    "{}",
                    render::telemetry_state(room.controller().telemetry_state().await)
                );
            }
        }
    }

    room.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_chat() {
        assert_eq!(parse("  T-10  "), Command::Chat("T-10".into()));
        assert_eq!(parse("   "), Command::Empty);
    }

    #[test]
    fn select_parses_mission_id() {
        assert_eq!(parse("/select 2"), Command::Select(MissionId::new(2)));
        assert!(matches!(parse("/select dos"), Command::Invalid(_)));
    }

    #[test]
    fn create_splits_on_pipes() {
        assert_eq!(
            parse("/create Artemis |  | Translunar"),
            Command::Create {
                name: "Artemis".into(),
                status: String::new(),
                flight_plan: "Translunar".into(),
            }
        );
        assert!(matches!(parse("/create Artemis"), Command::Invalid(_)));
    }

    #[test]
    fn live_toggle() {
        assert_eq!(parse("/live on"), Command::Live(true));
        assert_eq!(parse("/live off"), Command::Live(false));
        assert!(matches!(parse("/live"), Command::Invalid(_)));
        assert!(matches!(parse("/bogus"), Command::Invalid(_)));
    }
}
