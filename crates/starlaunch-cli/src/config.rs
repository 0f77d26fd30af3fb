//! Client configuration.
//!
//! Built in layers, each overriding the previous one: defaults, then
//! `<config dir>/starlaunch/client.json`, then environment variables, then
//! command-line flags.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use starlaunch_models::{ChannelId, MissionId};
use starlaunch_sdk::RoomSettings;
use tracing::{debug, warn};

const APP_DIR: &str = "starlaunch";
const CONFIG_FILE: &str = "client.json";

/// Where the client connects and what it shows first.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Control API base URL.
    pub api_url: String,
    /// NATS server for chat.
    pub nats_url: String,
    /// Chat channel to join.
    pub chat_channel: String,
    /// Mission treated as selected before the first list arrives.
    pub default_mission: Option<MissionId>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000/api".to_string(),
            nats_url: "nats://localhost:4222".to_string(),
            chat_channel: "control-room".to_string(),
            default_mission: Some(MissionId::new(1)),
        }
    }
}

/// Command-line overrides; `None` keeps the lower layer's value.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub nats_url: Option<String>,
    pub chat_channel: Option<String>,
    pub default_mission: Option<MissionId>,
}

impl ClientConfig {
    /// Defaults, the config file and the process environment, in that order.
    pub fn load() -> Self {
        let mut config = config_path()
            .filter(|path| path.exists())
            .and_then(|path| match fs::read_to_string(&path) {
                Ok(content) => Some((path, content)),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to read config file");
                    None
                }
            })
            .map_or_else(Self::default, |(path, content)| {
                match Self::parse(&content) {
                    Ok(config) => {
                        debug!(path = %path.display(), "config file loaded");
                        config
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "ignoring malformed config file");
                        Self::default()
                    }
                }
            });
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Parse a config file body; absent keys keep their defaults.
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Apply environment overrides.
    ///
    /// | Variable                     | Field             |
    /// |------------------------------|-------------------|
    /// | `STARLAUNCH_API_URL`         | `api_url`         |
    /// | `NATS_URL`                   | `nats_url`        |
    /// | `STARLAUNCH_CHAT_CHANNEL`    | `chat_channel`    |
    /// | `STARLAUNCH_DEFAULT_MISSION` | `default_mission` |
    ///
    /// An unparseable mission id is ignored with a warning.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("STARLAUNCH_API_URL") {
            self.api_url = url;
        }
        if let Some(url) = lookup("NATS_URL") {
            self.nats_url = url;
        }
        if let Some(channel) = lookup("STARLAUNCH_CHAT_CHANNEL") {
            self.chat_channel = channel;
        }
        if let Some(raw) = lookup("STARLAUNCH_DEFAULT_MISSION") {
            match raw.parse() {
                Ok(id) => self.default_mission = Some(id),
                Err(e) => warn!(value = %raw, error = %e, "ignoring STARLAUNCH_DEFAULT_MISSION"),
            }
        }
    }

    /// Apply command-line overrides.
    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(url) = overrides.api_url {
            self.api_url = url;
        }
        if let Some(url) = overrides.nats_url {
            self.nats_url = url;
        }
        if let Some(channel) = overrides.chat_channel {
            self.chat_channel = channel;
        }
        if overrides.default_mission.is_some() {
            self.default_mission = overrides.default_mission;
        }
    }

    /// Write this configuration to the config file.
    pub fn save(&self) -> Result<PathBuf> {
        let path = config_path().context("could not determine config directory")?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Settings for [`starlaunch_sdk::ControlRoom::open`].
    pub fn room_settings(&self) -> Result<RoomSettings> {
        let chat_channel = ChannelId::new(&self.chat_channel)
            .with_context(|| format!("chat channel {:?} is not usable", self.chat_channel))?;
        Ok(RoomSettings {
            api_url: self.api_url.clone(),
            nats_url: self.nats_url.clone(),
            chat_channel,
            default_mission: self.default_mission,
        })
    }
}

/// `<config dir>/starlaunch/client.json`.
pub fn config_path() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join(APP_DIR).join(CONFIG_FILE))
}
