//! Configuration loading for chatqueue.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// State file used when neither the CLI nor the settings name one.
pub const DEFAULT_STATE_FILE: &str = "queue_state.json";

/// Get the chatqueue home directory (~/.chatqueue).
pub fn get_home_dir() -> Result<PathBuf> {
    let home = directories::UserDirs::new()
        .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

    Ok(home.home_dir().join(".chatqueue"))
}

/// Get the settings file path.
pub fn get_settings_path() -> Result<PathBuf> {
    Ok(get_home_dir()?.join("settings.json"))
}

/// Load settings from ~/.chatqueue/settings.json
pub fn load_settings() -> Result<Settings> {
    load_settings_from(&get_settings_path()?)
}

/// Load settings from an explicit path. A missing file yields defaults.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        tracing::debug!("No settings at {}, using defaults", path.display());
        return Ok(Settings::default());
    }

    let content = std::fs::read_to_string(path)?;
    let settings: Settings = serde_json::from_str(&content)?;

    validate_settings(&settings)?;

    tracing::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

fn validate_settings(settings: &Settings) -> Result<()> {
    if settings.queue.capacity == 0 {
        return Err(Error::Config("queue.capacity must be at least 1".to_string()));
    }
    if settings.queue.agents.is_empty() {
        return Err(Error::Config("queue.agents must name at least one agent".to_string()));
    }
    Ok(())
}

/// Load settings or return default if they cannot be read.
pub fn load_settings_or_default() -> Settings {
    load_settings().unwrap_or_else(|e| {
        tracing::warn!("Failed to load settings: {}, using defaults", e);
        Settings::default()
    })
}

/// Queue configuration used to seed a fresh queue.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct QueueSettings {
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    #[serde(default = "default_agents")]
    pub agents: Vec<String>,
}

fn default_capacity() -> usize {
    10
}

fn default_agents() -> Vec<String> {
    ["Agent Alice", "Agent Bob", "Agent Charlie", "Agent Diana", "Agent Eve"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            agents: default_agents(),
        }
    }
}

/// chatqueue settings.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Settings {
    #[serde(default)]
    pub queue: QueueSettings,

    /// Where the queue snapshot lives. Relative paths resolve against the
    /// working directory.
    pub state_file: Option<PathBuf>,
}

impl Settings {
    /// Resolve the state file, preferring an explicit override.
    pub fn state_file(&self, cli_override: Option<&Path>) -> PathBuf {
        cli_override
            .map(Path::to_path_buf)
            .or_else(|| self.state_file.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE))
    }
}
