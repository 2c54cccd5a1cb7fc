use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::types::Watch;

pub const TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
pub const CHAT_IDS_VAR: &str = "TELEGRAM_CHAT_IDS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("config file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config contains no watches")]
    NoWatches,
    #[error("required environment variable {0} is missing or empty")]
    MissingEnv(&'static str),
}

fn default_state_dir() -> PathBuf {
    PathBuf::from("state")
}

/// Run configuration: the fixed list of named searches and where their
/// snapshot files live.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub watches: Vec<Watch>,
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    fn parse(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        if config.watches.is_empty() {
            return Err(ConfigError::NoWatches);
        }
        Ok(config)
    }
}

/// Telegram credentials, resolved from the environment at startup so a
/// missing secret fails the run before the first fetch.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_ids: Vec<String>,
}

impl TelegramConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let bot_token = require_env(TOKEN_VAR)?;
        let chat_ids: Vec<String> = require_env(CHAT_IDS_VAR)?
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();
        if chat_ids.is_empty() {
            return Err(ConfigError::MissingEnv(CHAT_IDS_VAR));
        }
        Ok(Self {
            bot_token,
            chat_ids,
        })
    }
}

fn require_env(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnv(name)),
    }
}
