//! Application Configuration
//!
//! Two sources:
//! - Environment variables, read once at startup ([`AppConfig::from_env`])
//! - The nickname file, `<config dir>/dopogoto/config.json`
//!   ([`NicknameStore`])
//!
//! Chat and player settings live next to their components
//! ([`crate::chat::ChatConfig`], [`crate::player::PlayerConfig`]).

use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Directory name used under the platform config/data/cache dirs
pub const APP_DIR: &str = "dopogoto";

/// Longest nickname accepted from `/nick`, in characters
pub const MAX_NICKNAME_CHARS: usize = 20;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when persisting configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No usable config directory on this platform
    #[error("no config directory available")]
    NoConfigDir,

    /// Failed to write the config file
    #[error("failed to write config file at {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to encode the config
    #[error("failed to encode config: {0}")]
    Encode(#[from] serde_json::Error),
}

// =============================================================================
// Environment
// =============================================================================

/// Startup settings taken from the environment
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Directory with extra backdrop clips
    pub clips_dir: Option<PathBuf>,
    /// Look for a newer release at startup
    pub update_check: bool,
    /// UI tick interval (animation clock)
    pub tick_interval: Duration,
    /// Log file; `None` disables logging
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            clips_dir: dirs::data_dir().map(|p| p.join(APP_DIR).join("clips")),
            update_check: true,
            tick_interval: Duration::from_millis(33),
            log_file: dirs::cache_dir().map(|p| p.join(APP_DIR).join("dopogoto.log")),
        }
    }
}

impl AppConfig {
    /// Build from environment variables
    ///
    /// - `DOPOGOTO_CLIPS`: clip directory
    /// - `DOPOGOTO_NO_UPDATE_CHECK`: any non-empty value disables the release check
    /// - `DOPOGOTO_TICK_MS`: UI tick interval in milliseconds
    /// - `DOPOGOTO_LOG_FILE`: log file path
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            clips_dir: std::env::var_os("DOPOGOTO_CLIPS")
                .map(PathBuf::from)
                .or(defaults.clips_dir),
            update_check: std::env::var("DOPOGOTO_NO_UPDATE_CHECK")
                .map(|v| v.is_empty())
                .unwrap_or(defaults.update_check),
            tick_interval: std::env::var("DOPOGOTO_TICK_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&ms: &u64| ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(defaults.tick_interval),
            log_file: std::env::var_os("DOPOGOTO_LOG_FILE")
                .map(PathBuf::from)
                .or(defaults.log_file),
        }
    }
}

// =============================================================================
// Nickname
// =============================================================================

/// Generate an anonymous nickname such as `cli_anon_4821`.
///
/// The numeric suffix is drawn below 10^2, 10^3 or 10^4.
pub fn generate_anon_name<R: Rng>(rng: &mut R) -> String {
    let digits = rng.gen_range(2..=4);
    let bound = 10u32.pow(digits);
    format!("cli_anon_{}", rng.gen_range(0..bound))
}

/// Default location of the nickname file
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_DIR).join("config.json"))
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct NicknameFile {
    #[serde(default)]
    nickname: String,
}

/// Reads and writes the persisted nickname.
#[derive(Clone, Debug)]
pub struct NicknameStore {
    path: Option<PathBuf>,
}

impl NicknameStore {
    /// Store at the platform default location.
    pub fn new() -> Self {
        Self {
            path: default_config_path(),
        }
    }

    /// Store at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The saved nickname, or a fresh anonymous one if the file is missing,
    /// unreadable or empty. Runs before the event loop starts.
    pub fn load(&self) -> String {
        let saved = self
            .path
            .as_ref()
            .and_then(|path| std::fs::read(path).ok())
            .and_then(|bytes| serde_json::from_slice::<NicknameFile>(&bytes).ok())
            .map(|file| file.nickname)
            .filter(|nick| !nick.is_empty());

        match saved {
            Some(nick) => nick,
            None => {
                let nick = generate_anon_name(&mut rand::thread_rng());
                tracing::debug!(nickname = %nick, "no saved nickname, using anonymous name");
                nick
            }
        }
    }

    /// Persist `nickname`, creating the directory if needed.
    pub async fn save(&self, nickname: &str) -> Result<(), ConfigError> {
        let path = self.path.as_ref().ok_or(ConfigError::NoConfigDir)?;
        let write_err = |source| ConfigError::WriteError {
            path: path.clone(),
            source,
        };

        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await.map_err(write_err)?;
        }
        let body = serde_json::to_vec(&NicknameFile {
            nickname: nickname.to_string(),
        })?;
        tokio::fs::write(path, body).await.map_err(write_err)?;

        tracing::info!(path = %path.display(), "saved nickname");
        Ok(())
    }
}

impl Default for NicknameStore {
    fn default() -> Self {
        Self::new()
    }
}
