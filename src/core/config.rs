use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

/// Remote sync settings. Absent section means the tracker stays local-only.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SyncConfig {
    /// Root of the remote document store, e.g. a Firebase RTDB instance.
    pub base_url: String,
    /// Optional spreadsheet backup endpoint, POSTed after every push.
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Poll interval for the listen command, in seconds.
    #[serde(default = "default_poll_secs")]
    pub poll_secs: u64,
}

fn default_poll_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct QuotesConfig {
    /// Quote endpoint answering `GET {base_url}/quote?symbol=SYM` with
    /// `{"price": 123.4}`.
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    /// Shared secret that keys the remote document. Sync is disabled until
    /// both this and the sync section are set.
    #[serde(default)]
    pub access_code: Option<String>,
    #[serde(default)]
    pub sync: Option<SyncConfig>,
    #[serde(default)]
    pub quotes: Option<QuotesConfig>,
    #[serde(default)]
    pub data_path: Option<String>,
}

impl AppConfig {
    /// Loads the config from the default location. A missing file is not an
    /// error; the tracker runs with defaults until `setup` is used.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config file at {}, using defaults", config_path.display());
            return Ok(AppConfig::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("hk", "wsnap", "wsnap")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    /// Directory holding the local snapshot database.
    pub fn resolve_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("hk", "wsnap", "wsnap")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
