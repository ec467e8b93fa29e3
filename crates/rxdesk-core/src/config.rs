use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable that overrides `base_url` from the config file.
pub const BASE_URL_ENV: &str = "RXDESK_BASE_URL";

/// Global configuration loaded from `~/.config/rxdesk/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RxdeskConfig {
    /// Backend root; every endpoint is `<base_url>/api/<resource>/`.
    pub base_url: String,
    /// Page size used by list screens when none is given.
    pub default_page_size: u32,
    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds (uploads and exports included).
    pub request_timeout_secs: u64,
    /// Directory where exported spreadsheets are saved (None = current directory).
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    /// Extra headers sent with every request (e.g. an API key issued by the backend).
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Default for RxdeskConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            default_page_size: 10,
            connect_timeout_secs: 15,
            request_timeout_secs: 60,
            download_dir: None,
            headers: BTreeMap::new(),
        }
    }
}

impl RxdeskConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Applies `RXDESK_BASE_URL` when it is set and non-empty.
    pub fn apply_env_override(&mut self) {
        self.apply_base_url_override(std::env::var(BASE_URL_ENV).ok());
    }

    fn apply_base_url_override(&mut self, value: Option<String>) {
        if let Some(v) = value {
            let v = v.trim();
            if !v.is_empty() {
                tracing::debug!("base_url overridden by {}: {}", BASE_URL_ENV, v);
                self.base_url = v.to_string();
            }
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("rxdesk")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
/// The environment override is applied after loading.
pub fn load_or_init() -> Result<RxdeskConfig> {
    let path = config_path()?;
    let mut cfg = if !path.exists() {
        let default_cfg = RxdeskConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)
            .with_context(|| format!("failed to write default config: {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        default_cfg
    } else {
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        toml::from_str(&data).with_context(|| format!("invalid config: {}", path.display()))?
    };
    cfg.apply_env_override();
    Ok(cfg)
}
