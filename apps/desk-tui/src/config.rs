use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf, time::Duration};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Generation endpoints can take a while; keep this generous.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { base_url: "http://localhost:8000".into(), timeout_secs: 120 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    /// "amber" or "default"
    pub theme: String,
    pub stats_poll_secs: u64,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self { theme: "amber".into(), stats_poll_secs: 10 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    pub home: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub desk: DeskConfig,
    pub storage: StorageConfig,
}

impl Config {
    /// Reads `PAPERCLIP_CONFIG` (or `config/paperclip.toml`). A missing file
    /// yields defaults; a malformed one is an error.
    pub fn load() -> anyhow::Result<(Self, PathBuf)> {
        let cfg_path = env::var("PAPERCLIP_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config/paperclip.toml"));
        let mut cfg = if cfg_path.exists() {
            let text = fs::read_to_string(&cfg_path)?;
            Self::parse(&text)?
        } else {
            Config::default()
        };
        cfg.apply_overrides(|k| env::var(k).ok());
        Ok((cfg, cfg_path))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    // Env overrides: PAPERCLIP_API_URL, PAPERCLIP_HOME
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("PAPERCLIP_API_URL").filter(|v| !v.trim().is_empty()) {
            self.api.base_url = url;
        }
        if let Some(home) = lookup("PAPERCLIP_HOME").filter(|v| !v.trim().is_empty()) {
            self.storage.home = Some(home);
        }
    }

    pub fn home_dir(&self) -> PathBuf {
        self.storage.home.as_ref().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("./storage"))
    }

    pub fn log_dir(&self) -> PathBuf {
        self.home_dir().join("logs")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs.max(1))
    }

    pub fn stats_poll(&self) -> Duration {
        Duration::from_secs(self.desk.stats_poll_secs.max(1))
    }
}
