use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable that overrides `api_url` (handy with `.env`).
pub const API_URL_ENV: &str = "SIMS_API_URL";

/// Application configuration, loaded from `sims.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_url: String,
    pub host: String,
    pub port: u16,
    pub stats_source: String,
    pub request_timeout_secs: u64,
    pub cookie_secure: bool,
    pub activity_log: bool,
    pub log_dir: String,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000/api".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3001,
            stats_source: "mock".to_string(),
            request_timeout_secs: 30,
            cookie_secure: false,
            activity_log: true,
            log_dir: "logs".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration with the chain: `./sims.toml` -> `~/sims.toml` -> defaults,
    /// then apply environment overrides.
    pub fn load() -> Self {
        let mut config = Self::load_files();
        config.apply_env_overrides();
        config
    }

    fn load_files() -> Self {
        for path in &Self::config_paths() {
            if let Ok(contents) = fs::read_to_string(path) {
                match toml::from_str::<AppConfig>(&contents) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: failed to parse {}: {}", path.display(), e);
                    }
                }
            }
        }
        Self::default()
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("sims.toml")];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join("sims.toml"));
        }
        paths
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_url = url.trim().to_string();
            }
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
