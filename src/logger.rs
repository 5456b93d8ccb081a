use anyhow::Result;
use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::error::{AuthError, FetchError};
use crate::role::Role;

/// Install the global `tracing` subscriber. `RUST_LOG` wins over `default_filter`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Append-only activity log, one file per run.
///
/// Records who logged in or out and which stats fetches failed. Passwords
/// never reach this file.
#[derive(Debug, Clone)]
pub struct Logger {
    log_file: PathBuf,
}

impl Logger {
    pub fn new(log_dir: &str) -> Result<Self> {
        let dir = PathBuf::from(log_dir);
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let log_file = dir.join(format!("activity_{}.log", timestamp));

        Ok(Self { log_file })
    }

    pub fn path(&self) -> &PathBuf {
        &self.log_file
    }

    pub fn log(&self, message: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)?;

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(file, "[{}] {}", timestamp, message)?;
        Ok(())
    }

    pub fn log_login(&self, role: Role, email: &str) -> Result<()> {
        self.log(&format!("LOGIN {}: {}", role, email))
    }

    pub fn log_login_failure(&self, role: Role, email: &str, error: &AuthError) -> Result<()> {
        self.log(&format!("LOGIN FAILED {}: {} ({})", role, email, error))
    }

    pub fn log_logout(&self, role: Option<Role>) -> Result<()> {
        match role {
            Some(role) => self.log(&format!("LOGOUT {}", role)),
            None => self.log("LOGOUT"),
        }
    }

    pub fn log_fetch_error(&self, role: Role, error: &FetchError) -> Result<()> {
        self.log(&format!("STATS FETCH FAILED {}: {}", role, error))
    }
}
