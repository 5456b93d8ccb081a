use anyhow::Result;
use axum::http::HeaderMap;
use std::sync::Arc;

use super::cookies::CookieStorage;
use crate::api::ApiClient;
use crate::config::AppConfig;
use crate::logger::Logger;
use crate::session::SessionContext;
use crate::stats::{StatsMode, StatsSource};

/// Shared, read-only state behind every dashboard request.
///
/// Sessions are not stored here; they travel with each request as cookies.
pub struct DashboardState {
    pub config: AppConfig,
    pub api: ApiClient,
    pub stats: Arc<dyn StatsSource>,
    activity: Option<Logger>,
}

impl DashboardState {
    /// Build state from config, choosing the stats source it names.
    pub fn new(config: AppConfig) -> Result<Self> {
        let mode = StatsMode::from_config(&config.stats_source)?;
        let api = ApiClient::from_config(&config);
        let stats = mode.build(&api);
        Ok(Self::assemble(config, api, stats))
    }

    /// Build state around an explicit stats source. `config.stats_source` is ignored.
    pub fn with_stats(config: AppConfig, stats: Arc<dyn StatsSource>) -> Self {
        let api = ApiClient::from_config(&config);
        Self::assemble(config, api, stats)
    }

    fn assemble(config: AppConfig, api: ApiClient, stats: Arc<dyn StatsSource>) -> Self {
        let activity = if config.activity_log {
            match Logger::new(&config.log_dir) {
                Ok(logger) => Some(logger),
                Err(e) => {
                    tracing::warn!(dir = %config.log_dir, error = %e, "activity log disabled");
                    None
                }
            }
        } else {
            None
        };

        Self {
            config,
            api,
            stats,
            activity,
        }
    }

    /// The session context for one request.
    pub fn session_for(&self, headers: &HeaderMap) -> SessionContext<CookieStorage> {
        SessionContext::new(CookieStorage::from_headers(headers, self.config.cookie_secure))
    }

    /// Run `f` against the activity log, if there is one. Write failures are
    /// reported through `tracing` and otherwise ignored.
    pub fn record(&self, f: impl FnOnce(&Logger) -> Result<()>) {
        if let Some(logger) = &self.activity {
            if let Err(e) = f(logger) {
                tracing::warn!(error = %e, "failed to write activity log");
            }
        }
    }
}
