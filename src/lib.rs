use anyhow::Result;
use colored::*;
use dotenvy::dotenv;
use std::sync::Arc;

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod gate;
pub mod logger;
pub mod role;
pub mod session;
pub mod stats;
pub mod view;

/// Run the application: load `.env`, load config, and serve the dashboard.
pub async fn run() -> Result<()> {
    // Load environment variables from .env
    dotenv().ok();

    let config = config::AppConfig::load();
    logger::init_tracing(&config.log_filter);

    let state = Arc::new(dashboard::DashboardState::new(config)?);
    print_banner(&state);

    dashboard::start_dashboard(state).await
}

/// Startup banner with the address and the backend in use.
pub fn print_banner(state: &dashboard::DashboardState) {
    let config = &state.config;
    println!("{}", "====================================".bright_cyan());
    println!("{}", "          SIMS DASHBOARD            ".bright_cyan().bold());
    println!("{}", "====================================".bright_cyan());
    println!(" Listening on  {}", format!("http://{}", config.bind_address()).bright_white());
    println!(" Backend API   {}", config.api_url.bright_white());
    println!(" Stats source  {}", state.stats.describe().yellow());
    for role in role::Role::ALL {
        println!("   {} {}", "→".dimmed(), role.path());
    }
    println!();
}

// Re-exports for library consumers: common useful types
pub use api::ApiClient;
pub use config::AppConfig;
pub use role::Role;
pub use session::{Session, SessionContext};
pub use stats::{MockStats, StatsSource};
