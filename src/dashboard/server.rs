use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::routes;
use super::state::DashboardState;

/// Assemble every dashboard route around `state`.
pub fn build_router(state: Arc<DashboardState>) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/health", get(routes::health))
        // Session gate and auth
        .route("/:role", get(routes::role_page))
        .route("/:role/login", post(routes::login))
        .route("/:role/logout", post(routes::logout))
        // HTMX HTML partial
        .route("/:role/stats", get(routes::stats_html))
        // JSON API endpoint
        .route("/:role/stats.json", get(routes::stats_json))
        .with_state(state)
}

/// Bind the configured address and serve the dashboard until shutdown.
pub async fn start_dashboard(state: Arc<DashboardState>) -> anyhow::Result<()> {
    let addr = state.config.bind_address();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "dashboard listening");

    axum::serve(listener, app).await?;
    Ok(())
}
