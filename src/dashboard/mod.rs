//! Server-rendered web dashboard.
//!
//! Serves the three role gates, the login and logout actions, and the HTMX
//! partial that swaps role stats in once they have been fetched.

pub mod cookies;
pub mod routes;
pub mod server;
pub mod state;
pub mod templates;

pub use cookies::CookieStorage;
pub use server::{build_router, start_dashboard};
pub use state::DashboardState;
