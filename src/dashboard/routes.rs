use axum::{
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Json, Redirect, Response},
    Form,
};
use serde_json::{json, Value};
use std::sync::Arc;

use super::state::DashboardState;
use super::templates::{self, DashboardPage, LoginPage};
use crate::api::Credentials;
use crate::error::AuthError;
use crate::gate::{self, Screen};
use crate::role::Role;
use crate::session::Session;
use crate::view::RoleView;

const HX_REQUEST: &str = "hx-request";
const HX_REDIRECT: &str = "hx-redirect";

// ── GET / — send visitors to the admin gate ──────────────────────────

pub async fn index() -> Redirect {
    Redirect::to(Role::Admin.path())
}

// ── GET /health ──────────────────────────────────────────────────────

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// ── GET /:role — session gate ────────────────────────────────────────

pub async fn role_page(
    State(state): State<Arc<DashboardState>>,
    Path(role): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some(role) = Role::from_path(&role) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let session = state.session_for(&headers).current();
    match (gate::resolve(role, session.as_ref()), session) {
        (Screen::Dashboard(_), Some(session)) => DashboardPage::new(&session).into_response(),
        (_, _) => LoginPage::new(role, String::new(), None).into_response(),
    }
}

// ── POST /:role/login — form login ───────────────────────────────────

pub async fn login(
    State(state): State<Arc<DashboardState>>,
    Path(role): Path<String>,
    headers: HeaderMap,
    Form(credentials): Form<Credentials>,
) -> Response {
    let Some(role) = Role::from_path(&role) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let htmx = is_htmx(&headers);
    let email = credentials.email.trim().to_string();

    let result = match credentials.validate() {
        Ok(()) => state.api.login(role, &email, &credentials.password).await,
        Err(e) => Err(e),
    };

    let mut ctx = state.session_for(&headers);
    let established = result.and_then(|resp| ctx.establish(&resp));

    match established {
        Ok(session) => {
            tracing::info!(%role, session_role = %session.role, email = %email, "login succeeded");
            state.record(|log| log.log_login(session.role, &email));

            let mut response = navigate(role.path(), htmx);
            ctx.storage().apply(response.headers_mut());
            response
        }
        Err(e) => {
            tracing::warn!(%role, email = %email, error = %e, "login failed");
            state.record(|log| log.log_login_failure(role, &email, &e));
            login_failed(role, email, &e, htmx)
        }
    }
}

// ── POST /:role/logout ───────────────────────────────────────────────

pub async fn logout(
    State(state): State<Arc<DashboardState>>,
    Path(role): Path<String>,
    headers: HeaderMap,
) -> Response {
    let role = Role::from_path(&role);
    let mut ctx = state.session_for(&headers);
    ctx.logout();

    tracing::info!(role = ?role, "logged out");
    state.record(|log| log.log_logout(role));

    let target = role.map(|r| r.path()).unwrap_or("/");
    let mut response = navigate(target, is_htmx(&headers));
    ctx.storage().apply(response.headers_mut());
    response
}

// ── GET /:role/stats — HTML partial for HTMX ─────────────────────────

pub async fn stats_html(
    State(state): State<Arc<DashboardState>>,
    Path(role): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some(role) = Role::from_path(&role) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let Some(session) = authorized(&state, role, &headers) else {
        return unauthorized(role);
    };

    let payload = fetch_stats(&state, role, &session).await;
    Html(templates::render_role_view(&RoleView::from_payload(role, &payload))).into_response()
}

// ── GET /:role/stats.json — raw stats payload as JSON ────────────────

pub async fn stats_json(
    State(state): State<Arc<DashboardState>>,
    Path(role): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some(role) = Role::from_path(&role) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let Some(session) = authorized(&state, role, &headers) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Not logged in" })),
        )
            .into_response();
    };

    Json(fetch_stats(&state, role, &session).await).into_response()
}

// ── Helpers ──────────────────────────────────────────────────────────

fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get(HX_REQUEST)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "true")
}

/// HTMX follows `HX-Redirect`; plain forms get a 303.
fn navigate(path: &'static str, htmx: bool) -> Response {
    if htmx {
        let mut response = StatusCode::OK.into_response();
        response
            .headers_mut()
            .insert(HX_REDIRECT, HeaderValue::from_static(path));
        response
    } else {
        Redirect::to(path).into_response()
    }
}

fn login_failed(role: Role, email: String, error: &AuthError, htmx: bool) -> Response {
    let message = Some(error.user_message());
    if htmx {
        Html(templates::render_login_box(role, email, message)).into_response()
    } else {
        LoginPage::new(role, email, message).into_response()
    }
}

/// The session, but only if the gate would open this role's dashboard.
fn authorized(state: &DashboardState, role: Role, headers: &HeaderMap) -> Option<Session> {
    let session = state.session_for(headers).current()?;
    match gate::resolve(role, Some(&session)) {
        Screen::Dashboard(_) => Some(session),
        Screen::Login(_) => None,
    }
}

fn unauthorized(role: Role) -> Response {
    let mut response = StatusCode::UNAUTHORIZED.into_response();
    response
        .headers_mut()
        .insert(HX_REDIRECT, HeaderValue::from_static(role.path()));
    response
}

/// Fetch the role's stats. Failures are logged and replaced by an empty payload.
async fn fetch_stats(state: &DashboardState, role: Role, session: &Session) -> Value {
    match state
        .stats
        .dashboard_stats(role.as_str(), Some(session.token.as_str()))
        .await
    {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!(%role, error = %e, "failed to fetch dashboard stats");
            state.record(|log| log.log_fetch_error(role, &e));
            Value::Object(Default::default())
        }
    }
}
