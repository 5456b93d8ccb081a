use askama::Template;

use crate::role::Role;
use crate::session::Session;
use crate::view::{AdminStats, RoleView, StudentStats, TeacherStats};

// ── Askama Templates ─────────────────────────────────────────────────

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub title: String,
    pub role_label: &'static str,
    pub role_path: &'static str,
    pub demo_email: &'static str,
    pub demo_password: &'static str,
    pub email: String,
    pub error: Option<String>,
}

/// Just the login box, swapped in place by HTMX after a failed attempt.
#[derive(Template)]
#[template(path = "partials/login_box.html")]
pub struct LoginBox {
    pub role_label: &'static str,
    pub role_path: &'static str,
    pub demo_email: &'static str,
    pub demo_password: &'static str,
    pub email: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage {
    pub title: String,
    pub role_label: &'static str,
    pub role_path: &'static str,
    pub display_name: String,
}

#[derive(Template)]
#[template(path = "partials/admin.html")]
pub struct AdminView<'a> {
    pub stats: &'a AdminStats,
}

#[derive(Template)]
#[template(path = "partials/teacher.html")]
pub struct TeacherView<'a> {
    pub stats: &'a TeacherStats,
}

#[derive(Template)]
#[template(path = "partials/student.html")]
pub struct StudentView<'a> {
    pub stats: &'a StudentStats,
}

// ── Constructors (called from routes.rs) ─────────────────────────────

impl LoginPage {
    pub fn new(role: Role, email: String, error: Option<String>) -> Self {
        let demo = role.demo_credentials();
        Self {
            title: format!("SIMS - {} Login", role.label()),
            role_label: role.label(),
            role_path: role.path(),
            demo_email: demo.email,
            demo_password: demo.password,
            email,
            error,
        }
    }
}

impl LoginBox {
    pub fn new(role: Role, email: String, error: Option<String>) -> Self {
        let demo = role.demo_credentials();
        Self {
            role_label: role.label(),
            role_path: role.path(),
            demo_email: demo.email,
            demo_password: demo.password,
            email,
            error,
        }
    }
}

impl DashboardPage {
    pub fn new(session: &Session) -> Self {
        let role = session.role;
        Self {
            title: format!("SIMS - {} Dashboard", role.label()),
            role_label: role.label(),
            role_path: role.path(),
            display_name: session.display_name().to_string(),
        }
    }
}

// ── Render helpers ───────────────────────────────────────────────────

/// Render the role-specific dashboard body. One arm per role.
pub fn render_role_view(view: &RoleView) -> String {
    let rendered = match view {
        RoleView::Admin(stats) => AdminView { stats }.render(),
        RoleView::Teacher(stats) => TeacherView { stats }.render(),
        RoleView::Student(stats) => StudentView { stats }.render(),
    };
    rendered.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to render role view");
        String::new()
    })
}

pub fn render_login_box(role: Role, email: String, error: Option<String>) -> String {
    LoginBox::new(role, email, error).render().unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to render login box");
        String::new()
    })
}
