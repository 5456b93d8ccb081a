use crate::role::Role;
use crate::session::Session;

/// What a role path shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard(Role),
    Login(Role),
}

/// Decide between dashboard and login for `path_role`.
///
/// Only a session whose role equals the path's role opens the dashboard. Any
/// other case, including a valid session for a different role, gets the
/// path role's login form.
pub fn resolve(path_role: Role, session: Option<&Session>) -> Screen {
    match session {
        Some(session) if session.role == path_role => Screen::Dashboard(path_role),
        _ => Screen::Login(path_role),
    }
}
