use thiserror::Error;

/// Inline message shown when the backend gives no reason of its own.
pub const GENERIC_LOGIN_FAILURE: &str = "Login failed";

/// Anything that stops a login from producing a session.
///
/// Always recovered by the login view: rendered inline next to the form.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials input: {0}")]
    Invalid(String),

    #[error("login rejected with status {status}")]
    Rejected { status: u16, message: Option<String> },

    #[error("login request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected login response: {0}")]
    Malformed(String),

    #[error("backend returned unknown user type '{0}'")]
    UnknownRole(String),
}

impl AuthError {
    /// Text for the inline error box under the login form.
    pub fn user_message(&self) -> String {
        match self {
            Self::Invalid(msg) => msg.clone(),
            Self::Rejected {
                message: Some(msg), ..
            } => msg.clone(),
            _ => GENERIC_LOGIN_FAILURE.to_string(),
        }
    }
}

/// Failure to retrieve a stats payload. Logged, never shown to the user.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("stats request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("stats endpoint returned status {0}")]
    Status(u16),

    #[error("stats payload is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}
