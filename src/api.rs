use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::AppConfig;
use crate::error::{AuthError, FetchError};
use crate::role::Role;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

// ── Request / Response types ────────────────────────────────────────────

/// What the user typed into the login form. Never persisted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    /// Reject obviously unusable input before it reaches the backend.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(AuthError::Invalid(
                "Email and password are required".to_string(),
            ));
        }
        if !EMAIL_RE.is_match(self.email.trim()) {
            return Err(AuthError::Invalid(
                "Please enter a valid email address".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Body of a successful `POST /auth/{role}/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user_type: String,
    #[serde(default)]
    pub user: Value,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

// ── Client ──────────────────────────────────────────────────────────────

/// Thin wrapper over the SIMS backend.
///
/// Cheap to clone; [`ApiClient::with_token`] gives a copy that authenticates
/// as a particular session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token: None,
            timeout,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.api_url.clone(), config.request_timeout())
    }

    pub fn with_token(&self, token: Option<&str>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()).map(str::to_string),
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// JSON content type, plus `Authorization: Bearer` when a token is held.
    pub fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = &self.token {
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => tracing::warn!("stored access token is not a valid header value; sending without it"),
            }
        }

        headers
    }

    /// `POST /auth/{role}/login`.
    ///
    /// Non-2xx answers become [`AuthError::Rejected`] carrying the backend's
    /// `error` string when it sent a non-empty one.
    pub async fn login(
        &self,
        role: Role,
        email: &str,
        password: &str,
    ) -> Result<LoginResponse, AuthError> {
        let url = self.endpoint(&format!("auth/{}/login", role.as_str()));
        tracing::debug!(%url, %role, "sending login request");

        let resp = self
            .http
            .post(&url)
            .headers(self.auth_headers())
            .json(&LoginRequest { email, password })
            .timeout(self.timeout)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if status.is_success() {
            return serde_json::from_str(&body).map_err(|e| AuthError::Malformed(e.to_string()));
        }

        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.trim().is_empty());
        Err(AuthError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    /// `GET /dashboard/{role}/stats`. The payload is returned untouched.
    pub async fn get_dashboard_stats(&self, role: &str) -> Result<Value, FetchError> {
        let url = self.endpoint(&format!("dashboard/{role}/stats"));

        let resp = self
            .http
            .get(&url)
            .headers(self.auth_headers())
            .timeout(self.timeout)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client(url: String) -> ApiClient {
        ApiClient::new(url, Duration::from_secs(5))
    }

    #[test]
    fn test_credentials_validation() {
        let ok = Credentials {
            email: "admin@sims.edu".into(),
            password: "admin123".into(),
        };
        assert!(ok.validate().is_ok());

        let missing = Credentials {
            email: "".into(),
            password: "x".into(),
        };
        assert_eq!(
            missing.validate().unwrap_err().user_message(),
            "Email and password are required"
        );

        let bad_email = Credentials {
            email: "not-an-email".into(),
            password: "x".into(),
        };
        assert_eq!(
            bad_email.validate().unwrap_err().user_message(),
            "Please enter a valid email address"
        );
    }

    #[test]
    fn test_endpoint_joins_slashes() {
        let c = client("http://localhost:8000/api/".into());
        assert_eq!(
            c.endpoint("/auth/admin/login"),
            "http://localhost:8000/api/auth/admin/login"
        );
    }

    #[test]
    fn test_auth_headers_without_token() {
        let headers = client("http://x".into()).auth_headers();
        assert!(!headers.contains_key(AUTHORIZATION));
        assert_eq!(headers[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_auth_headers_with_token() {
        let c = client("http://x".into()).with_token(Some("abc"));
        assert_eq!(c.auth_headers()[AUTHORIZATION], "Bearer abc");

        // Empty tokens are treated as absent
        let c = c.with_token(Some(""));
        assert!(!c.auth_headers().contains_key(AUTHORIZATION));
    }

    #[test]
    fn test_login_response_deserialization() {
        let json = r#"{
            "access_token": "t",
            "refresh_token": "r",
            "user_type": "ADMIN",
            "user": {"id": 1, "full_name": "System Administrator"}
        }"#;
        let resp: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.access_token, "t");
        assert_eq!(resp.refresh_token.as_deref(), Some("r"));
        assert_eq!(resp.user_type, "ADMIN");
        assert_eq!(resp.user["full_name"], "System Administrator");
    }

    #[tokio::test]
    async fn test_login_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/admin/login")
            .match_body(Matcher::Json(json!({
                "email": "admin@sims.edu",
                "password": "admin123"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"t","user_type":"ADMIN","user":{"full_name":"X"}}"#)
            .create_async()
            .await;

        let resp = client(server.url())
            .login(Role::Admin, "admin@sims.edu", "admin123")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(resp.access_token, "t");
        assert_eq!(resp.user_type, "ADMIN");
    }

    #[tokio::test]
    async fn test_login_rejected_with_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/teacher/login")
            .with_status(401)
            .with_body(r#"{"error":"Invalid credentials"}"#)
            .create_async()
            .await;

        let err = client(server.url())
            .login(Role::Teacher, "teacher@sims.edu", "wrong")
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Rejected { status: 401, .. }));
        assert_eq!(err.user_message(), "Invalid credentials");
    }

    #[tokio::test]
    async fn test_login_rejected_without_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/student/login")
            .with_status(500)
            .with_body("Internal Server Error")
            .create_async()
            .await;

        let err = client(server.url())
            .login(Role::Student, "student@sims.edu", "student123")
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), "Login failed");
    }

    #[tokio::test]
    async fn test_login_malformed_success_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/admin/login")
            .with_status(200)
            .with_body(r#"{"token":"t"}"#)
            .create_async()
            .await;

        let err = client(server.url())
            .login(Role::Admin, "admin@sims.edu", "admin123")
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Malformed(_)));
        assert_eq!(err.user_message(), "Login failed");
    }

    #[tokio::test]
    async fn test_dashboard_stats_sends_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/dashboard/teacher/stats")
            .match_header("authorization", "Bearer abc")
            .with_status(200)
            .with_body(r#"{"total_students": 45}"#)
            .create_async()
            .await;

        let stats = client(server.url())
            .with_token(Some("abc"))
            .get_dashboard_stats("teacher")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(stats["total_students"], 45);
    }

    #[tokio::test]
    async fn test_dashboard_stats_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/dashboard/admin/stats")
            .with_status(503)
            .create_async()
            .await;

        let err = client(server.url())
            .get_dashboard_stats("admin")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status(503)));
    }
}
