use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::api::ApiClient;
use crate::error::FetchError;

// ── Source selection ────────────────────────────────────────────────────

/// Where dashboard stats come from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatsMode {
    /// Static payloads compiled into the binary.
    Mock,
    /// `GET /dashboard/{role}/stats` on the backend.
    Http,
}

impl StatsMode {
    /// Parse the `stats_source` string from config.
    pub fn from_config(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "http" | "api" | "backend" => Ok(Self::Http),
            other => Err(anyhow!(
                "Unknown stats_source '{}'. Supported: mock, http",
                other
            )),
        }
    }

    pub fn build(&self, api: &ApiClient) -> Arc<dyn StatsSource> {
        match self {
            Self::Mock => Arc::new(MockStats),
            Self::Http => Arc::new(HttpStats::new(api.clone())),
        }
    }
}

// ── Capability ──────────────────────────────────────────────────────────

/// Something that can produce the stats payload for a role.
///
/// The payload is opaque here; only the role views look inside it.
#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn dashboard_stats(&self, role: &str, token: Option<&str>) -> Result<Value, FetchError>;

    /// Short label for the startup banner.
    fn describe(&self) -> String {
        "custom source".to_string()
    }
}

/// Serves [`mock_dashboard_stats`]. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockStats;

#[async_trait]
impl StatsSource for MockStats {
    async fn dashboard_stats(&self, role: &str, _token: Option<&str>) -> Result<Value, FetchError> {
        Ok(mock_dashboard_stats(role))
    }

    fn describe(&self) -> String {
        "mock data".to_string()
    }
}

/// Fetches stats from the backend as the session's user.
#[derive(Debug, Clone)]
pub struct HttpStats {
    client: ApiClient,
}

impl HttpStats {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StatsSource for HttpStats {
    async fn dashboard_stats(&self, role: &str, token: Option<&str>) -> Result<Value, FetchError> {
        self.client.with_token(token).get_dashboard_stats(role).await
    }

    fn describe(&self) -> String {
        format!("backend API ({})", self.client.base_url())
    }
}

// ── Mock payloads ───────────────────────────────────────────────────────

/// Demo stats keyed by role. Unknown roles get `{}`.
pub fn mock_dashboard_stats(role: &str) -> Value {
    match role {
        "admin" => json!({
            "total_students": 50,
            "total_teachers": 10,
            "avg_attendance": 85.5,
            "upcoming_events": 3,
            "attendance_trends": {
                "dates": ["Mon", "Tue", "Wed", "Thu", "Fri"],
                "percentages": [85, 87, 83, 86, 88]
            },
            "result_distribution": {
                "pass_count": 45,
                "fail_count": 5
            }
        }),
        "teacher" => json!({
            "total_students": 45,
            "avg_attendance": 87.2,
            "pending_results": 5,
            "subjects": [
                { "id": 1, "code": "CS301", "name": "Data Structures" },
                { "id": 2, "code": "CS302", "name": "Database Systems" }
            ]
        }),
        "student" => json!({
            "overall_attendance": 82.5,
            "avg_percentage": 78.3,
            "overall_grade": "B+",
            "subjects": [
                { "subject_name": "Data Structures", "present_count": 38, "total_count": 42, "percentage": 90.5 },
                { "subject_name": "Database Systems", "present_count": 35, "total_count": 42, "percentage": 83.3 }
            ],
            "results": [
                { "subject_name": "Data Structures", "internal_marks": 25, "external_marks": 60, "total_marks": 85, "grade": "A" },
                { "subject_name": "Database Systems", "internal_marks": 23, "external_marks": 55, "total_marks": 78, "grade": "B+" }
            ]
        }),
        _ => json!({}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_stats_mode_from_config() {
        assert_eq!(StatsMode::from_config("mock").unwrap(), StatsMode::Mock);
        assert_eq!(StatsMode::from_config("MOCK").unwrap(), StatsMode::Mock);
        assert_eq!(StatsMode::from_config("http").unwrap(), StatsMode::Http);
        assert_eq!(StatsMode::from_config("api").unwrap(), StatsMode::Http);
        assert!(StatsMode::from_config("carrier-pigeon").is_err());
        assert!(StatsMode::from_config("").is_err());
    }

    #[test]
    fn test_sources_describe_themselves() {
        let api = ApiClient::new("http://sims.test/api", Duration::from_secs(1));
        assert_eq!(StatsMode::Mock.build(&api).describe(), "mock data");
        assert_eq!(
            StatsMode::Http.build(&api).describe(),
            "backend API (http://sims.test/api)"
        );
    }

    #[test]
    fn test_mock_admin_stats() {
        let stats = mock_dashboard_stats("admin");
        assert_eq!(stats["total_students"], 50);
        assert_eq!(stats["total_teachers"], 10);
        assert_eq!(stats["avg_attendance"], 85.5);
        assert_eq!(stats["result_distribution"]["pass_count"], 45);
    }

    #[test]
    fn test_mock_unknown_role_is_empty_object() {
        assert_eq!(mock_dashboard_stats("unknown"), json!({}));
        assert_eq!(mock_dashboard_stats(""), json!({}));
    }

    #[test]
    fn test_mock_payloads_have_distinct_shapes() {
        let teacher = mock_dashboard_stats("teacher");
        let student = mock_dashboard_stats("student");
        assert_eq!(teacher["subjects"][0]["code"], "CS301");
        assert_eq!(student["subjects"][0]["subject_name"], "Data Structures");
        assert_eq!(student["overall_grade"], "B+");
        assert!(teacher.get("overall_grade").is_none());
    }

    #[tokio::test]
    async fn test_mock_source_ignores_token() {
        let source = MockStats;
        let with = source.dashboard_stats("teacher", Some("t")).await.unwrap();
        let without = source.dashboard_stats("teacher", None).await.unwrap();
        assert_eq!(with, without);
    }

    #[tokio::test]
    async fn test_http_source_uses_backend() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/dashboard/student/stats")
            .match_header("authorization", "Bearer s3cret")
            .with_status(200)
            .with_body(r#"{"overall_grade":"A"}"#)
            .create_async()
            .await;

        let api = ApiClient::new(server.url(), Duration::from_secs(5));
        let source = StatsMode::Http.build(&api);
        let stats = source
            .dashboard_stats("student", Some("s3cret"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(stats["overall_grade"], "A");
    }
}
