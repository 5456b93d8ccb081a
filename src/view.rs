//! Role-shaped views over the opaque stats payload.
//!
//! Every field tolerates being missing, `null` or of the wrong type: the
//! dashboard must render against `{}` just as well as against a full payload.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::role::Role;

/// Attendance below this is highlighted in the student view.
pub const LOW_ATTENDANCE_THRESHOLD: f64 = 75.0;

/// A field of the wrong type becomes its default; sibling fields are untouched.
fn lenient_field<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(de)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Each element is recovered on its own, so one `null` keeps its slot as a default.
fn lenient_seq<'de, D, T>(de: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let items = match Value::deserialize(de)? {
        Value::Array(items) => items,
        _ => Vec::new(),
    };
    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}

/// Counts arrive as `45` or `45.0` depending on the backend.
fn lenient_count<'de, D>(de: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(de)?;
    Ok(value
        .as_u64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|n| *n >= 0.0 && n.fract() == 0.0)
                .map(|n| n as u64)
        })
        .unwrap_or_default())
}

/// Parse a payload into `T`, falling back to an all-default `T`.
fn lenient<T: DeserializeOwned + Default>(role: Role, payload: &Value) -> T {
    if !payload.is_object() {
        if !payload.is_null() {
            tracing::warn!(%role, "stats payload is not an object; rendering defaults");
        }
        return T::default();
    }
    serde_json::from_value(payload.clone()).unwrap_or_else(|e| {
        tracing::warn!(%role, error = %e, "stats payload did not match the role view; rendering defaults");
        T::default()
    })
}

/// `85.5` -> `"85.5%"`, `87.0` -> `"87%"`.
pub fn percent(value: f64) -> String {
    format!("{value}%")
}

// ── Charts ──────────────────────────────────────────────────────────────

/// Series handed to the browser's chart script as a `data-chart` attribute.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSpec {
    pub kind: &'static str,
    pub label: &'static str,
    pub labels: Vec<String>,
    pub data: Vec<f64>,
    pub colors: Vec<&'static str>,
}

impl ChartSpec {
    pub fn to_attr(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

// ── Admin ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AttendanceTrends {
    #[serde(deserialize_with = "lenient_seq")]
    pub dates: Vec<String>,
    #[serde(deserialize_with = "lenient_seq")]
    pub percentages: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResultDistribution {
    #[serde(deserialize_with = "lenient_count")]
    pub pass_count: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub fail_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AdminStats {
    #[serde(deserialize_with = "lenient_count")]
    pub total_students: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub total_teachers: u64,
    #[serde(deserialize_with = "lenient_field")]
    pub avg_attendance: f64,
    #[serde(deserialize_with = "lenient_count")]
    pub upcoming_events: u64,
    #[serde(deserialize_with = "lenient_field")]
    pub attendance_trends: AttendanceTrends,
    #[serde(deserialize_with = "lenient_field")]
    pub result_distribution: ResultDistribution,
}

impl AdminStats {
    pub fn avg_attendance_label(&self) -> String {
        percent(self.avg_attendance)
    }

    pub fn attendance_chart(&self) -> ChartSpec {
        ChartSpec {
            kind: "line",
            label: "Attendance %",
            labels: self.attendance_trends.dates.clone(),
            data: self.attendance_trends.percentages.clone(),
            colors: vec!["rgb(75, 192, 192)"],
        }
    }

    pub fn result_chart(&self) -> ChartSpec {
        ChartSpec {
            kind: "pie",
            label: "Results",
            labels: vec!["Pass".to_string(), "Fail".to_string()],
            data: vec![
                self.result_distribution.pass_count as f64,
                self.result_distribution.fail_count as f64,
            ],
            colors: vec!["#4CAF50", "#f44336"],
        }
    }
}

// ── Teacher ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AssignedSubject {
    #[serde(deserialize_with = "lenient_field")]
    pub id: i64,
    #[serde(deserialize_with = "lenient_field")]
    pub code: String,
    #[serde(deserialize_with = "lenient_field")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TeacherStats {
    #[serde(deserialize_with = "lenient_count")]
    pub total_students: u64,
    #[serde(deserialize_with = "lenient_field")]
    pub avg_attendance: f64,
    #[serde(deserialize_with = "lenient_count")]
    pub pending_results: u64,
    #[serde(deserialize_with = "lenient_seq")]
    pub subjects: Vec<AssignedSubject>,
}

impl TeacherStats {
    pub fn avg_attendance_label(&self) -> String {
        percent(self.avg_attendance)
    }
}

// ── Student ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SubjectAttendance {
    #[serde(deserialize_with = "lenient_field")]
    pub subject_name: String,
    #[serde(deserialize_with = "lenient_count")]
    pub present_count: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub total_count: u64,
    #[serde(deserialize_with = "lenient_field")]
    pub percentage: f64,
}

impl SubjectAttendance {
    pub fn is_low(&self) -> bool {
        self.percentage < LOW_ATTENDANCE_THRESHOLD
    }

    pub fn percentage_label(&self) -> String {
        percent(self.percentage)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SubjectResult {
    #[serde(deserialize_with = "lenient_field")]
    pub subject_name: String,
    #[serde(deserialize_with = "lenient_field")]
    pub internal_marks: f64,
    #[serde(deserialize_with = "lenient_field")]
    pub external_marks: f64,
    #[serde(deserialize_with = "lenient_field")]
    pub total_marks: f64,
    #[serde(deserialize_with = "lenient_field")]
    pub grade: String,
}

impl SubjectResult {
    /// CSS class for the grade badge; `+` is not valid in a class name.
    pub fn grade_class(&self) -> String {
        format!("grade grade-{}", self.grade.replace('+', "plus"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StudentStats {
    #[serde(deserialize_with = "lenient_field")]
    pub overall_attendance: f64,
    #[serde(deserialize_with = "lenient_field")]
    pub avg_percentage: f64,
    #[serde(deserialize_with = "lenient_field")]
    pub overall_grade: String,
    #[serde(deserialize_with = "lenient_seq")]
    pub subjects: Vec<SubjectAttendance>,
    #[serde(deserialize_with = "lenient_seq")]
    pub results: Vec<SubjectResult>,
}

impl StudentStats {
    pub fn overall_attendance_label(&self) -> String {
        percent(self.overall_attendance)
    }

    pub fn avg_percentage_label(&self) -> String {
        percent(self.avg_percentage)
    }

    pub fn attendance_chart(&self) -> ChartSpec {
        ChartSpec {
            kind: "line",
            label: "Attendance %",
            labels: self.subjects.iter().map(|s| s.subject_name.clone()).collect(),
            data: self.subjects.iter().map(|s| s.percentage).collect(),
            colors: vec!["rgb(75, 192, 192)"],
        }
    }
}

// ── Dispatch ────────────────────────────────────────────────────────────

/// The role-specific body of the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub enum RoleView {
    Admin(AdminStats),
    Teacher(TeacherStats),
    Student(StudentStats),
}

impl RoleView {
    /// Pick the view for `role` and destructure the payload into it.
    pub fn from_payload(role: Role, payload: &Value) -> Self {
        match role {
            Role::Admin => Self::Admin(lenient(role, payload)),
            Role::Teacher => Self::Teacher(lenient(role, payload)),
            Role::Student => Self::Student(lenient(role, payload)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::mock_dashboard_stats;
    use serde_json::json;

    #[test]
    fn test_admin_view_from_mock() {
        let RoleView::Admin(stats) = RoleView::from_payload(Role::Admin, &mock_dashboard_stats("admin")) else {
            panic!("expected admin view");
        };
        assert_eq!(stats.total_students, 50);
        assert_eq!(stats.total_teachers, 10);
        assert_eq!(stats.avg_attendance_label(), "85.5%");
        assert_eq!(stats.attendance_trends.dates.len(), 5);
        assert_eq!(stats.result_chart().data, vec![45.0, 5.0]);
    }

    #[test]
    fn test_empty_payload_renders_defaults() {
        for role in Role::ALL {
            let view = RoleView::from_payload(role, &json!({}));
            match view {
                RoleView::Admin(s) => assert_eq!(s, AdminStats::default()),
                RoleView::Teacher(s) => assert_eq!(s, TeacherStats::default()),
                RoleView::Student(s) => assert_eq!(s, StudentStats::default()),
            }
        }
    }

    #[test]
    fn test_missing_subjects_is_empty() {
        let view = RoleView::from_payload(Role::Teacher, &json!({"total_students": 3}));
        let RoleView::Teacher(stats) = view else {
            panic!("expected teacher view");
        };
        assert_eq!(stats.total_students, 3);
        assert!(stats.subjects.is_empty());
    }

    #[test]
    fn test_null_fields_default() {
        let payload = json!({
            "subjects": null,
            "results": null,
            "overall_grade": null,
            "overall_attendance": 60
        });
        let RoleView::Student(stats) = RoleView::from_payload(Role::Student, &payload) else {
            panic!("expected student view");
        };
        assert!(stats.subjects.is_empty());
        assert!(stats.results.is_empty());
        assert_eq!(stats.overall_grade, "");
        assert_eq!(stats.overall_attendance_label(), "60%");
    }

    #[test]
    fn test_bad_field_keeps_valid_siblings() {
        let payload = json!({
            "total_students": 50,
            "total_teachers": "ten",
            "upcoming_events": 3.0,
            "attendance_trends": {"dates": ["Mon", "Tue"], "percentages": [85, null]},
            "result_distribution": "n/a"
        });
        let RoleView::Admin(stats) = RoleView::from_payload(Role::Admin, &payload) else {
            panic!("expected admin view");
        };
        assert_eq!(stats.total_students, 50);
        assert_eq!(stats.total_teachers, 0);
        assert_eq!(stats.upcoming_events, 3);
        assert_eq!(stats.attendance_trends.dates, vec!["Mon", "Tue"]);
        assert_eq!(stats.attendance_trends.percentages, vec![85.0, 0.0]);
        assert_eq!(stats.result_distribution, ResultDistribution::default());
    }

    #[test]
    fn test_bad_subject_field_keeps_the_rest() {
        let payload = json!({
            "total_students": 45,
            "pending_results": 5,
            "subjects": [
                {"id": "1", "code": "CS301", "name": "Data Structures"},
                {"id": 2, "code": "CS302", "name": "Database Systems"}
            ]
        });
        let RoleView::Teacher(stats) = RoleView::from_payload(Role::Teacher, &payload) else {
            panic!("expected teacher view");
        };
        assert_eq!(stats.total_students, 45);
        assert_eq!(stats.pending_results, 5);
        assert_eq!(stats.subjects.len(), 2);
        assert_eq!(stats.subjects[0].id, 0);
        assert_eq!(stats.subjects[0].code, "CS301");
        assert_eq!(stats.subjects[1].id, 2);
    }

    #[test]
    fn test_non_object_payload_falls_back() {
        let view = RoleView::from_payload(Role::Admin, &Value::Null);
        assert_eq!(view, RoleView::Admin(AdminStats::default()));

        let view = RoleView::from_payload(Role::Student, &json!([1, 2, 3]));
        assert_eq!(view, RoleView::Student(StudentStats::default()));
    }

    #[test]
    fn test_student_helpers() {
        let low = SubjectAttendance {
            subject_name: "Networks".into(),
            present_count: 20,
            total_count: 40,
            percentage: 50.0,
        };
        assert!(low.is_low());
        assert_eq!(low.percentage_label(), "50%");

        let result = SubjectResult {
            grade: "B+".into(),
            ..Default::default()
        };
        assert_eq!(result.grade_class(), "grade grade-Bplus");
    }

    #[test]
    fn test_chart_attr_is_json() {
        let RoleView::Student(stats) = RoleView::from_payload(Role::Student, &mock_dashboard_stats("student")) else {
            panic!("expected student view");
        };
        let attr: Value = serde_json::from_str(&stats.attendance_chart().to_attr()).unwrap();
        assert_eq!(attr["kind"], "line");
        assert_eq!(attr["labels"][1], "Database Systems");
        assert_eq!(attr["data"][0], 90.5);
    }
}
