use serde::Serialize;
use utoipa::ToSchema;

use super::attendance::AttendanceRecord;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "employeeId": 1,
    "name": "Ann",
    "department": "Eng",
    "totalPresent": 18
}))]
pub struct PresentTotal {
    pub employee_id: u64,
    pub name: String,
    pub department: String,
    pub total_present: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "employeeId": 1,
    "name": "Ann",
    "department": "Eng",
    "attendancePercentage": 96.5
}))]
pub struct AttendanceRate {
    pub employee_id: u64,
    pub name: String,
    pub department: String,
    pub attendance_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "employeeId": 4,
    "name": "Bo",
    "department": "Ops",
    "absentCount": 6
}))]
pub struct AbsenceCount {
    pub employee_id: u64,
    pub name: String,
    pub department: String,
    pub absent_count: i64,
}

/// One entry per employee, including employees without any records.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentAttendance {
    pub employee_id: u64,
    /// Employee display name.
    pub employee: String,
    pub department: String,
    pub recent_attendance: Vec<AttendanceRecord>,
}

/// Result of an analytics query. An empty result is a successful outcome,
/// reported to clients as `{"message": "No data found"}`.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Found(Vec<T>),
    NoData,
}

impl<T> Outcome<T> {
    pub fn from_rows(rows: Vec<T>) -> Self {
        if rows.is_empty() {
            Outcome::NoData
        } else {
            Outcome::Found(rows)
        }
    }

    pub fn rows(&self) -> &[T] {
        match self {
            Outcome::Found(rows) => rows,
            Outcome::NoData => &[],
        }
    }
}
