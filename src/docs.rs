use crate::model::{
    AbsenceCount, AttendanceRate, AttendanceRecord, AttendanceStatus, Employee, NewAttendance,
    PresentTotal, RecentAttendance,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance API",
        version = "0.1.0",
        description = r#"
## Employee Attendance Service

Records employee attendance events and answers a fixed set of analytical queries.

### Key Features
- **Attendance Recording**
  - One event per request: employee, date and status (`Present`, `Absent`, `Late`)
- **Analytics**
  - Total present days per employee
  - Per-employee history, most recent first
  - Top attendees (95% or better)
  - Employees absent more than 5 times this month
  - Latest 5 records for every employee

### Response Format
- JSON responses
- Empty analytics results return `{"message": "No data found"}` with status 200
- Errors return `{"error": "..."}`: 400 for invalid input, 503 when the store is unreachable, 500 otherwise

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::health,

        crate::api::attendance::record_attendance,

        crate::api::analytics::total_attendance,
        crate::api::analytics::attendance_history,
        crate::api::analytics::top_attendees,
        crate::api::analytics::absent_employees,
        crate::api::analytics::recent_attendance
    ),
    components(
        schemas(
            Employee,
            AttendanceStatus,
            AttendanceRecord,
            NewAttendance,
            PresentTotal,
            AttendanceRate,
            AbsenceCount,
            RecentAttendance
        )
    ),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Attendance", description = "Attendance recording APIs"),
        (name = "Analytics", description = "Attendance analytics APIs"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/attendance",
            "/analytics/total-attendance",
            "/analytics/attendance-history/{id}",
            "/analytics/top-attendees",
            "/analytics/absent-employees",
            "/analytics/recent-attendance",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {}",
                expected
            );
        }
    }
}
