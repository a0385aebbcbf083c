use actix_web::{Responder, web};

use super::outcome_response;
use crate::error::AppError;
use crate::service::AnalyticsService;

/// Total present days per employee
#[utoipa::path(
    get,
    path = "/analytics/total-attendance",
    responses(
        (status = 200, description = "Present totals, or a no-data message", body = [crate::model::PresentTotal]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Analytics"
)]
pub async fn total_attendance(
    analytics: web::Data<AnalyticsService>,
) -> Result<impl Responder, AppError> {
    Ok(outcome_response(analytics.total_attendance().await?))
}

/// Attendance history of one employee, most recent first
#[utoipa::path(
    get,
    path = "/analytics/attendance-history/{id}",
    params(
        ("id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Attendance records, or a no-data message", body = [crate::model::AttendanceRecord]),
        (status = 400, description = "Malformed employee id", body = Object, example = json!({
            "error": "'abc' is not a valid employee id"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Analytics"
)]
pub async fn attendance_history(
    analytics: web::Data<AnalyticsService>,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let raw_id = path.into_inner();
    Ok(outcome_response(analytics.attendance_history(&raw_id).await?))
}

/// Employees at or above the attendance threshold (95% by default)
#[utoipa::path(
    get,
    path = "/analytics/top-attendees",
    responses(
        (status = 200, description = "Attendance rates, or a no-data message", body = [crate::model::AttendanceRate]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Analytics"
)]
pub async fn top_attendees(
    analytics: web::Data<AnalyticsService>,
) -> Result<impl Responder, AppError> {
    Ok(outcome_response(analytics.top_attendees().await?))
}

/// Employees absent more than 5 times this month
#[utoipa::path(
    get,
    path = "/analytics/absent-employees",
    responses(
        (status = 200, description = "Absence counts, or a no-data message", body = [crate::model::AbsenceCount]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Analytics"
)]
pub async fn absent_employees(
    analytics: web::Data<AnalyticsService>,
) -> Result<impl Responder, AppError> {
    Ok(outcome_response(analytics.absent_employees().await?))
}

/// Latest 5 records for every employee
#[utoipa::path(
    get,
    path = "/analytics/recent-attendance",
    responses(
        (status = 200, description = "Recent attendance per employee, or a no-data message", body = [crate::model::RecentAttendance]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Analytics"
)]
pub async fn recent_attendance(
    analytics: web::Data<AnalyticsService>,
) -> Result<impl Responder, AppError> {
    Ok(outcome_response(analytics.recent_attendance().await?))
}
