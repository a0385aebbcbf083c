use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

use crate::error::AppError;
use crate::model::NewAttendance;
use crate::service::AttendanceService;

/// Record attendance
#[utoipa::path(
    post,
    path = "/attendance",
    request_body = NewAttendance,
    responses(
        (status = 200, description = "Attendance recorded", body = Object, example = json!({
            "message": "Attendance recorded successfully"
        })),
        (status = 400, description = "Invalid payload", body = Object, example = json!({
            "error": "employeeId is required"
        })),
        (status = 503, description = "Store unavailable"),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "error": "Something went wrong"
        }))
    ),
    tag = "Attendance"
)]
pub async fn record_attendance(
    service: web::Data<AttendanceService>,
    payload: web::Json<NewAttendance>,
) -> Result<impl Responder, AppError> {
    service.record(payload.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Attendance recorded successfully"
    })))
}
