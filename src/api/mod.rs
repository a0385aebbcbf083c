use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use serde_json::json;

use crate::error::AppError;
use crate::model::Outcome;
use crate::service::AnalyticsService;

pub mod analytics;
pub mod attendance;

pub(crate) fn outcome_response<T: Serialize>(outcome: Outcome<T>) -> HttpResponse {
    match outcome {
        Outcome::Found(rows) => HttpResponse::Ok().json(rows),
        Outcome::NoData => HttpResponse::Ok().json(json!({ "message": "No data found" })),
    }
}

/// Health check
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Store reachable", body = Object, example = json!({
            "status": "ok"
        })),
        (status = 503, description = "Store unavailable", body = Object, example = json!({
            "error": "Store unavailable"
        }))
    ),
    tag = "Health"
)]
pub async fn health(analytics: web::Data<AnalyticsService>) -> Result<impl Responder, AppError> {
    analytics.health().await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "ok" })))
}

pub async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound("Route not found".to_string()))
}
