use crate::{
    api::{self, analytics, attendance},
    config::Config,
    error::AppError,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{Resource, Scope, web};
use std::sync::Arc;
use tracing::warn;

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        warn!(error = %err, "Rejected attendance payload");
        AppError::validation(err.to_string()).into()
    }));

    match build_limiter(config.rate_limit_per_min).map(Arc::new) {
        Some(limiter) => {
            cfg.service(attendance_scope().wrap(limiter.clone()))
                .service(analytics_scope().wrap(limiter));
        }
        None => {
            cfg.service(attendance_scope()).service(analytics_scope());
        }
    }
}

// Helper to build the per-IP limiter, None when disabled
fn build_limiter(requests_per_min: u32) -> Option<Governor<PeerIpKeyExtractor, NoOpMiddleware>> {
    if requests_per_min == 0 {
        return None;
    }
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()?;
    Some(Governor::new(&cfg))
}

// Known path, unknown method: same 404 as an unknown path
fn resource(path: &str) -> Resource {
    web::resource(path).default_service(web::route().to(api::not_found))
}

fn attendance_scope() -> Scope {
    // /attendance
    web::scope("/attendance")
        .service(resource("").route(web::post().to(attendance::record_attendance)))
        .default_service(web::route().to(api::not_found))
}

fn analytics_scope() -> Scope {
    web::scope("/analytics")
        .service(resource("/total-attendance").route(web::get().to(analytics::total_attendance)))
        // /analytics/attendance-history/{id}
        .service(
            resource("/attendance-history/{id}").route(web::get().to(analytics::attendance_history)),
        )
        .service(resource("/top-attendees").route(web::get().to(analytics::top_attendees)))
        .service(resource("/absent-employees").route(web::get().to(analytics::absent_employees)))
        .service(resource("/recent-attendance").route(web::get().to(analytics::recent_attendance)))
        .default_service(web::route().to(api::not_found))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limiter_is_disabled_at_zero() {
        assert!(build_limiter(0).is_none());
    }

    #[test]
    fn limiter_is_built_for_any_positive_rate() {
        assert!(build_limiter(1).is_some());
        assert!(build_limiter(1000).is_some());
        // more than one request per millisecond still yields a valid period
        assert!(build_limiter(120_000).is_some());
    }
}
