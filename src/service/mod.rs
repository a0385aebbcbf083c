use std::future::Future;
use std::time::Duration;

use tracing::error;

use crate::db::StoreResult;
use crate::error::AppError;

pub mod analytics;
pub mod attendance;

pub use analytics::{AnalyticsService, month_start};
pub use attendance::AttendanceService;

/// Runs one store call under `limit`. No retries: a timeout is reported as
/// `StoreUnavailable`, other failures are mapped by kind.
pub(crate) async fn with_timeout<T, F>(limit: Duration, operation: &str, call: F) -> Result<T, AppError>
where
    F: Future<Output = StoreResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            error!(error = %e, operation, "Store call failed");
            Err(e.into())
        }
        Err(_) => {
            error!(operation, timeout_secs = limit.as_secs(), "Store call timed out");
            Err(AppError::StoreUnavailable(format!(
                "{} timed out after {:?}",
                operation, limit
            )))
        }
    }
}
