use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::with_timeout;
use crate::db::AttendanceStore;
use crate::error::AppError;
use crate::model::NewAttendance;

/// Validates and persists single attendance events.
#[derive(Clone)]
pub struct AttendanceService {
    store: Arc<dyn AttendanceStore>,
    timeout: Duration,
}

impl AttendanceService {
    pub fn new(store: Arc<dyn AttendanceStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Duplicates for the same employee and date are accepted, and the
    /// employee id is not checked against `employees`.
    pub async fn record(&self, payload: NewAttendance) -> Result<(), AppError> {
        let record = payload.validate()?;
        let employee_id = record.employee_id;
        let status = record.status;

        let id = with_timeout(
            self.timeout,
            "insert_attendance",
            self.store.insert_attendance(record),
        )
        .await?;

        info!(attendance_id = id, employee_id, %status, "Attendance recorded");
        Ok(())
    }
}
