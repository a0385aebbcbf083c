use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Datelike, Local, NaiveTime, TimeZone, Utc};
use tracing::debug;

use super::with_timeout;
use crate::config::Config;
use crate::db::AttendanceStore;
use crate::error::AppError;
use crate::model::{
    AbsenceCount, AttendanceRate, AttendanceRecord, Outcome, PresentTotal, RecentAttendance,
};

/// Read-only aggregate views over the attendance collection. Every query
/// scans all records and is independent of the others.
#[derive(Clone)]
pub struct AnalyticsService {
    store: Arc<dyn AttendanceStore>,
    timeout: Duration,
    top_attendee_threshold: f64,
    absence_limit: u64,
    recent_limit: u32,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn AttendanceStore>, config: &Config) -> Self {
        Self {
            store,
            timeout: config.store_timeout,
            top_attendee_threshold: config.top_attendee_threshold,
            absence_limit: config.absence_limit,
            recent_limit: config.recent_limit,
        }
    }

    /// Present records per employee. Employees with none are left out.
    pub async fn total_attendance(&self) -> Result<Outcome<PresentTotal>, AppError> {
        let rows = with_timeout(self.timeout, "present_totals", self.store.present_totals()).await?;
        Ok(Outcome::from_rows(rows))
    }

    /// All records of one employee, most recent first. `raw_id` must be a
    /// well-formed employee identifier.
    pub async fn attendance_history(
        &self,
        raw_id: &str,
    ) -> Result<Outcome<AttendanceRecord>, AppError> {
        let employee_id = raw_id.trim().parse::<u64>().map_err(|_| {
            AppError::validation(format!("'{}' is not a valid employee id", raw_id))
        })?;

        let rows = with_timeout(
            self.timeout,
            "attendance_history",
            self.store.attendance_history(employee_id),
        )
        .await?;
        Ok(Outcome::from_rows(rows))
    }

    pub async fn top_attendees(&self) -> Result<Outcome<AttendanceRate>, AppError> {
        self.top_attendees_above(self.top_attendee_threshold).await
    }

    /// Employees whose present days make up at least `threshold` percent of
    /// all their records, whatever the other statuses are.
    pub async fn top_attendees_above(
        &self,
        threshold: f64,
    ) -> Result<Outcome<AttendanceRate>, AppError> {
        let rows = with_timeout(
            self.timeout,
            "attendance_rates",
            self.store.attendance_rates(threshold),
        )
        .await?;
        Ok(Outcome::from_rows(rows))
    }

    /// Employees absent more than the configured limit since the start of
    /// the current month, server local time.
    pub async fn absent_employees(&self) -> Result<Outcome<AbsenceCount>, AppError> {
        self.absent_employees_at(&Local::now()).await
    }

    pub async fn absent_employees_at<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
    ) -> Result<Outcome<AbsenceCount>, AppError> {
        let since = month_start(now);
        debug!(%since, more_than = self.absence_limit, "Counting absences");

        let rows = with_timeout(
            self.timeout,
            "absence_counts",
            self.store.absence_counts(since, self.absence_limit),
        )
        .await?;
        Ok(Outcome::from_rows(rows))
    }

    /// Latest records of every employee, including employees without any.
    pub async fn recent_attendance(&self) -> Result<Outcome<RecentAttendance>, AppError> {
        let rows = with_timeout(
            self.timeout,
            "recent_attendance",
            self.store.recent_attendance(self.recent_limit),
        )
        .await?;
        Ok(Outcome::from_rows(rows))
    }

    pub async fn health(&self) -> Result<(), AppError> {
        with_timeout(self.timeout, "ping", self.store.ping()).await
    }
}

/// Midnight on the first day of `now`'s month, in `now`'s timezone.
pub fn month_start<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let today = now.date_naive();
    let first = today.with_day(1).unwrap_or(today).and_time(NaiveTime::MIN);

    now.timezone()
        .from_local_datetime(&first)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| first.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::model::{AttendanceStatus, Employee, NewAttendanceRecord};
    use async_trait::async_trait;
    use chrono::FixedOffset;

    use crate::db::{StoreError, StoreResult};

    #[test]
    fn month_start_in_utc() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 15, 4, 5).unwrap();
        assert_eq!(
            month_start(&now),
            Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn month_start_respects_local_offset() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2026, 11, 1, 1, 0, 0).unwrap();
        // 2026-11-01 00:00 +02:00
        assert_eq!(
            month_start(&now),
            Utc.with_ymd_and_hms(2026, 10, 31, 22, 0, 0).unwrap()
        );
    }

    fn service(store: Arc<dyn AttendanceStore>) -> AnalyticsService {
        AnalyticsService::new(store, &Config::default())
    }

    #[actix_web::test]
    async fn malformed_history_id_is_a_validation_error() {
        let svc = service(Arc::new(MemoryStore::new()));
        let err = svc.attendance_history("not-an-id").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[actix_web::test]
    async fn empty_store_yields_no_data() {
        let svc = service(Arc::new(MemoryStore::new()));
        assert_eq!(svc.total_attendance().await.unwrap(), Outcome::NoData);
        assert_eq!(svc.top_attendees().await.unwrap(), Outcome::NoData);
        assert_eq!(svc.recent_attendance().await.unwrap(), Outcome::NoData);
    }

    #[actix_web::test]
    async fn previous_month_absences_are_ignored() {
        let store = Arc::new(MemoryStore::with_employees([Employee::new(1, "Ann", "Eng")]));
        for d in 1..=6 {
            store
                .insert_attendance(NewAttendanceRecord {
                    employee_id: 1,
                    date: Utc.with_ymd_and_hms(2026, 9, 20 + d, 9, 0, 0).unwrap(),
                    status: AttendanceStatus::Absent,
                })
                .await
                .unwrap();
        }
        let svc = service(store.clone());

        let october = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        assert_eq!(svc.absent_employees_at(&october).await.unwrap(), Outcome::NoData);

        let september = Utc.with_ymd_and_hms(2026, 9, 30, 12, 0, 0).unwrap();
        let rows = svc.absent_employees_at(&september).await.unwrap();
        assert_eq!(rows.rows()[0].absent_count, 6);
    }

    struct DownStore;

    #[async_trait]
    impl AttendanceStore for DownStore {
        async fn insert_attendance(&self, _: NewAttendanceRecord) -> StoreResult<u64> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn attendance_history(&self, _: u64) -> StoreResult<Vec<AttendanceRecord>> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn present_totals(&self) -> StoreResult<Vec<PresentTotal>> {
            Err(StoreError::Query("syntax error".into()))
        }
        async fn attendance_rates(&self, _: f64) -> StoreResult<Vec<AttendanceRate>> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn absence_counts(
            &self,
            _: DateTime<Utc>,
            _: u64,
        ) -> StoreResult<Vec<AbsenceCount>> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn recent_attendance(&self, _: u32) -> StoreResult<Vec<RecentAttendance>> {
            std::future::pending().await
        }
        async fn ping(&self) -> StoreResult<()> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn close(&self) {}
    }

    #[actix_web::test]
    async fn store_failures_are_classified() {
        let svc = service(Arc::new(DownStore));
        assert!(matches!(
            svc.top_attendees().await.unwrap_err(),
            AppError::StoreUnavailable(_)
        ));
        assert!(matches!(
            svc.total_attendance().await.unwrap_err(),
            AppError::Internal(_)
        ));
    }

    #[actix_web::test]
    async fn hung_store_call_times_out() {
        let mut config = Config::default();
        config.store_timeout = Duration::from_millis(20);
        let svc = AnalyticsService::new(Arc::new(DownStore), &config);
        assert!(matches!(
            svc.recent_attendance().await.unwrap_err(),
            AppError::StoreUnavailable(_)
        ));
    }
}
