use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use crate::config::{Config, StoreBackend};
use crate::model::{
    AbsenceCount, AttendanceRate, AttendanceRecord, Employee, NewAttendanceRecord, PresentTotal,
    RecentAttendance,
};

mod memory;
mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Connectivity problems: pool exhausted, connection refused, timeouts.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("query failed: {0}")]
    Query(String),

    /// A stored row could not be mapped to a domain type.
    #[error("decode failed: {0}")]
    Decode(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StoreError::Unavailable(err.to_string()),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                StoreError::Decode(err.to_string())
            }
            other => StoreError::Query(other.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Read/write access to the `employees` and `attendance` collections.
///
/// Aggregate queries join to employees with inner-join semantics: groups
/// whose employee id has no matching employee are dropped. Results are
/// ordered by employee id; record lists are ordered by date descending,
/// then id descending.
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn insert_attendance(&self, record: NewAttendanceRecord) -> StoreResult<u64>;

    async fn attendance_history(&self, employee_id: u64) -> StoreResult<Vec<AttendanceRecord>>;

    /// Count of `Present` records per employee.
    async fn present_totals(&self) -> StoreResult<Vec<PresentTotal>>;

    /// Present days over all days, as a percentage, keeping employees at or
    /// above `min_percentage`.
    async fn attendance_rates(&self, min_percentage: f64) -> StoreResult<Vec<AttendanceRate>>;

    /// Count of `Absent` records dated at or after `since`, keeping employees
    /// with strictly more than `more_than` absences.
    async fn absence_counts(
        &self,
        since: DateTime<Utc>,
        more_than: u64,
    ) -> StoreResult<Vec<AbsenceCount>>;

    /// Up to `limit` most recent records for every employee.
    async fn recent_attendance(&self, limit: u32) -> StoreResult<Vec<RecentAttendance>>;

    async fn ping(&self) -> StoreResult<()>;

    async fn close(&self);
}

/// Builds the configured store. Called once at startup.
pub async fn init_store(config: &Config) -> Result<Arc<dyn AttendanceStore>> {
    match config.store_backend {
        StoreBackend::MySql => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set")?;
            let store =
                MySqlStore::connect(url, config.db_max_connections, config.store_timeout)
                    .await
                    .context("Failed to connect to database")?;
            info!(max_connections = config.db_max_connections, "Connected to MySQL");
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            let employees = match &config.employee_seed_file {
                Some(path) => load_seed(path).await?,
                None => Vec::new(),
            };
            info!(employees = employees.len(), "Using in-memory store");
            Ok(Arc::new(MemoryStore::with_employees(employees)))
        }
    }
}

async fn load_seed(path: &str) -> Result<Vec<Employee>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read employee seed file {}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid employee seed file {}", path))
}
