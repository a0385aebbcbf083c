use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use tracing::debug;

use super::{AttendanceStore, StoreError, StoreResult};
use crate::model::{
    AbsenceCount, AttendanceRate, AttendanceRecord, AttendanceStatus, NewAttendanceRecord,
    PresentTotal, RecentAttendance,
};

/// `AttendanceStore` backed by the `employees` and `attendance` tables.
/// See `sql/schema.sql`.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

#[derive(FromRow)]
struct AttendanceRow {
    id: u64,
    employee_id: u64,
    date: DateTime<Utc>,
    status: String,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = StoreError;

    fn try_from(row: AttendanceRow) -> StoreResult<Self> {
        Ok(AttendanceRecord {
            id: row.id,
            employee_id: row.employee_id,
            date: row.date,
            status: parse_status(row.id, &row.status)?,
        })
    }
}

#[derive(FromRow)]
struct RecentRow {
    employee_id: u64,
    name: String,
    department: String,
    record_id: Option<u64>,
    date: Option<DateTime<Utc>>,
    status: Option<String>,
}

fn parse_status(record_id: u64, raw: &str) -> StoreResult<AttendanceStatus> {
    raw.parse().map_err(|_| {
        StoreError::Decode(format!(
            "attendance {} has unknown status '{}'",
            record_id, raw
        ))
    })
}

// Every status counts toward total days, only Present toward present days.
// The 100e0 literal keeps the division in DOUBLE; exact operands would make
// MySQL divide as DECIMAL and round to a few decimal places.
const ATTENDANCE_RATES_SQL: &str = r#"
SELECT e.id AS employee_id, e.name, e.department, g.attendance_percentage
FROM (
    SELECT employee_id,
           SUM(CASE WHEN status = 'Present' THEN 1 ELSE 0 END) * 100e0
                / COUNT(*) AS attendance_percentage
    FROM attendance
    GROUP BY employee_id
) g
INNER JOIN employees e ON e.id = g.employee_id
WHERE g.attendance_percentage >= ?
ORDER BY e.id
"#;

/// Folds employee-ordered LEFT JOIN rows into one entry per employee. An
/// employee without records arrives as a single row of NULL record columns.
fn group_recent(rows: Vec<RecentRow>) -> StoreResult<Vec<RecentAttendance>> {
    let mut result: Vec<RecentAttendance> = Vec::new();
    for row in rows {
        let record = match (row.record_id, row.date, row.status) {
            (Some(id), Some(date), Some(status)) => Some(AttendanceRecord {
                id,
                employee_id: row.employee_id,
                date,
                status: parse_status(id, &status)?,
            }),
            _ => None,
        };

        match result.last_mut() {
            Some(entry) if entry.employee_id == row.employee_id => {
                entry.recent_attendance.extend(record);
            }
            _ => result.push(RecentAttendance {
                employee_id: row.employee_id,
                employee: row.name,
                department: row.department,
                recent_attendance: record.into_iter().collect(),
            }),
        }
    }

    Ok(result)
}

impl MySqlStore {
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> StoreResult<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl AttendanceStore for MySqlStore {
    async fn insert_attendance(&self, record: NewAttendanceRecord) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance (employee_id, date, status)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(record.employee_id)
        .bind(record.date)
        .bind(record.status.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_id())
    }

    async fn attendance_history(&self, employee_id: u64) -> StoreResult<Vec<AttendanceRecord>> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT id, employee_id, date, status
            FROM attendance
            WHERE employee_id = ?
            ORDER BY date DESC, id DESC
            "#,
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AttendanceRecord::try_from).collect()
    }

    async fn present_totals(&self) -> StoreResult<Vec<PresentTotal>> {
        let rows = sqlx::query_as::<_, PresentTotal>(
            r#"
            SELECT e.id AS employee_id, e.name, e.department, g.total_present
            FROM (
                SELECT employee_id, COUNT(*) AS total_present
                FROM attendance
                WHERE status = 'Present'
                GROUP BY employee_id
            ) g
            INNER JOIN employees e ON e.id = g.employee_id
            ORDER BY e.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn attendance_rates(&self, min_percentage: f64) -> StoreResult<Vec<AttendanceRate>> {
        let rows = sqlx::query_as::<_, AttendanceRate>(ATTENDANCE_RATES_SQL)
            .bind(min_percentage)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn absence_counts(
        &self,
        since: DateTime<Utc>,
        more_than: u64,
    ) -> StoreResult<Vec<AbsenceCount>> {
        let rows = sqlx::query_as::<_, AbsenceCount>(
            r#"
            SELECT e.id AS employee_id, e.name, e.department, g.absent_count
            FROM (
                SELECT employee_id, COUNT(*) AS absent_count
                FROM attendance
                WHERE status = 'Absent' AND date >= ?
                GROUP BY employee_id
                HAVING COUNT(*) > ?
            ) g
            INNER JOIN employees e ON e.id = g.employee_id
            ORDER BY e.id
            "#,
        )
        .bind(since)
        .bind(more_than)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn recent_attendance(&self, limit: u32) -> StoreResult<Vec<RecentAttendance>> {
        let rows = sqlx::query_as::<_, RecentRow>(
            r#"
            SELECT e.id AS employee_id, e.name, e.department,
                   r.id AS record_id, r.date, r.status
            FROM employees e
            LEFT JOIN (
                SELECT id, employee_id, date, status,
                       ROW_NUMBER() OVER (
                           PARTITION BY employee_id
                           ORDER BY date DESC, id DESC
                       ) AS rn
                FROM attendance
            ) r ON r.employee_id = e.id AND r.rn <= ?
            ORDER BY e.id, r.date DESC, r.id DESC
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(rows = rows.len(), limit, "Fetched recent attendance rows");

        group_recent(rows)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(employee_id: u64, name: &str, record: Option<(u64, u32, &str)>) -> RecentRow {
        RecentRow {
            employee_id,
            name: name.to_string(),
            department: "Eng".to_string(),
            record_id: record.map(|(id, _, _)| id),
            date: record.map(|(_, d, _)| Utc.with_ymd_and_hms(2026, 10, d, 9, 0, 0).unwrap()),
            status: record.map(|(_, _, s)| s.to_string()),
        }
    }

    #[test]
    fn rows_fold_into_one_entry_per_employee() {
        let rows = vec![
            row(1, "Ann", Some((12, 9, "Present"))),
            row(1, "Ann", Some((11, 8, "Late"))),
            row(2, "Bo", None),
            row(3, "Cy", Some((7, 2, "Absent"))),
        ];

        let grouped = group_recent(rows).unwrap();
        assert_eq!(grouped.len(), 3);

        assert_eq!(grouped[0].employee, "Ann");
        let ids: Vec<u64> = grouped[0].recent_attendance.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![12, 11]);
        assert_eq!(grouped[0].recent_attendance[1].status, AttendanceStatus::Late);

        assert_eq!(grouped[1].employee, "Bo");
        assert!(grouped[1].recent_attendance.is_empty());

        assert_eq!(grouped[2].recent_attendance.len(), 1);
        assert_eq!(grouped[2].recent_attendance[0].employee_id, 3);
    }

    #[test]
    fn attendance_rate_is_computed_in_floating_point() {
        assert!(ATTENDANCE_RATES_SQL.contains("* 100e0"));
        assert!(!ATTENDANCE_RATES_SQL.contains("100.0"));
        assert!(!ATTENDANCE_RATES_SQL.contains("CAST("));
    }

    #[test]
    fn no_rows_means_no_entries() {
        assert!(group_recent(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn unknown_status_is_a_decode_error() {
        let rows = vec![row(1, "Ann", Some((5, 1, "Sick")))];
        let err = group_recent(rows).unwrap_err();
        assert!(matches!(err, StoreError::Decode(ref m) if m.contains("Sick")));
    }
}
