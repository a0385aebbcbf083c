use std::cmp::Reverse;
use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{AttendanceStore, StoreResult};
use crate::model::{
    AbsenceCount, AttendanceRate, AttendanceRecord, AttendanceStatus, Employee,
    NewAttendanceRecord, PresentTotal, RecentAttendance,
};

#[derive(Default)]
struct Inner {
    employees: BTreeMap<u64, Employee>,
    records: Vec<AttendanceRecord>,
    next_id: u64,
}

/// Process-local store with the same query semantics as the MySQL one.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_employees(employees: impl IntoIterator<Item = Employee>) -> Self {
        let employees = employees.into_iter().map(|e| (e.id, e)).collect();
        Self {
            inner: RwLock::new(Inner {
                employees,
                records: Vec::new(),
                next_id: 0,
            }),
        }
    }
}

fn newest_first(records: &mut [AttendanceRecord]) {
    records.sort_by_key(|r| Reverse((r.date, r.id)));
}

/// Groups records by employee id and joins each group to its employee,
/// dropping groups without one.
fn join_groups<'a, T>(
    inner: &'a Inner,
    records: impl Iterator<Item = &'a AttendanceRecord>,
    mut project: impl FnMut(&Employee, &[&AttendanceRecord]) -> Option<T>,
) -> Vec<T> {
    let mut groups: BTreeMap<u64, Vec<&AttendanceRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.employee_id).or_default().push(record);
    }

    groups
        .iter()
        .filter_map(|(id, group)| {
            let employee = inner.employees.get(id)?;
            project(employee, group.as_slice())
        })
        .collect()
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn insert_attendance(&self, record: NewAttendanceRecord) -> StoreResult<u64> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let id = inner.next_id;
        inner.records.push(AttendanceRecord {
            id,
            employee_id: record.employee_id,
            date: record.date,
            status: record.status,
        });
        Ok(id)
    }

    async fn attendance_history(&self, employee_id: u64) -> StoreResult<Vec<AttendanceRecord>> {
        let inner = self.inner.read().await;
        let mut records: Vec<AttendanceRecord> = inner
            .records
            .iter()
            .filter(|r| r.employee_id == employee_id)
            .cloned()
            .collect();
        newest_first(&mut records);
        Ok(records)
    }

    async fn present_totals(&self) -> StoreResult<Vec<PresentTotal>> {
        let inner = self.inner.read().await;
        let present = inner
            .records
            .iter()
            .filter(|r| r.status == AttendanceStatus::Present);

        Ok(join_groups(&inner, present, |employee, group| {
            Some(PresentTotal {
                employee_id: employee.id,
                name: employee.name.clone(),
                department: employee.department.clone(),
                total_present: group.len() as i64,
            })
        }))
    }

    async fn attendance_rates(&self, min_percentage: f64) -> StoreResult<Vec<AttendanceRate>> {
        let inner = self.inner.read().await;

        Ok(join_groups(&inner, inner.records.iter(), |employee, group| {
            let present = group
                .iter()
                .filter(|r| r.status == AttendanceStatus::Present)
                .count();
            let percentage = present as f64 * 100.0 / group.len() as f64;
            (percentage >= min_percentage).then(|| AttendanceRate {
                employee_id: employee.id,
                name: employee.name.clone(),
                department: employee.department.clone(),
                attendance_percentage: percentage,
            })
        }))
    }

    async fn absence_counts(
        &self,
        since: DateTime<Utc>,
        more_than: u64,
    ) -> StoreResult<Vec<AbsenceCount>> {
        let inner = self.inner.read().await;
        let absences = inner
            .records
            .iter()
            .filter(|r| r.status == AttendanceStatus::Absent && r.date >= since);

        Ok(join_groups(&inner, absences, |employee, group| {
            ((group.len() as u64) > more_than).then(|| AbsenceCount {
                employee_id: employee.id,
                name: employee.name.clone(),
                department: employee.department.clone(),
                absent_count: group.len() as i64,
            })
        }))
    }

    async fn recent_attendance(&self, limit: u32) -> StoreResult<Vec<RecentAttendance>> {
        let inner = self.inner.read().await;

        Ok(inner
            .employees
            .values()
            .map(|employee| {
                let mut records: Vec<AttendanceRecord> = inner
                    .records
                    .iter()
                    .filter(|r| r.employee_id == employee.id)
                    .cloned()
                    .collect();
                newest_first(&mut records);
                records.truncate(limit as usize);

                RecentAttendance {
                    employee_id: employee.id,
                    employee: employee.name.clone(),
                    department: employee.department.clone(),
                    recent_attendance: records,
                }
            })
            .collect())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn close(&self) {}
}
