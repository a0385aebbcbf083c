use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::error::AppError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": 42,
    "employeeId": 1,
    "date": "2026-10-01T09:00:00Z",
    "status": "Present"
}))]
pub struct AttendanceRecord {
    pub id: u64,
    pub employee_id: u64,
    #[schema(value_type = String, format = DateTime)]
    pub date: DateTime<Utc>,
    pub status: AttendanceStatus,
}

/// A validated attendance event, not yet assigned an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAttendanceRecord {
    pub employee_id: u64,
    pub date: DateTime<Utc>,
    pub status: AttendanceStatus,
}

/// Raw `POST /attendance` body. Every field is optional here so that a
/// missing field surfaces as a validation error naming the field.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewAttendance {
    #[schema(example = 1, value_type = u64)]
    pub employee_id: Option<u64>,
    #[schema(example = "2026-10-01T09:00:00Z", value_type = String)]
    pub date: Option<String>,
    #[schema(example = "Present", value_type = AttendanceStatus)]
    pub status: Option<String>,
}

impl NewAttendance {
    pub fn validate(self) -> Result<NewAttendanceRecord, AppError> {
        let employee_id = self
            .employee_id
            .ok_or_else(|| AppError::validation("employeeId is required"))?;

        let raw_date = self
            .date
            .ok_or_else(|| AppError::validation("date is required"))?;
        let date = parse_date(&raw_date)
            .ok_or_else(|| AppError::validation(format!("date '{}' is not a valid date", raw_date)))?;

        let raw_status = self
            .status
            .ok_or_else(|| AppError::validation("status is required"))?;
        let status = raw_status.parse::<AttendanceStatus>().map_err(|_| {
            AppError::validation(format!(
                "status '{}' must be one of Present, Absent, Late",
                raw_status
            ))
        })?;

        Ok(NewAttendanceRecord {
            employee_id,
            date,
            status,
        })
    }
}

/// Accepts RFC 3339, a naive timestamp (taken as UTC) or a bare date
/// (midnight UTC).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn payload(employee_id: Option<u64>, date: Option<&str>, status: Option<&str>) -> NewAttendance {
        NewAttendance {
            employee_id,
            date: date.map(str::to_string),
            status: status.map(str::to_string),
        }
    }

    #[test]
    fn valid_payload_passes() {
        let record = payload(Some(7), Some("2026-10-01"), Some("Absent"))
            .validate()
            .unwrap();
        assert_eq!(record.employee_id, 7);
        assert_eq!(record.status, AttendanceStatus::Absent);
        assert_eq!(record.date, Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn missing_employee_id_is_rejected() {
        let err = payload(None, Some("2026-10-01"), Some("Present"))
            .validate()
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("employeeId")));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = payload(Some(1), Some("2026-10-01"), Some("Sick"))
            .validate()
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn garbage_date_is_rejected() {
        let err = payload(Some(1), Some("yesterday"), Some("Present"))
            .validate()
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("yesterday")));
    }

    #[test]
    fn offsets_are_normalized_to_utc() {
        let dt = parse_date("2026-10-01T09:30:00+02:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 10, 1, 7, 30, 0).unwrap());

        let naive = parse_date("2026-10-01T09:30:00").unwrap();
        assert_eq!(naive, Utc.with_ymd_and_hms(2026, 10, 1, 9, 30, 0).unwrap());
    }

    #[test]
    fn record_serializes_camel_case() {
        let record = AttendanceRecord {
            id: 3,
            employee_id: 9,
            date: Utc.with_ymd_and_hms(2026, 10, 2, 0, 0, 0).unwrap(),
            status: AttendanceStatus::Present,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["employeeId"], 9);
        assert_eq!(json["status"], "Present");
        assert_eq!(json["date"], "2026-10-02T00:00:00Z");
    }
}
