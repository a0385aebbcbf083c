pub mod analytics;
pub mod attendance;
pub mod employee;

pub use analytics::{AbsenceCount, AttendanceRate, Outcome, PresentTotal, RecentAttendance};
pub use attendance::{AttendanceRecord, AttendanceStatus, NewAttendance, NewAttendanceRecord};
pub use employee::Employee;
