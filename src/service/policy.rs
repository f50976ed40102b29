//! How a day without an attendance record is shown.
//!
//! The daily roster and the monthly calendar deliberately disagree: the
//! roster counts a missing record as `Absent`, the calendar leaves weekdays
//! blank. Both are kept as separate named policies; swapping one for the
//! other is a one-line change at the construction site.

use chrono::NaiveDate;

use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::utils::time::is_weekend;

pub trait MissingRecordPolicy: Send + Sync {
    fn status_for(&self, date: NaiveDate) -> Option<AttendanceStatus>;
}

/// Daily roster: nobody on record means absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct DailyDefaultPolicy;

impl MissingRecordPolicy for DailyDefaultPolicy {
    fn status_for(&self, _date: NaiveDate) -> Option<AttendanceStatus> {
        Some(AttendanceStatus::Absent)
    }
}

/// Monthly calendar: weekends are holidays, weekdays stay blank.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonthlyDefaultPolicy;

impl MissingRecordPolicy for MonthlyDefaultPolicy {
    fn status_for(&self, date: NaiveDate) -> Option<AttendanceStatus> {
        is_weekend(date).then_some(AttendanceStatus::Holiday)
    }
}

/// An explicit record always wins over the policy default.
pub fn resolve(
    policy: &dyn MissingRecordPolicy,
    record: Option<&AttendanceRecord>,
    date: NaiveDate,
) -> Option<AttendanceStatus> {
    record.map(|r| r.status).or_else(|| policy.status_for(date))
}
