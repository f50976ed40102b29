use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::error::CoreError;
use crate::utils::time::hhmm_opt;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum AttendanceStatus {
    Present,
    Absent,
    #[serde(rename = "Half-day")]
    #[strum(serialize = "Half-day")]
    HalfDay,
    #[serde(rename = "On Leave")]
    #[strum(serialize = "On Leave")]
    OnLeave,
    Holiday,
}

/// One employee's attendance for one calendar day. The ledger keeps at most
/// one of these per (employee_id, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "employee_id": 3,
    "date": "2024-07-10",
    "check_in": "09:15",
    "check_out": "17:45",
    "status": "Present"
}))]
pub struct AttendanceRecord {
    pub employee_id: u64,

    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,

    #[serde(with = "hhmm_opt", default)]
    #[schema(value_type = Option<String>, example = "09:15")]
    pub check_in: Option<NaiveTime>,

    #[serde(with = "hhmm_opt", default)]
    #[schema(value_type = Option<String>, example = "17:45")]
    pub check_out: Option<NaiveTime>,

    pub status: AttendanceStatus,
}

impl AttendanceRecord {
    pub fn key(&self) -> (u64, NaiveDate) {
        (self.employee_id, self.date)
    }
}

/// Manual entry or correction. Times are not reconciled with the status: an
/// `Absent` entry may still carry a check-in.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({
    "employee_id": 3,
    "date": "2024-07-10",
    "check_in": "09:15",
    "check_out": "13:30",
    "status": "Half-day"
}))]
pub struct AttendanceInput {
    pub employee_id: Option<u64>,

    #[schema(value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,

    #[serde(with = "hhmm_opt", default)]
    #[schema(value_type = Option<String>, example = "09:15")]
    pub check_in: Option<NaiveTime>,

    #[serde(with = "hhmm_opt", default)]
    #[schema(value_type = Option<String>, example = "17:45")]
    pub check_out: Option<NaiveTime>,

    pub status: Option<AttendanceStatus>,
}

impl AttendanceInput {
    pub fn into_record(self) -> Result<AttendanceRecord, CoreError> {
        Ok(AttendanceRecord {
            employee_id: self
                .employee_id
                .ok_or_else(|| CoreError::validation("employee_id is required"))?,
            date: self
                .date
                .ok_or_else(|| CoreError::validation("date is required"))?,
            check_in: self.check_in,
            check_out: self.check_out,
            status: self
                .status
                .ok_or_else(|| CoreError::validation("status is required"))?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusCounts {
    /// Present plus half-day cells.
    pub present: u32,
    pub absent: u32,
    /// Half-day cells on their own; already included in `present`.
    pub half_day: u32,
    pub on_leave: u32,
}

/// Calendar view of one employee's month; recomputed on every read.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MonthlySummary {
    pub employee_id: u64,
    pub year: i32,
    pub month: u32,
    /// One cell per calendar day, `null` where nothing is known.
    pub days: Vec<Option<AttendanceStatus>>,
    pub counts: StatusCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RosterEntry {
    pub employee_id: u64,

    /// "HH:MM"
    #[schema(example = "09:15")]
    pub check_in: Option<String>,

    #[schema(example = "17:45")]
    pub check_out: Option<String>,

    pub status: Option<AttendanceStatus>,

    /// Worked time as "HH:MM", or "-".
    #[schema(example = "08:30")]
    pub duration: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct DailyStats {
    pub present: usize,
    pub on_leave: usize,
    pub absent: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailyRoster {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub entries: Vec<RosterEntry>,
    pub stats: DailyStats,
}
