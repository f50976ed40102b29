use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};

use crate::error::CoreError;

/// Elapsed working time between a check-in and a check-out, floored to the minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkedDuration {
    pub hours: u32,
    pub minutes: u32,
}

impl WorkedDuration {
    pub fn from_minutes(total: u32) -> Self {
        Self {
            hours: total / 60,
            minutes: total % 60,
        }
    }
}

impl fmt::Display for WorkedDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hours, self.minutes)
    }
}

/// "HH:MM" for a duration, "-" when there is none.
pub fn render_duration(duration: Option<WorkedDuration>) -> String {
    duration.map_or_else(|| "-".to_string(), |d| d.to_string())
}

/// Parses a 24-hour clock time. Seconds are tolerated so values read back
/// from a TIME column parse too.
pub fn parse_clock(raw: &str) -> Result<NaiveTime, CoreError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| CoreError::validation(format!("invalid clock time '{raw}', expected HH:MM")))
}

/// Same-day duration between two clock times.
///
/// No overnight shifts: a check-out that is not strictly later than the
/// check-in yields `None`.
pub fn duration_between(
    check_in: Option<NaiveTime>,
    check_out: Option<NaiveTime>,
) -> Option<WorkedDuration> {
    let (check_in, check_out) = (check_in?, check_out?);
    if check_out <= check_in {
        return None;
    }
    let minutes = (check_out - check_in).num_minutes();
    u32::try_from(minutes).ok().map(WorkedDuration::from_minutes)
}

/// Renders a clock time as "HH:MM".
pub fn clock(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// String form of [`duration_between`]; unparsable times count as absent.
pub fn parse_duration(check_in: Option<&str>, check_out: Option<&str>) -> Option<WorkedDuration> {
    let check_in = parse_clock(check_in?).ok();
    let check_out = parse_clock(check_out?).ok();
    duration_between(check_in, check_out)
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// First and last day of a month, or `None` for an impossible year/month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next_first.pred_opt()?))
}

/// Serde adapter for optional clock times written as "HH:MM".
pub mod hhmm_opt {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(t) => s.collect_str(&t.format("%H:%M")),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => super::parse_clock(s)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
