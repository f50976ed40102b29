use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::error::{CoreError, CoreResult};
use crate::model::attendance::{
    AttendanceRecord, AttendanceStatus, DailyRoster, DailyStats, MonthlySummary, RosterEntry,
    StatusCounts,
};
use crate::model::employee::Employee;
use crate::service::attendance::AttendanceLedger;
use crate::service::policy::{
    DailyDefaultPolicy, MissingRecordPolicy, MonthlyDefaultPolicy, resolve,
};
use crate::utils::time::{clock, month_bounds, parse_duration, render_duration};

fn rollup(cells: &[Option<AttendanceStatus>]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for status in cells.iter().flatten() {
        match status {
            AttendanceStatus::Present => counts.present += 1,
            AttendanceStatus::HalfDay => {
                counts.present += 1;
                counts.half_day += 1;
            }
            AttendanceStatus::Absent => counts.absent += 1,
            AttendanceStatus::OnLeave => counts.on_leave += 1,
            AttendanceStatus::Holiday => {}
        }
    }
    counts
}

/// Calendar-shaped monthly view of the attendance ledger.
#[derive(Clone)]
pub struct MonthlyAggregator {
    ledger: AttendanceLedger,
    policy: Arc<dyn MissingRecordPolicy>,
}

impl MonthlyAggregator {
    pub fn new(ledger: AttendanceLedger) -> Self {
        Self::with_policy(ledger, Arc::new(MonthlyDefaultPolicy))
    }

    pub fn with_policy(ledger: AttendanceLedger, policy: Arc<dyn MissingRecordPolicy>) -> Self {
        Self { ledger, policy }
    }

    pub async fn build_summary(
        &self,
        employee_id: u64,
        year: i32,
        month: u32,
    ) -> CoreResult<MonthlySummary> {
        let (first, last) = month_bounds(year, month)
            .ok_or_else(|| CoreError::validation(format!("invalid month {year}-{month}")))?;

        let records: HashMap<NaiveDate, AttendanceRecord> = self
            .ledger
            .get_for_employee_range(employee_id, first, last)
            .await?
            .into_iter()
            .map(|r| (r.date, r))
            .collect();

        let days: Vec<Option<AttendanceStatus>> = first
            .iter_days()
            .take_while(|day| *day <= last)
            .map(|day| resolve(self.policy.as_ref(), records.get(&day), day))
            .collect();

        Ok(MonthlySummary {
            employee_id,
            year,
            month,
            counts: rollup(&days),
            days,
        })
    }

    pub async fn build_all(
        &self,
        roster: &[Employee],
        year: i32,
        month: u32,
    ) -> CoreResult<Vec<MonthlySummary>> {
        let mut summaries = Vec::with_capacity(roster.len());
        for employee in roster {
            summaries.push(self.build_summary(employee.id, year, month).await?);
        }
        Ok(summaries)
    }
}

/// Everyone on the roster for one day.
#[derive(Clone)]
pub struct DailyRosterView {
    ledger: AttendanceLedger,
    policy: Arc<dyn MissingRecordPolicy>,
}

impl DailyRosterView {
    pub fn new(ledger: AttendanceLedger) -> Self {
        Self::with_policy(ledger, Arc::new(DailyDefaultPolicy))
    }

    pub fn with_policy(ledger: AttendanceLedger, policy: Arc<dyn MissingRecordPolicy>) -> Self {
        Self { ledger, policy }
    }

    pub async fn build(&self, date: NaiveDate, roster: &[Employee]) -> CoreResult<DailyRoster> {
        let records: HashMap<u64, AttendanceRecord> = self
            .ledger
            .get_for_date(date)
            .await?
            .into_iter()
            .map(|r| (r.employee_id, r))
            .collect();

        let entries: Vec<RosterEntry> = roster
            .iter()
            .map(|employee| {
                let record = records.get(&employee.id);
                let check_in = record.and_then(|r| r.check_in).map(clock);
                let check_out = record.and_then(|r| r.check_out).map(clock);
                RosterEntry {
                    employee_id: employee.id,
                    duration: render_duration(parse_duration(
                        check_in.as_deref(),
                        check_out.as_deref(),
                    )),
                    check_in,
                    check_out,
                    status: resolve(self.policy.as_ref(), record, date),
                }
            })
            .collect();

        let mut stats = DailyStats::default();
        for entry in &entries {
            match entry.status {
                Some(AttendanceStatus::Present | AttendanceStatus::HalfDay) => stats.present += 1,
                Some(AttendanceStatus::OnLeave) => stats.on_leave += 1,
                _ => {}
            }
        }
        stats.absent = entries.len() - stats.present - stats.on_leave;

        Ok(DailyRoster {
            date,
            entries,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::AttendanceStore;
    use crate::store::memory::InMemoryAttendanceStore;
    use chrono::NaiveTime;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
    }

    fn employee(id: u64) -> Employee {
        Employee {
            id,
            department: "Engineering".into(),
            join_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        }
    }

    async fn seeded(records: &[(u64, u32, AttendanceStatus)]) -> AttendanceLedger {
        let store = Arc::new(InMemoryAttendanceStore::new());
        for (employee_id, d, status) in records {
            store
                .upsert(AttendanceRecord {
                    employee_id: *employee_id,
                    date: day(*d),
                    check_in: None,
                    check_out: None,
                    status: *status,
                })
                .await
                .unwrap();
        }
        AttendanceLedger::new(store)
    }

    #[actix_web::test]
    async fn july_2024_summary() {
        use AttendanceStatus::*;
        let ledger = seeded(&[
            (1, 1, Present),
            (1, 2, HalfDay),
            (1, 3, Absent),
            (1, 4, OnLeave),
            (1, 6, Present), // worked a Saturday
            (2, 5, Absent),  // someone else
        ])
        .await;

        let summary = MonthlyAggregator::new(ledger).build_summary(1, 2024, 7).await.unwrap();
        assert_eq!(summary.days.len(), 31);
        assert_eq!(summary.days[5], Some(Present));
        assert_eq!(summary.days[6], Some(Holiday)); // Sunday 7th
        assert_eq!(summary.days[9], None); // Wednesday 10th, no record
        assert_eq!(
            summary.counts,
            StatusCounts {
                present: 3,
                absent: 1,
                half_day: 1,
                on_leave: 1
            }
        );
    }

    #[actix_web::test]
    async fn empty_month_has_only_weekend_holidays() {
        let ledger = seeded(&[]).await;
        let summary = MonthlyAggregator::new(ledger).build_summary(9, 2024, 2).await.unwrap();
        assert_eq!(summary.days.len(), 29);
        // Feb 2024: 4 Saturdays + 4 Sundays
        let holidays = summary.days.iter().filter(|d| **d == Some(AttendanceStatus::Holiday)).count();
        assert_eq!(holidays, 8);
        assert_eq!(summary.counts, StatusCounts::default());
    }

    #[actix_web::test]
    async fn invalid_month_is_a_validation_error() {
        let ledger = seeded(&[]).await;
        let err = MonthlyAggregator::new(ledger).build_summary(1, 2024, 13).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[actix_web::test]
    async fn monthly_view_can_adopt_the_daily_policy() {
        let ledger = seeded(&[]).await;
        let summary = MonthlyAggregator::with_policy(ledger, Arc::new(DailyDefaultPolicy))
            .build_summary(1, 2024, 7)
            .await
            .unwrap();
        assert!(summary.days.iter().all(|d| *d == Some(AttendanceStatus::Absent)));
        assert_eq!(summary.counts.absent, 31);
    }

    #[actix_web::test]
    async fn daily_roster_defaults_missing_employees_to_absent() {
        use AttendanceStatus::*;
        let ledger = seeded(&[(1, 10, Present), (2, 10, OnLeave), (3, 10, HalfDay), (9, 10, Present)]).await;
        ledger
            .upsert(AttendanceRecord {
                employee_id: 1,
                date: day(10),
                check_in: NaiveTime::from_hms_opt(9, 15, 0),
                check_out: NaiveTime::from_hms_opt(17, 45, 0),
                status: Present,
            })
            .await
            .unwrap();

        let roster: Vec<Employee> = (1..=4).map(employee).collect();
        let view = DailyRosterView::new(ledger).build(day(10), &roster).await.unwrap();

        let statuses: Vec<_> = view.entries.iter().map(|e| e.status).collect();
        assert_eq!(statuses, vec![Some(Present), Some(OnLeave), Some(HalfDay), Some(Absent)]);
        assert_eq!(view.entries[0].check_in.as_deref(), Some("09:15"));
        assert_eq!(view.entries[0].duration, "08:30");
        assert_eq!(view.entries[3].check_in, None);
        assert_eq!(view.entries[3].duration, "-");
        // employee 9 is not on the roster
        assert_eq!(view.entries.len(), 4);
        assert_eq!(
            view.stats,
            DailyStats {
                present: 2,
                on_leave: 1,
                absent: 1
            }
        );
    }
}
