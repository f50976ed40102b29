//! In-process stores. Used when no database is configured, and as the test
//! doubles for the services.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::{Mutex, RwLock};

use anyhow::Context;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

use crate::error::{CoreError, CoreResult};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::employee::Employee;
use crate::model::manual_payment::ManualPayment;
use crate::model::payroll::{PaymentStatus, PayrollCorrection, PayrollRecord};
use crate::model::period::Period;
use crate::store::{AttendanceStore, ManualPaymentStore, PayrollStore, RosterSource};

fn poisoned(name: &str) -> CoreError {
    CoreError::Storage(format!("{name} lock poisoned"))
}

#[derive(Default)]
pub struct InMemoryAttendanceStore {
    records: RwLock<BTreeMap<(u64, NaiveDate), AttendanceRecord>>,
}

impl InMemoryAttendanceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttendanceStore for InMemoryAttendanceStore {
    async fn upsert(&self, record: AttendanceRecord) -> CoreResult<()> {
        let mut records = self.records.write().map_err(|_| poisoned("attendance"))?;
        records.insert(record.key(), record);
        Ok(())
    }

    async fn check_in(
        &self,
        employee_id: u64,
        date: NaiveDate,
        time: NaiveTime,
    ) -> CoreResult<Option<AttendanceRecord>> {
        let mut records = self.records.write().map_err(|_| poisoned("attendance"))?;
        let record = records
            .entry((employee_id, date))
            .or_insert_with(|| AttendanceRecord {
                employee_id,
                date,
                check_in: None,
                check_out: None,
                status: AttendanceStatus::Present,
            });
        if record.check_in.is_some() {
            return Ok(None);
        }
        record.check_in = Some(time);
        record.status = AttendanceStatus::Present;
        Ok(Some(record.clone()))
    }

    async fn check_out(
        &self,
        employee_id: u64,
        date: NaiveDate,
        time: NaiveTime,
    ) -> CoreResult<Option<AttendanceRecord>> {
        let mut records = self.records.write().map_err(|_| poisoned("attendance"))?;
        match records.get_mut(&(employee_id, date)) {
            Some(record) if record.check_in.is_some() && record.check_out.is_none() => {
                record.check_out = Some(time);
                Ok(Some(record.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn list_for_date(&self, date: NaiveDate) -> CoreResult<Vec<AttendanceRecord>> {
        let records = self.records.read().map_err(|_| poisoned("attendance"))?;
        Ok(records
            .values()
            .filter(|r| r.date == date)
            .cloned()
            .collect())
    }

    async fn list_for_employee_range(
        &self,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> CoreResult<Vec<AttendanceRecord>> {
        if start > end {
            return Ok(Vec::new());
        }
        let records = self.records.read().map_err(|_| poisoned("attendance"))?;
        // keys sort by employee first, so one employee's days are contiguous
        Ok(records
            .range((employee_id, start)..=(employee_id, end))
            .map(|(_, r)| r.clone())
            .collect())
    }
}

#[derive(Default)]
struct PayrollState {
    generated: BTreeSet<Period>,
    records: BTreeMap<String, PayrollRecord>,
}

#[derive(Default)]
pub struct InMemoryPayrollStore {
    state: Mutex<PayrollState>,
}

impl InMemoryPayrollStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PayrollStore for InMemoryPayrollStore {
    async fn period_exists(&self, period: Period) -> CoreResult<bool> {
        let state = self.state.lock().map_err(|_| poisoned("payroll"))?;
        Ok(state.generated.contains(&period)
            || state.records.values().any(|r| r.period == period))
    }

    async fn insert_period(&self, period: Period, records: Vec<PayrollRecord>) -> CoreResult<()> {
        // check and insert under the same guard
        let mut state = self.state.lock().map_err(|_| poisoned("payroll"))?;

        if state.generated.contains(&period) || state.records.values().any(|r| r.period == period)
        {
            return Err(CoreError::AlreadyGenerated { period });
        }
        if records.iter().any(|r| r.period != period) {
            return Err(CoreError::validation(format!(
                "batch for {period} contains records of another period"
            )));
        }
        let unique: BTreeSet<&str> = records.iter().map(|r| r.id.as_str()).collect();
        if unique.len() != records.len() || unique.iter().any(|id| state.records.contains_key(*id)) {
            return Err(CoreError::ConcurrencyConflict(format!(
                "duplicate payroll record id in batch for {period}"
            )));
        }

        state.generated.insert(period);
        for record in records {
            state.records.insert(record.id.clone(), record);
        }
        Ok(())
    }

    async fn list_period(&self, period: Period) -> CoreResult<Vec<PayrollRecord>> {
        let state = self.state.lock().map_err(|_| poisoned("payroll"))?;
        let mut records: Vec<PayrollRecord> = state
            .records
            .values()
            .filter(|r| r.period == period)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.employee_id);
        Ok(records)
    }

    async fn get(&self, id: &str) -> CoreResult<Option<PayrollRecord>> {
        let state = self.state.lock().map_err(|_| poisoned("payroll"))?;
        Ok(state.records.get(id).cloned())
    }

    async fn mark_paid(&self, id: &str) -> CoreResult<PayrollRecord> {
        let mut state = self.state.lock().map_err(|_| poisoned("payroll"))?;
        let record = state
            .records
            .get_mut(id)
            .ok_or_else(|| CoreError::not_found(format!("payroll record {id}")))?;
        record.status = PaymentStatus::Paid;
        Ok(record.clone())
    }

    async fn correct(&self, id: &str, change: &PayrollCorrection) -> CoreResult<PayrollRecord> {
        let mut state = self.state.lock().map_err(|_| poisoned("payroll"))?;
        let record = state
            .records
            .get_mut(id)
            .ok_or_else(|| CoreError::not_found(format!("payroll record {id}")))?;
        change.apply(record);
        Ok(record.clone())
    }
}

#[derive(Default)]
pub struct InMemoryManualPaymentStore {
    payments: RwLock<HashMap<String, ManualPayment>>,
}

impl InMemoryManualPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ManualPaymentStore for InMemoryManualPaymentStore {
    async fn insert(&self, payment: ManualPayment) -> CoreResult<()> {
        let mut payments = self.payments.write().map_err(|_| poisoned("manual payments"))?;
        if payments.contains_key(&payment.id) {
            return Err(CoreError::ConcurrencyConflict(format!(
                "manual payment {} already exists",
                payment.id
            )));
        }
        payments.insert(payment.id.clone(), payment);
        Ok(())
    }

    async fn update(&self, mut payment: ManualPayment, keep_status: bool) -> CoreResult<ManualPayment> {
        let mut payments = self.payments.write().map_err(|_| poisoned("manual payments"))?;
        let existing = payments
            .get_mut(&payment.id)
            .ok_or_else(|| CoreError::not_found(format!("manual payment {}", payment.id)))?;
        if keep_status {
            payment.status = existing.status;
        }
        *existing = payment.clone();
        Ok(payment)
    }

    async fn delete(&self, id: &str) -> CoreResult<ManualPayment> {
        let mut payments = self.payments.write().map_err(|_| poisoned("manual payments"))?;
        payments
            .remove(id)
            .ok_or_else(|| CoreError::not_found(format!("manual payment {id}")))
    }

    async fn get(&self, id: &str) -> CoreResult<Option<ManualPayment>> {
        let payments = self.payments.read().map_err(|_| poisoned("manual payments"))?;
        Ok(payments.get(id).cloned())
    }

    async fn list_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        employee_id: Option<u64>,
    ) -> CoreResult<Vec<ManualPayment>> {
        let payments = self.payments.read().map_err(|_| poisoned("manual payments"))?;
        let mut found: Vec<ManualPayment> = payments
            .values()
            .filter(|p| p.date >= start && p.date <= end)
            .filter(|p| employee_id.is_none_or(|id| p.employee_id == id))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        Ok(found)
    }
}

/// Fixed roster, typically loaded from a JSON array of employees.
#[derive(Debug, Clone, Default)]
pub struct StaticRoster {
    employees: Vec<Employee>,
}

impl StaticRoster {
    pub fn new(mut employees: Vec<Employee>) -> Self {
        employees.sort_by_key(|e| e.id);
        employees.dedup_by_key(|e| e.id);
        Self { employees }
    }

    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading roster file {}", path.display()))?;
        let employees: Vec<Employee> = serde_json::from_str(&raw)
            .with_context(|| format!("parsing roster file {}", path.display()))?;
        Ok(Self::new(employees))
    }
}

#[async_trait]
impl RosterSource for StaticRoster {
    async fn list_employees(&self) -> CoreResult<Vec<Employee>> {
        Ok(self.employees.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::AttendanceStatus;
    use crate::model::payroll::PaymentStatus;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
    }

    fn record(employee_id: u64, day: u32, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            employee_id,
            date: date(day),
            check_in: None,
            check_out: None,
            status,
        }
    }

    fn payroll(employee_id: u64, period: Period) -> PayrollRecord {
        PayrollRecord {
            id: PayrollRecord::record_id(employee_id, period),
            employee_id,
            period,
            basic_salary: 100.0,
            allowances: 20.0,
            deductions: 10.0,
            net_salary: 110.0,
            status: PaymentStatus::Paid,
        }
    }

    #[actix_web::test]
    async fn employee_range_scan_is_bounded_by_employee_and_dates() {
        let store = InMemoryAttendanceStore::new();
        for day in 1..=10 {
            store.upsert(record(1, day, AttendanceStatus::Present)).await.unwrap();
            store.upsert(record(2, day, AttendanceStatus::Absent)).await.unwrap();
        }

        let found = store.list_for_employee_range(1, date(3), date(5)).await.unwrap();
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|r| r.employee_id == 1));
        assert_eq!(found[0].date, date(3));
        assert_eq!(found[2].date, date(5));

        assert!(store.list_for_employee_range(1, date(5), date(3)).await.unwrap().is_empty());
        assert_eq!(store.list_for_date(date(4)).await.unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn second_batch_for_a_period_writes_nothing() {
        let store = InMemoryPayrollStore::new();
        let period: Period = "2024-07".parse().unwrap();
        store
            .insert_period(period, vec![payroll(1, period), payroll(2, period)])
            .await
            .unwrap();

        let err = store
            .insert_period(period, vec![payroll(3, period)])
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::AlreadyGenerated { .. }));
        assert_eq!(store.list_period(period).await.unwrap().len(), 2);
        assert!(store.get(&PayrollRecord::record_id(3, period)).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn rejected_batch_does_not_consume_the_period() {
        let store = InMemoryPayrollStore::new();
        let july: Period = "2024-07".parse().unwrap();
        let june: Period = "2024-06".parse().unwrap();

        let mixed = vec![payroll(1, july), payroll(2, june)];
        assert!(store.insert_period(july, mixed).await.is_err());
        assert!(!store.period_exists(july).await.unwrap());
        store.insert_period(july, vec![payroll(1, july)]).await.unwrap();
    }

    #[actix_web::test]
    async fn payments_filter_by_window_and_employee() {
        let store = InMemoryManualPaymentStore::new();
        for (id, employee_id, day) in [("a", 1, 1), ("b", 2, 15), ("c", 1, 31)] {
            store
                .insert(ManualPayment {
                    id: id.into(),
                    employee_id,
                    amount: 10.0,
                    date: date(day),
                    payment_type: crate::model::manual_payment::PaymentType::Bonus,
                    notes: None,
                    status: PaymentStatus::Paid,
                })
                .await
                .unwrap();
        }

        let all = store.list_between(date(1), date(31), None).await.unwrap();
        assert_eq!(all.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(), ["c", "b", "a"]);
        let one = store.list_between(date(1), date(31), Some(1)).await.unwrap();
        assert_eq!(one.len(), 2);

        store.delete("b").await.unwrap();
        assert!(matches!(store.delete("b").await, Err(CoreError::NotFound(_))));
    }
}
