//! Storage seams. Each ledger owns its records behind one of these traits so
//! the computation code never touches a concrete database.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

use crate::error::CoreResult;
use crate::model::attendance::AttendanceRecord;
use crate::model::employee::Employee;
use crate::model::manual_payment::ManualPayment;
use crate::model::payroll::{PayrollCorrection, PayrollRecord};
use crate::model::period::Period;

pub mod memory;
pub mod mysql;

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Insert or replace the record for (employee_id, date).
    async fn upsert(&self, record: AttendanceRecord) -> CoreResult<()>;

    /// Marks the day Present with `time` as check-in, creating the record if
    /// needed. `None` if the day already has a check-in. Check and write are
    /// one step.
    async fn check_in(
        &self,
        employee_id: u64,
        date: NaiveDate,
        time: NaiveTime,
    ) -> CoreResult<Option<AttendanceRecord>>;

    /// Sets the check-out of a day that has a check-in and no check-out;
    /// `None` otherwise. Only the check-out column is written.
    async fn check_out(
        &self,
        employee_id: u64,
        date: NaiveDate,
        time: NaiveTime,
    ) -> CoreResult<Option<AttendanceRecord>>;

    async fn list_for_date(&self, date: NaiveDate) -> CoreResult<Vec<AttendanceRecord>>;

    /// Inclusive range, ascending by date.
    async fn list_for_employee_range(
        &self,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> CoreResult<Vec<AttendanceRecord>>;
}

#[async_trait]
pub trait PayrollStore: Send + Sync {
    async fn period_exists(&self, period: Period) -> CoreResult<bool>;

    /// Writes every record of a period as one unit. Fails with
    /// `AlreadyGenerated` if the period was generated before, in which case
    /// nothing is written.
    async fn insert_period(&self, period: Period, records: Vec<PayrollRecord>) -> CoreResult<()>;

    /// Records of a period, ascending by employee id.
    async fn list_period(&self, period: Period) -> CoreResult<Vec<PayrollRecord>>;

    async fn get(&self, id: &str) -> CoreResult<Option<PayrollRecord>>;

    /// Sets the status to Paid and returns the record; `NotFound` if the id
    /// is unknown.
    async fn mark_paid(&self, id: &str) -> CoreResult<PayrollRecord>;

    /// Applies a correction to the current record under the record's lock.
    async fn correct(&self, id: &str, change: &PayrollCorrection) -> CoreResult<PayrollRecord>;
}

#[async_trait]
pub trait ManualPaymentStore: Send + Sync {
    async fn insert(&self, payment: ManualPayment) -> CoreResult<()>;

    /// Replaces an existing payment; `NotFound` if the id is unknown. With
    /// `keep_status` the stored status survives the replacement.
    async fn update(&self, payment: ManualPayment, keep_status: bool) -> CoreResult<ManualPayment>;

    /// Hard delete; `NotFound` if the id is unknown.
    async fn delete(&self, id: &str) -> CoreResult<ManualPayment>;

    async fn get(&self, id: &str) -> CoreResult<Option<ManualPayment>>;

    /// Payments dated inside [start, end], newest first.
    async fn list_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        employee_id: Option<u64>,
    ) -> CoreResult<Vec<ManualPayment>>;
}

/// The employee directory this service reads its roster from.
#[async_trait]
pub trait RosterSource: Send + Sync {
    async fn list_employees(&self) -> CoreResult<Vec<Employee>>;
}
