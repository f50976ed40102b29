use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::model::attendance::AttendanceRecord;
use crate::store::AttendanceStore;

/// Owns the (employee, date) → record map.
#[derive(Clone)]
pub struct AttendanceLedger {
    store: Arc<dyn AttendanceStore>,
}

impl AttendanceLedger {
    pub fn new(store: Arc<dyn AttendanceStore>) -> Self {
        Self { store }
    }

    /// Last writer wins for the (employee, date) key.
    pub async fn upsert(&self, record: AttendanceRecord) -> CoreResult<AttendanceRecord> {
        debug!(employee_id = record.employee_id, date = %record.date, status = %record.status, "Upserting attendance");
        self.store.upsert(record.clone()).await?;
        Ok(record)
    }

    /// Opens the day. A manual record without a check-in is taken over and
    /// marked Present.
    pub async fn check_in(
        &self,
        employee_id: u64,
        date: NaiveDate,
        time: NaiveTime,
    ) -> CoreResult<AttendanceRecord> {
        let record = self
            .store
            .check_in(employee_id, date, time)
            .await?
            .ok_or_else(|| CoreError::validation("Already checked in today"))?;
        debug!(employee_id, %date, %time, "Checked in");
        Ok(record)
    }

    pub async fn check_out(
        &self,
        employee_id: u64,
        date: NaiveDate,
        time: NaiveTime,
    ) -> CoreResult<AttendanceRecord> {
        let record = self
            .store
            .check_out(employee_id, date, time)
            .await?
            .ok_or_else(|| CoreError::validation("No active check-in found for today"))?;
        debug!(employee_id, %date, %time, "Checked out");
        Ok(record)
    }

    pub async fn get_for_date(&self, date: NaiveDate) -> CoreResult<Vec<AttendanceRecord>> {
        self.store.list_for_date(date).await
    }

    pub async fn get_for_employee_range(
        &self,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> CoreResult<Vec<AttendanceRecord>> {
        self.store.list_for_employee_range(employee_id, start, end).await
    }
}
