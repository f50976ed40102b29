pub mod attendance;
pub mod manual_payment;
pub mod payroll;
pub mod policy;
pub mod reporting;
pub mod summary;

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use tracing::instrument;

use crate::error::{CoreError, CoreResult};
use crate::model::attendance::{AttendanceInput, AttendanceRecord, DailyRoster, MonthlySummary};
use crate::model::employee::Employee;
use crate::model::manual_payment::{ManualPayment, ManualPaymentInput};
use crate::model::payroll::{PaymentStatus, PayrollCorrection, PayrollRecord};
use crate::model::period::Period;
use crate::store::memory::{
    InMemoryAttendanceStore, InMemoryManualPaymentStore, InMemoryPayrollStore, StaticRoster,
};
use crate::store::{AttendanceStore, ManualPaymentStore, PayrollStore, RosterSource};

use attendance::AttendanceLedger;
use manual_payment::ManualPaymentLedger;
use payroll::{CompensationPolicy, PayrollEngine};
use reporting::{EmployeeStatement, MonthlyTotals, ReportingFacade};
use summary::{DailyRosterView, MonthlyAggregator};

pub struct Stores {
    pub attendance: Arc<dyn AttendanceStore>,
    pub payroll: Arc<dyn PayrollStore>,
    pub payments: Arc<dyn ManualPaymentStore>,
    pub roster: Arc<dyn RosterSource>,
}

impl Stores {
    pub fn in_memory(roster: StaticRoster) -> Self {
        Self {
            attendance: Arc::new(InMemoryAttendanceStore::new()),
            payroll: Arc::new(InMemoryPayrollStore::new()),
            payments: Arc::new(InMemoryManualPaymentStore::new()),
            roster: Arc::new(roster),
        }
    }
}

pub struct PayrollSettings {
    pub compensation: Arc<dyn CompensationPolicy>,
    pub initial_status: PaymentStatus,
    pub timeout: Duration,
}

/// Entry point for every operation the HTTP layer exposes.
pub struct HrmCore {
    roster: Arc<dyn RosterSource>,
    attendance: AttendanceLedger,
    daily: DailyRosterView,
    monthly: MonthlyAggregator,
    payroll: PayrollEngine,
    payments: ManualPaymentLedger,
    reports: ReportingFacade,
    payroll_timeout: Duration,
}

impl HrmCore {
    pub fn new(stores: Stores, settings: PayrollSettings) -> Self {
        let attendance = AttendanceLedger::new(stores.attendance);
        Self {
            daily: DailyRosterView::new(attendance.clone()),
            monthly: MonthlyAggregator::new(attendance.clone()),
            attendance,
            payroll: PayrollEngine::new(
                stores.payroll.clone(),
                settings.compensation,
                settings.initial_status,
            ),
            payments: ManualPaymentLedger::new(stores.payments.clone()),
            reports: ReportingFacade::new(stores.payroll, stores.payments),
            roster: stores.roster,
            payroll_timeout: settings.timeout,
        }
    }

    async fn roster(&self) -> CoreResult<Vec<Employee>> {
        self.roster.list_employees().await
    }

    async fn employee(&self, employee_id: u64) -> CoreResult<Employee> {
        self.roster()
            .await?
            .into_iter()
            .find(|e| e.id == employee_id)
            .ok_or_else(|| CoreError::not_found(format!("employee {employee_id}")))
    }

    // ---------- attendance ----------

    #[instrument(skip(self, input))]
    pub async fn upsert_attendance(&self, input: AttendanceInput) -> CoreResult<AttendanceRecord> {
        let record = input.into_record()?;
        self.employee(record.employee_id).await?;
        self.attendance.upsert(record).await
    }

    #[instrument(skip(self))]
    pub async fn check_in(
        &self,
        employee_id: u64,
        date: NaiveDate,
        time: NaiveTime,
    ) -> CoreResult<AttendanceRecord> {
        self.employee(employee_id).await?;
        self.attendance.check_in(employee_id, date, time).await
    }

    #[instrument(skip(self))]
    pub async fn check_out(
        &self,
        employee_id: u64,
        date: NaiveDate,
        time: NaiveTime,
    ) -> CoreResult<AttendanceRecord> {
        self.attendance.check_out(employee_id, date, time).await
    }

    pub async fn daily_roster(&self, date: NaiveDate) -> CoreResult<DailyRoster> {
        let roster = self.roster().await?;
        self.daily.build(date, &roster).await
    }

    pub async fn monthly_summary(
        &self,
        employee_id: u64,
        year: i32,
        month: u32,
    ) -> CoreResult<MonthlySummary> {
        self.employee(employee_id).await?;
        self.monthly.build_summary(employee_id, year, month).await
    }

    pub async fn monthly_summaries(&self, year: i32, month: u32) -> CoreResult<Vec<MonthlySummary>> {
        let roster = self.roster().await?;
        self.monthly.build_all(&roster, year, month).await
    }

    // ---------- payroll ----------

    /// Roster fetch and generation share one deadline; nothing is written
    /// for the period if it passes.
    #[instrument(skip(self, period), fields(period = %period))]
    pub async fn generate_payroll(&self, period: Period) -> CoreResult<Vec<PayrollRecord>> {
        let run = async {
            let roster = self.roster().await?;
            self.payroll.generate_period(period, &roster).await
        };
        actix_web::rt::time::timeout(self.payroll_timeout, run)
            .await
            .map_err(|_| {
                tracing::error!(%period, "Payroll generation timed out");
                CoreError::Timeout(format!("payroll generation for {period}"))
            })?
    }

    pub async fn list_payroll(&self, period: Period) -> CoreResult<Vec<PayrollRecord>> {
        self.payroll.view_period(period).await
    }

    pub async fn payroll_record(&self, id: &str) -> CoreResult<PayrollRecord> {
        self.payroll.get(id).await
    }

    #[instrument(skip(self))]
    pub async fn mark_payroll_paid(&self, id: &str) -> CoreResult<PayrollRecord> {
        self.payroll.mark_paid(id).await
    }

    #[instrument(skip(self, change))]
    pub async fn correct_payroll(
        &self,
        id: &str,
        change: PayrollCorrection,
    ) -> CoreResult<PayrollRecord> {
        self.payroll.correct(id, change).await
    }

    // ---------- manual payments ----------

    #[instrument(skip(self, input))]
    pub async fn create_manual_payment(
        &self,
        input: ManualPaymentInput,
    ) -> CoreResult<ManualPayment> {
        if let Some(employee_id) = input.employee_id {
            self.employee(employee_id).await?;
        }
        self.payments.create(input).await
    }

    #[instrument(skip(self, input))]
    pub async fn update_manual_payment(
        &self,
        id: &str,
        input: ManualPaymentInput,
    ) -> CoreResult<ManualPayment> {
        if let Some(employee_id) = input.employee_id {
            self.employee(employee_id).await?;
        }
        self.payments.update(id, input).await
    }

    #[instrument(skip(self))]
    pub async fn delete_manual_payment(&self, id: &str) -> CoreResult<()> {
        self.payments.delete(id).await
    }

    pub async fn manual_payment(&self, id: &str) -> CoreResult<ManualPayment> {
        self.payments.get(id).await
    }

    pub async fn list_manual_payments(
        &self,
        period: Period,
        employee_id: Option<u64>,
    ) -> CoreResult<Vec<ManualPayment>> {
        self.payments.list_for_period(period, employee_id).await
    }

    // ---------- reports ----------

    pub async fn monthly_totals(&self, period: Period) -> CoreResult<MonthlyTotals> {
        self.reports.monthly_totals(period).await
    }

    pub async fn employee_statement(
        &self,
        employee_id: u64,
        period: Period,
    ) -> CoreResult<EmployeeStatement> {
        let employee = self.employee(employee_id).await?;
        self.reports.employee_statement(employee, period).await
    }
}
