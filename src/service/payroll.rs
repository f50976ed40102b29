use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{CoreError, CoreResult};
use crate::model::employee::Employee;
use crate::model::payroll::{PaymentStatus, PayrollCorrection, PayrollRecord, net_salary};
use crate::model::period::Period;
use crate::store::PayrollStore;

pub const ALLOWANCE_RATE: f64 = 0.20;
pub const DEDUCTION_RATE: f64 = 0.10;

/// Base salary source. Must be a pure function of the employee record.
pub trait CompensationPolicy: Send + Sync {
    fn base_salary_for(&self, employee: &Employee) -> f64;
}

/// `base + id * step`; the placeholder table until real compensation data exists.
#[derive(Debug, Clone, Copy)]
pub struct LinearCompensation {
    pub base: f64,
    pub step: f64,
}

impl Default for LinearCompensation {
    fn default() -> Self {
        Self {
            base: 50_000.0,
            step: 1_000.0,
        }
    }
}

impl CompensationPolicy for LinearCompensation {
    fn base_salary_for(&self, employee: &Employee) -> f64 {
        self.base + employee.id as f64 * self.step
    }
}

#[derive(Clone)]
pub struct PayrollEngine {
    store: Arc<dyn PayrollStore>,
    compensation: Arc<dyn CompensationPolicy>,
    initial_status: PaymentStatus,
}

impl PayrollEngine {
    pub fn new(
        store: Arc<dyn PayrollStore>,
        compensation: Arc<dyn CompensationPolicy>,
        initial_status: PaymentStatus,
    ) -> Self {
        Self {
            store,
            compensation,
            initial_status,
        }
    }

    fn compute(&self, employee: &Employee, period: Period) -> CoreResult<PayrollRecord> {
        let basic_salary = self.compensation.base_salary_for(employee);
        if !basic_salary.is_finite() || basic_salary < 0.0 {
            return Err(CoreError::validation(format!(
                "invalid base salary {basic_salary} for employee {}",
                employee.id
            )));
        }
        let allowances = basic_salary * ALLOWANCE_RATE;
        let deductions = basic_salary * DEDUCTION_RATE;

        Ok(PayrollRecord {
            id: PayrollRecord::record_id(employee.id, period),
            employee_id: employee.id,
            period,
            basic_salary,
            allowances,
            deductions,
            net_salary: net_salary(basic_salary, allowances, deductions),
            status: self.initial_status,
        })
    }

    /// Generates one record per roster employee, all or nothing.
    pub async fn generate_period(
        &self,
        period: Period,
        roster: &[Employee],
    ) -> CoreResult<Vec<PayrollRecord>> {
        if self.store.period_exists(period).await? {
            info!(%period, "Payroll already generated");
            return Err(CoreError::AlreadyGenerated { period });
        }
        if roster.is_empty() {
            return Err(CoreError::validation(format!(
                "no employees to generate payroll for {period}"
            )));
        }

        let records = roster
            .iter()
            .map(|employee| self.compute(employee, period))
            .collect::<CoreResult<Vec<_>>>()?;

        // the store re-checks the period under its own guard
        self.store.insert_period(period, records.clone()).await?;

        info!(%period, employees = records.len(), "Payroll generated");
        Ok(records)
    }

    pub async fn view_period(&self, period: Period) -> CoreResult<Vec<PayrollRecord>> {
        self.store.list_period(period).await
    }

    pub async fn get(&self, id: &str) -> CoreResult<PayrollRecord> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("payroll record {id}")))
    }

    /// Pending → Paid. Already paid records are returned unchanged.
    pub async fn mark_paid(&self, id: &str) -> CoreResult<PayrollRecord> {
        let record = self.store.mark_paid(id).await?;
        info!(payroll_id = id, "Payroll marked paid");
        Ok(record)
    }

    /// Manual correction of a generated record; the net is recomputed.
    pub async fn correct(&self, id: &str, change: PayrollCorrection) -> CoreResult<PayrollRecord> {
        for (name, value) in [
            ("basic_salary", change.basic_salary),
            ("allowances", change.allowances),
            ("deductions", change.deductions),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(CoreError::validation(format!("{name} must be zero or more")));
                }
            }
        }

        let record = self.store.correct(id, &change).await?;
        warn!(
            payroll_id = id,
            basic_salary = record.basic_salary,
            allowances = record.allowances,
            deductions = record.deductions,
            "Payroll record corrected"
        );
        Ok(record)
    }
}
