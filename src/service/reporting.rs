use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::error::CoreResult;
use crate::model::employee::Employee;
use crate::model::manual_payment::ManualPayment;
use crate::model::payroll::PayrollRecord;
use crate::model::period::Period;
use crate::store::{ManualPaymentStore, PayrollStore};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MonthlyTotals {
    #[schema(value_type = String, example = "2024-07")]
    pub period: Period,
    /// Sum of net salaries generated for the period.
    pub payroll_net: f64,
    /// Sum of manual payments dated in the period.
    pub manual_total: f64,
    pub employees_paid: usize,
}

/// Salary slip: payroll plus the manual payments of one employee and period.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EmployeeStatement {
    pub employee: Employee,

    #[schema(value_type = String, example = "2024-07")]
    pub period: Period,

    pub payroll: Option<PayrollRecord>,
    pub manual_payments: Vec<ManualPayment>,
    pub manual_total: f64,
    /// Net salary (zero when not generated) plus manual payments.
    pub total: f64,
}

/// Read-only aggregation over the payroll and manual payment ledgers.
#[derive(Clone)]
pub struct ReportingFacade {
    payroll: Arc<dyn PayrollStore>,
    payments: Arc<dyn ManualPaymentStore>,
}

impl ReportingFacade {
    pub fn new(payroll: Arc<dyn PayrollStore>, payments: Arc<dyn ManualPaymentStore>) -> Self {
        Self { payroll, payments }
    }

    pub async fn monthly_totals(&self, period: Period) -> CoreResult<MonthlyTotals> {
        let records = self.payroll.list_period(period).await?;
        let (start, end) = period.bounds();
        let payments = self.payments.list_between(start, end, None).await?;

        Ok(MonthlyTotals {
            period,
            payroll_net: records.iter().map(|r| r.net_salary).sum(),
            manual_total: payments.iter().map(|p| p.amount).sum(),
            employees_paid: records.len(),
        })
    }

    pub async fn employee_statement(
        &self,
        employee: Employee,
        period: Period,
    ) -> CoreResult<EmployeeStatement> {
        let payroll = self
            .payroll
            .get(&PayrollRecord::record_id(employee.id, period))
            .await?;
        let (start, end) = period.bounds();
        let manual_payments = self.payments.list_between(start, end, Some(employee.id)).await?;
        let manual_total: f64 = manual_payments.iter().map(|p| p.amount).sum();
        let net = payroll.as_ref().map_or(0.0, |p| p.net_salary);

        Ok(EmployeeStatement {
            employee,
            period,
            payroll,
            manual_payments,
            manual_total,
            total: net + manual_total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::manual_payment::PaymentType;
    use crate::model::payroll::PaymentStatus;
    use crate::store::memory::{InMemoryManualPaymentStore, InMemoryPayrollStore};
    use chrono::NaiveDate;

    fn record(employee_id: u64, period: Period, net: f64) -> PayrollRecord {
        PayrollRecord {
            id: PayrollRecord::record_id(employee_id, period),
            employee_id,
            period,
            basic_salary: net / 1.1,
            allowances: net / 1.1 * 0.2,
            deductions: net / 1.1 * 0.1,
            net_salary: net,
            status: PaymentStatus::Paid,
        }
    }

    fn payment(id: &str, employee_id: u64, amount: f64, date: NaiveDate) -> ManualPayment {
        ManualPayment {
            id: id.into(),
            employee_id,
            amount,
            date,
            payment_type: PaymentType::Bonus,
            notes: None,
            status: PaymentStatus::Paid,
        }
    }

    async fn facade() -> ReportingFacade {
        let july: Period = "2024-07".parse().unwrap();
        let payroll = Arc::new(InMemoryPayrollStore::new());
        payroll
            .insert_period(july, vec![record(1, july, 1000.0), record(2, july, 2000.0)])
            .await
            .unwrap();

        let payments = Arc::new(InMemoryManualPaymentStore::new());
        for p in [
            payment("a", 1, 5000.0, NaiveDate::from_ymd_opt(2024, 7, 15).unwrap()),
            payment("b", 2, 1250.0, NaiveDate::from_ymd_opt(2024, 7, 10).unwrap()),
            payment("c", 2, 750.0, NaiveDate::from_ymd_opt(2024, 6, 20).unwrap()),
        ] {
            payments.insert(p).await.unwrap();
        }
        ReportingFacade::new(payroll, payments)
    }

    #[actix_web::test]
    async fn totals_combine_both_ledgers() {
        let totals = facade().await.monthly_totals("2024-07".parse().unwrap()).await.unwrap();
        assert_eq!(totals.payroll_net, 3000.0);
        assert_eq!(totals.manual_total, 6250.0);
        assert_eq!(totals.employees_paid, 2);
    }

    #[actix_web::test]
    async fn totals_of_an_ungenerated_period() {
        let totals = facade().await.monthly_totals("2024-06".parse().unwrap()).await.unwrap();
        assert_eq!(totals.payroll_net, 0.0);
        assert_eq!(totals.manual_total, 750.0);
        assert_eq!(totals.employees_paid, 0);
    }

    #[actix_web::test]
    async fn statement_keeps_manual_payments_out_of_net() {
        let employee = Employee {
            id: 2,
            department: "Sales".into(),
            join_date: NaiveDate::from_ymd_opt(2021, 5, 1).unwrap(),
        };
        let statement = facade()
            .await
            .employee_statement(employee, "2024-07".parse().unwrap())
            .await
            .unwrap();
        assert_eq!(statement.payroll.as_ref().unwrap().net_salary, 2000.0);
        assert_eq!(statement.manual_payments.len(), 1);
        assert_eq!(statement.manual_total, 1250.0);
        assert_eq!(statement.total, 3250.0);
    }
}
