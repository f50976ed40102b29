use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::model::period::Period;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum PaymentStatus {
    Pending,
    Paid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": "payroll-3-2024-07",
    "employee_id": 3,
    "period": "2024-07",
    "basic_salary": 53000.0,
    "allowances": 10600.0,
    "deductions": 5300.0,
    "net_salary": 58300.0,
    "status": "Paid"
}))]
pub struct PayrollRecord {
    pub id: String,
    pub employee_id: u64,

    #[schema(value_type = String, example = "2024-07")]
    pub period: Period,

    pub basic_salary: f64,
    pub allowances: f64,
    pub deductions: f64,
    pub net_salary: f64,
    pub status: PaymentStatus,
}

impl PayrollRecord {
    pub fn record_id(employee_id: u64, period: Period) -> String {
        format!("payroll-{employee_id}-{period}")
    }
}

pub fn net_salary(basic_salary: f64, allowances: f64, deductions: f64) -> f64 {
    basic_salary + allowances - deductions
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PayrollCorrection {
    #[schema(example = 52000.0)]
    pub basic_salary: Option<f64>,

    #[schema(example = 10400.0)]
    pub allowances: Option<f64>,

    #[schema(example = 5200.0)]
    pub deductions: Option<f64>,
}

impl PayrollCorrection {
    /// Overwrites the supplied components and recomputes the net.
    pub fn apply(&self, record: &mut PayrollRecord) {
        record.basic_salary = self.basic_salary.unwrap_or(record.basic_salary);
        record.allowances = self.allowances.unwrap_or(record.allowances);
        record.deductions = self.deductions.unwrap_or(record.deductions);
        record.net_salary = net_salary(record.basic_salary, record.allowances, record.deductions);
    }
}
