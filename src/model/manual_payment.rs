use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::error::CoreError;
use crate::model::payroll::PaymentStatus;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum PaymentType {
    Bonus,
    Reimbursement,
    Advance,
    Other,
}

/// A discretionary payment outside the payroll cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ManualPayment {
    pub id: String,
    pub employee_id: u64,
    pub amount: f64,

    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,

    pub payment_type: PaymentType,
    pub notes: Option<String>,
    pub status: PaymentStatus,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({
    "employee_id": 1,
    "amount": 5000.0,
    "date": "2024-07-15",
    "payment_type": "Bonus",
    "notes": "Q2 Performance Bonus"
}))]
pub struct ManualPaymentInput {
    pub employee_id: Option<u64>,
    pub amount: f64,

    #[schema(value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,

    pub payment_type: PaymentType,
    pub notes: Option<String>,

    /// Defaults to `Paid`.
    pub status: Option<PaymentStatus>,
}

impl ManualPaymentInput {
    /// Checks the write-time rules and builds the stored payment under `id`.
    pub fn into_payment(self, id: String) -> Result<ManualPayment, CoreError> {
        let employee_id = self
            .employee_id
            .ok_or_else(|| CoreError::validation("employee_id is required"))?;
        let date = self
            .date
            .ok_or_else(|| CoreError::validation("date is required"))?;
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(CoreError::validation("amount must be greater than zero"));
        }

        let notes = self
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        Ok(ManualPayment {
            id,
            employee_id,
            amount: self.amount,
            date,
            payment_type: self.payment_type,
            notes,
            status: self.status.unwrap_or(PaymentStatus::Paid),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(amount: f64) -> ManualPaymentInput {
        ManualPaymentInput {
            employee_id: Some(1),
            amount,
            date: NaiveDate::from_ymd_opt(2024, 7, 15),
            payment_type: PaymentType::Bonus,
            notes: Some("  ".into()),
            status: None,
        }
    }

    #[test]
    fn amount_must_be_positive() {
        for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                input(bad).into_payment("x".into()),
                Err(CoreError::Validation(_))
            ));
        }
        let ok = input(0.01).into_payment("x".into()).unwrap();
        assert_eq!(ok.amount, 0.01);
        assert_eq!(ok.status, PaymentStatus::Paid);
        assert_eq!(ok.notes, None);
    }

    #[test]
    fn employee_and_date_are_required() {
        let mut missing_employee = input(10.0);
        missing_employee.employee_id = None;
        assert!(missing_employee.into_payment("x".into()).is_err());

        let mut missing_date = input(10.0);
        missing_date.date = None;
        assert!(missing_date.into_payment("x".into()).is_err());
    }
}
