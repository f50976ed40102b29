use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::model::manual_payment::{ManualPayment, ManualPaymentInput};
use crate::model::period::Period;
use crate::store::ManualPaymentStore;

#[derive(Clone)]
pub struct ManualPaymentLedger {
    store: Arc<dyn ManualPaymentStore>,
}

impl ManualPaymentLedger {
    pub fn new(store: Arc<dyn ManualPaymentStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, input: ManualPaymentInput) -> CoreResult<ManualPayment> {
        let payment = input.into_payment(Uuid::new_v4().to_string())?;
        self.store.insert(payment.clone()).await?;
        info!(
            payment_id = %payment.id,
            employee_id = payment.employee_id,
            amount = payment.amount,
            payment_type = %payment.payment_type,
            "Manual payment created"
        );
        Ok(payment)
    }

    /// Replaces the payment. Without a status in the input the stored
    /// status is kept.
    pub async fn update(&self, id: &str, input: ManualPaymentInput) -> CoreResult<ManualPayment> {
        let keep_status = input.status.is_none();
        let payment = input.into_payment(id.to_string())?;
        let payment = self.store.update(payment, keep_status).await?;
        info!(payment_id = id, amount = payment.amount, status = %payment.status, "Manual payment updated");
        Ok(payment)
    }

    /// Hard delete. The log line is the only trace left of the payment.
    pub async fn delete(&self, id: &str) -> CoreResult<()> {
        let removed = self.store.delete(id).await?;
        info!(
            payment_id = id,
            employee_id = removed.employee_id,
            amount = removed.amount,
            date = %removed.date,
            payment_type = %removed.payment_type,
            "Manual payment deleted"
        );
        Ok(())
    }

    pub async fn get(&self, id: &str) -> CoreResult<ManualPayment> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("manual payment {id}")))
    }

    pub async fn list_for_period(
        &self,
        period: Period,
        employee_id: Option<u64>,
    ) -> CoreResult<Vec<ManualPayment>> {
        let (start, end) = period.bounds();
        self.store.list_between(start, end, employee_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::manual_payment::PaymentType;
    use crate::model::payroll::PaymentStatus;
    use crate::store::memory::InMemoryManualPaymentStore;
    use chrono::NaiveDate;

    fn ledger() -> ManualPaymentLedger {
        ManualPaymentLedger::new(Arc::new(InMemoryManualPaymentStore::new()))
    }

    fn input(amount: f64, day: u32) -> ManualPaymentInput {
        ManualPaymentInput {
            employee_id: Some(2),
            amount,
            date: NaiveDate::from_ymd_opt(2024, 7, day),
            payment_type: PaymentType::Reimbursement,
            notes: Some("Travel expenses for client meeting".into()),
            status: None,
        }
    }

    #[actix_web::test]
    async fn non_positive_amounts_are_rejected() {
        let ledger = ledger();
        assert!(matches!(ledger.create(input(0.0, 1)).await, Err(CoreError::Validation(_))));
        assert!(matches!(ledger.create(input(-5.0, 1)).await, Err(CoreError::Validation(_))));
        let ok = ledger.create(input(0.01, 1)).await.unwrap();
        assert_eq!(ledger.get(&ok.id).await.unwrap(), ok);
    }

    #[actix_web::test]
    async fn update_replaces_and_keeps_the_id() {
        let ledger = ledger();
        let created = ledger.create(input(750.0, 20)).await.unwrap();

        let mut change = input(800.0, 21);
        change.status = Some(PaymentStatus::Pending);
        let updated = ledger.update(&created.id, change).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(ledger.get(&created.id).await.unwrap().amount, 800.0);

        assert!(matches!(
            ledger.update(&created.id, input(-1.0, 21)).await,
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            ledger.update("missing", input(1.0, 21)).await,
            Err(CoreError::NotFound(_))
        ));
    }

    #[actix_web::test]
    async fn update_without_status_keeps_the_stored_one() {
        let ledger = ledger();
        let mut pending = input(500.0, 3);
        pending.status = Some(PaymentStatus::Pending);
        let created = ledger.create(pending).await.unwrap();

        let updated = ledger.update(&created.id, input(550.0, 4)).await.unwrap();
        assert_eq!(updated.status, PaymentStatus::Pending);
        assert_eq!(updated.amount, 550.0);
        assert_eq!(ledger.get(&created.id).await.unwrap(), updated);

        let mut paid = input(550.0, 4);
        paid.status = Some(PaymentStatus::Paid);
        let updated = ledger.update(&created.id, paid).await.unwrap();
        assert_eq!(updated.status, PaymentStatus::Paid);
    }

    #[actix_web::test]
    async fn delete_is_permanent() {
        let ledger = ledger();
        let created = ledger.create(input(10.0, 5)).await.unwrap();
        ledger.delete(&created.id).await.unwrap();
        assert!(matches!(ledger.get(&created.id).await, Err(CoreError::NotFound(_))));
        assert!(matches!(ledger.delete(&created.id).await, Err(CoreError::NotFound(_))));
    }

    #[actix_web::test]
    async fn period_listing_uses_payment_dates() {
        let ledger = ledger();
        ledger.create(input(10.0, 1)).await.unwrap();
        ledger.create(input(20.0, 31)).await.unwrap();
        let mut june = input(30.0, 1);
        june.date = NaiveDate::from_ymd_opt(2024, 6, 30);
        ledger.create(june).await.unwrap();

        let july = ledger.list_for_period("2024-07".parse().unwrap(), None).await.unwrap();
        assert_eq!(july.len(), 2);
        assert_eq!(july[0].amount, 20.0);
        assert!(ledger
            .list_for_period("2024-07".parse().unwrap(), Some(99))
            .await
            .unwrap()
            .is_empty());
    }
}
