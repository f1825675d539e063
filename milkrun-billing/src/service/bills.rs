use chrono::Utc;
use milkrun_core::{CoreResult, OwnerId};
use milkrun_shared::models::SettlementRecord;
use milkrun_shared::Period;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::LedgerService;
use crate::reconciliation::{reconcile, BillInputs, BillStatus};
use crate::settlement::{apply_payment, PaymentReceipt};
use crate::statement::CustomerStatement;
use crate::summary::{BillView, MonthlySummary};

/// One row of the bill board
#[derive(Debug, Clone, Serialize)]
pub struct BillLine {
    pub customer_id: Uuid,
    pub customer_name: String,
    pub phone: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub delivered_days: u32,
    pub bill: BillStatus,
}

impl From<CustomerStatement> for BillLine {
    fn from(statement: CustomerStatement) -> Self {
        let customer = statement.customer;
        Self {
            customer_id: customer.id,
            customer_name: customer.name,
            phone: customer.phone,
            quantity: customer.quantity,
            price: customer.price,
            delivered_days: statement.calendar.total_delivered,
            bill: statement.bill,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRequest {
    pub customer_name: String,
    pub month: u32,
    pub year: i32,
    pub amount: Decimal,
}

impl LedgerService {
    pub(crate) async fn statements(&self, owner: &OwnerId, period: Period) -> CoreResult<Vec<CustomerStatement>> {
        let customers = self.store.list_customers(owner).await?;
        let facts = self.load_facts(owner, period).await?;
        Ok(facts.statements(&self.generator(), &customers))
    }

    pub async fn bill_board(&self, owner: &OwnerId, period: Period, view: BillView) -> CoreResult<Vec<BillLine>> {
        Ok(self
            .statements(owner, period)
            .await?
            .into_iter()
            .filter(|s| view.matches(&s.bill))
            .map(BillLine::from)
            .collect())
    }

    /// Stored settlement snapshots for a month, as written at payment time
    pub async fn list_settlements(&self, owner: &OwnerId, period: Period) -> CoreResult<Vec<SettlementRecord>> {
        Ok(self.store.list_settlements(owner, period).await?)
    }

    /// Pay part or all of a customer's bill. The bill is recomputed from the
    /// log first, so the amount is checked against what is owed right now.
    pub async fn record_payment(&self, owner: &OwnerId, request: PaymentRequest) -> CoreResult<PaymentReceipt> {
        let period = self.resolve_period(Some(request.month), Some(request.year))?;
        let customer = self.customer_by_name(owner, request.customer_name.trim()).await?;
        let facts = self.load_facts(owner, period).await?;
        let statement = facts.statement(&self.generator(), &customer);
        let existing = facts.settlement_for(&customer.name);

        let record = apply_payment(
            owner,
            &customer.name,
            period,
            &statement.bill,
            existing,
            request.amount,
            Utc::now(),
        )
        .inspect_err(|e| {
            warn!(
                "Rejected payment of {} from {} for {}/{}: {}",
                request.amount,
                customer.name,
                period.month(),
                period.year(),
                e
            )
        })?;

        let settlement = self.store.upsert_settlement(&record).await?;
        let inputs = BillInputs::for_customer(
            &customer,
            statement.calendar.total_delivered,
            facts.extras.period_total(&customer.name),
        );
        let bill = reconcile(&inputs, Some(&settlement));

        info!(
            "Recorded payment of {} from {} for {}/{}, remaining {}",
            request.amount,
            customer.name,
            period.month(),
            period.year(),
            bill.remaining
        );
        Ok(PaymentReceipt { settlement, bill })
    }

    pub async fn summary(&self, owner: &OwnerId, period: Period) -> CoreResult<MonthlySummary> {
        let statements = self.statements(owner, period).await?;
        Ok(MonthlySummary::from_statements(period, &statements))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::ExtraSaleInput;
    use super::*;
    use milkrun_core::repository::{DeliveryRepository, ExtraSaleRepository};
    use milkrun_core::CoreError;
    use milkrun_shared::models::NewCustomer;

    fn june_period() -> Period {
        Period::new(5, 2024).unwrap()
    }

    fn payment(name: &str, amount: i64) -> PaymentRequest {
        PaymentRequest {
            customer_name: name.to_string(),
            month: 5,
            year: 2024,
            amount: Decimal::from(amount),
        }
    }

    #[tokio::test]
    async fn test_full_month_bill() {
        let (service, _) = service();
        let customer = register(&service, "Asha").await;

        let statement = service.customer_month(&owner(), customer.id, june_period()).await.unwrap();
        assert_eq!(statement.calendar.total_delivered, 30);
        assert_eq!(statement.bill.total_bill, Decimal::from(3000));
        assert_eq!(statement.bill.paid, Decimal::ZERO);
        assert_eq!(statement.bill.remaining, Decimal::from(3000));
        assert!(!statement.bill.is_settled);
    }

    #[tokio::test]
    async fn test_skipped_day_is_not_billed() {
        let (service, store) = service();
        let customer = register(&service, "Asha").await;
        store.set_delivery_status(&owner(), "Asha", june(15), false).await.unwrap();

        let statement = service.customer_month(&owner(), customer.id, june_period()).await.unwrap();
        assert_eq!(statement.calendar.total_delivered, 29);
        assert_eq!(statement.bill.total_bill, Decimal::from(2900));
    }

    #[tokio::test]
    async fn test_extra_after_settlement_reopens_bill() {
        let (service, store) = service();
        let customer = register(&service, "Asha").await;
        store.set_delivery_status(&owner(), "Asha", june(15), false).await.unwrap();

        let receipt = service.record_payment(&owner(), payment("Asha", 2900)).await.unwrap();
        assert!(receipt.bill.is_settled);
        assert_eq!(receipt.settlement.remaining, Decimal::ZERO);

        service
            .record_extra_sale(
                &owner(),
                ExtraSaleInput {
                    customer_name: "Asha".into(),
                    quantity: Decimal::from(5),
                    date: "2024-06-20".into(),
                },
            )
            .await
            .unwrap();

        let bill = service
            .customer_month(&owner(), customer.id, june_period())
            .await
            .unwrap()
            .bill;
        assert_eq!(bill.total_bill, Decimal::from(3150));
        assert!(bill.has_new_charges);
        assert_eq!(bill.new_charges, Decimal::from(250));
        assert_eq!(bill.remaining, Decimal::from(250));
        assert!(!bill.is_settled);

        let result = service.record_payment(&owner(), payment("Asha", 300)).await;
        match result {
            Err(CoreError::ValidationError(msg)) => assert!(msg.contains("exceeds remaining")),
            other => panic!("unexpected result: {other:?}"),
        }

        let receipt = service.record_payment(&owner(), payment("Asha", 250)).await.unwrap();
        assert_eq!(receipt.settlement.total, Decimal::from(3150));
        assert_eq!(receipt.settlement.paid, Decimal::from(3150));
        assert!(receipt.bill.is_settled);
        assert!(!receipt.bill.has_new_charges);
    }

    #[tokio::test]
    async fn test_fractional_bill_settles_when_paid_in_full() {
        let (service, _) = service();
        let customer = service
            .register_customer(
                &owner(),
                NewCustomer {
                    name: "Meera".to_string(),
                    phone: "9876543210".to_string(),
                    quantity: "1.25".parse().unwrap(),
                    price: "45.25".parse().unwrap(),
                    start_date: june(30),
                },
            )
            .await
            .unwrap();

        let before = service.customer_month(&owner(), customer.id, june_period()).await.unwrap().bill;
        let owed: Decimal = "56.56".parse().unwrap();
        assert_eq!(before.total_bill, owed);
        assert_eq!(before.remaining, owed);

        let receipt = service
            .record_payment(
                &owner(),
                PaymentRequest {
                    customer_name: "Meera".into(),
                    month: 5,
                    year: 2024,
                    amount: before.remaining,
                },
            )
            .await
            .unwrap();
        assert_eq!(receipt.settlement.total, owed);
        assert_eq!(receipt.settlement.remaining, receipt.settlement.total - receipt.settlement.paid);
        assert!(receipt.bill.is_settled);
        assert!(!receipt.bill.has_new_charges);

        let after = service.customer_month(&owner(), customer.id, june_period()).await.unwrap().bill;
        assert!(after.is_settled);
        assert!(!after.has_new_charges);
        assert_eq!(after.remaining, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_sub_cent_price_rejected() {
        let (service, _) = service();
        let result = service
            .register_customer(
                &owner(),
                NewCustomer {
                    name: "Meera".to_string(),
                    phone: "9876543210".to_string(),
                    quantity: "1.25".parse().unwrap(),
                    price: "45.255".parse().unwrap(),
                    start_date: june(1),
                },
            )
            .await;
        assert!(matches!(result, Err(CoreError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_payments_accumulate_into_one_record() {
        let (service, _) = service();
        register(&service, "Asha").await;

        let first = service.record_payment(&owner(), payment("Asha", 1000)).await.unwrap();
        let second = service.record_payment(&owner(), payment("Asha", 500)).await.unwrap();

        assert_eq!(first.settlement.id, second.settlement.id);
        assert_eq!(second.settlement.paid, Decimal::from(1500));
        assert_eq!(second.settlement.remaining, Decimal::from(1500));
        assert_eq!(service.list_settlements(&owner(), june_period()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_bill_board_views() {
        let (service, _) = service();
        register(&service, "Asha").await;
        register(&service, "Vikram").await;
        service.record_payment(&owner(), payment("Asha", 3000)).await.unwrap();

        let all = service.bill_board(&owner(), june_period(), BillView::All).await.unwrap();
        assert_eq!(all.len(), 2);

        let settled = service.bill_board(&owner(), june_period(), BillView::Settled).await.unwrap();
        assert_eq!(settled.len(), 1);
        assert_eq!(settled[0].customer_name, "Asha");

        let pending = service.bill_board(&owner(), june_period(), BillView::Pending).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].customer_name, "Vikram");
        assert_eq!(pending[0].delivered_days, 30);
    }

    #[tokio::test]
    async fn test_delete_customer_removes_all_records() {
        let (service, store) = service();
        let customer = register(&service, "Asha").await;
        register(&service, "Vikram").await;

        for day in [3, 9, 21] {
            service
                .record_extra_sale(
                    &owner(),
                    ExtraSaleInput {
                        customer_name: "Asha".into(),
                        quantity: Decimal::ONE,
                        date: format!("2024-06-{:02}", day),
                    },
                )
                .await
                .unwrap();
        }
        store.set_delivery_status(&owner(), "Asha", june(4), false).await.unwrap();
        store.set_delivery_status(&owner(), "Asha", june(5), false).await.unwrap();
        store.set_delivery_status(&owner(), "Vikram", june(5), false).await.unwrap();

        let report = service.delete_customer(&owner(), customer.id).await.unwrap();
        assert_eq!(report.extra_sales, 3);
        assert_eq!(report.non_delivery, 2);

        let customers = service.list_customers(&owner()).await.unwrap();
        assert!(customers.iter().all(|c| c.name != "Asha"));
        assert!(store.list_extra_sales(&owner(), None).await.unwrap().is_empty());
        let remaining = store.list_non_delivery(&owner(), None).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].customer_name, "Vikram");
    }

    #[tokio::test]
    async fn test_summary_reads_same_bills_as_board() {
        let (service, _) = service();
        register(&service, "Asha").await;
        register(&service, "Vikram").await;
        service.record_payment(&owner(), payment("Asha", 1500)).await.unwrap();

        let summary = service.summary(&owner(), june_period()).await.unwrap();
        let board = service.bill_board(&owner(), june_period(), BillView::All).await.unwrap();

        let sales: Decimal = board.iter().map(|l| l.bill.total_bill).sum();
        assert_eq!(summary.total_sales, sales);
        assert_eq!(summary.total_collected, Decimal::from(1500));
        assert_eq!(summary.total_outstanding, Decimal::from(4500));
        assert_eq!(summary.collected_percentage, Decimal::from(25));
        assert_eq!(summary.pending_bills, 2);
    }
}
