use chrono::{DateTime, Utc};
use milkrun_core::{CoreError, CoreResult, OwnerId};
use milkrun_shared::models::SettlementRecord;
use milkrun_shared::money::{fits_scale, MONEY_SCALE};
use milkrun_shared::Period;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::reconciliation::BillStatus;

/// Stored settlement after a payment, with the bill recomputed against it
#[derive(Debug, Clone, Serialize)]
pub struct PaymentReceipt {
    pub settlement: SettlementRecord,
    pub bill: BillStatus,
}

/// Build the settlement snapshot that results from paying `amount`
/// against the live bill `status`.
///
/// The amount must be positive, in whole cents and no larger than what is still owed. The
/// new snapshot takes the live total, adds the amount to what was already
/// paid and recomputes `remaining` from those two; nothing else is trusted.
/// An existing record keeps its id so the write replaces it.
pub fn apply_payment(
    owner: &OwnerId,
    customer_name: &str,
    period: Period,
    status: &BillStatus,
    existing: Option<&SettlementRecord>,
    amount: Decimal,
    now: DateTime<Utc>,
) -> CoreResult<SettlementRecord> {
    if amount <= Decimal::ZERO {
        return Err(CoreError::ValidationError(
            "Payment amount must be greater than zero".to_string(),
        ));
    }

    if !fits_scale(amount, MONEY_SCALE) {
        return Err(CoreError::ValidationError(format!(
            "Payment amount {} has more than {} decimal places",
            amount, MONEY_SCALE
        )));
    }

    if amount > status.remaining {
        return Err(CoreError::ValidationError(format!(
            "Payment of {} exceeds remaining amount {}",
            amount, status.remaining
        )));
    }

    let paid = existing.map(|s| s.paid).unwrap_or_default() + amount;
    let total = status.total_bill;

    Ok(SettlementRecord {
        id: existing.map(|s| s.id).unwrap_or_else(Uuid::new_v4),
        owner_email: owner.to_string(),
        customer_name: customer_name.to_string(),
        month: period.month(),
        year: period.year(),
        total,
        paid,
        remaining: total - paid,
        settled_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconciliation::{reconcile, BillInputs};

    fn owner() -> OwnerId {
        OwnerId::new("owner@example.com").unwrap()
    }

    fn june() -> Period {
        Period::new(5, 2024).unwrap()
    }

    fn inputs(days: u32, extra: i64) -> BillInputs {
        BillInputs {
            price: Decimal::from(50),
            quantity: Decimal::from(2),
            total_delivered: days,
            extra_quantity: Decimal::from(extra),
        }
    }

    #[test]
    fn test_first_payment_creates_snapshot() {
        let status = reconcile(&inputs(30, 0), None);
        let record = apply_payment(&owner(), "Asha", june(), &status, None, Decimal::from(1000), Utc::now()).unwrap();

        assert_eq!(record.total, Decimal::from(3000));
        assert_eq!(record.paid, Decimal::from(1000));
        assert_eq!(record.remaining, Decimal::from(2000));
        assert_eq!((record.month, record.year), (5, 2024));
    }

    #[test]
    fn test_follow_up_payment_accumulates() {
        let status = reconcile(&inputs(30, 0), None);
        let first = apply_payment(&owner(), "Asha", june(), &status, None, Decimal::from(1000), Utc::now()).unwrap();

        let status = reconcile(&inputs(30, 0), Some(&first));
        let second = apply_payment(&owner(), "Asha", june(), &status, Some(&first), Decimal::from(2000), Utc::now()).unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.paid, Decimal::from(3000));
        assert_eq!(second.remaining, Decimal::ZERO);
        assert!(second.paid >= first.paid);
    }

    #[test]
    fn test_payment_covers_new_charges_with_live_total() {
        let status = reconcile(&inputs(29, 0), None);
        let settled = apply_payment(&owner(), "Asha", june(), &status, None, Decimal::from(2900), Utc::now()).unwrap();

        let status = reconcile(&inputs(29, 5), Some(&settled));
        assert_eq!(status.remaining, Decimal::from(250));

        let record = apply_payment(&owner(), "Asha", june(), &status, Some(&settled), Decimal::from(250), Utc::now()).unwrap();
        assert_eq!(record.total, Decimal::from(3150));
        assert_eq!(record.paid, Decimal::from(3150));
        assert_eq!(record.remaining, record.total - record.paid);
    }

    #[test]
    fn test_overpayment_rejected() {
        let status = reconcile(&inputs(29, 5), None);
        let settled = apply_payment(&owner(), "Asha", june(), &status, None, Decimal::from(2900), Utc::now()).unwrap();
        let status = reconcile(&inputs(29, 5), Some(&settled));
        assert_eq!(status.remaining, Decimal::from(250));

        let err = apply_payment(&owner(), "Asha", june(), &status, Some(&settled), Decimal::from(300), Utc::now()).unwrap_err();
        match err {
            CoreError::ValidationError(msg) => assert!(msg.contains("exceeds remaining")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        let status = reconcile(&inputs(30, 0), None);
        for amount in [Decimal::ZERO, Decimal::from(-5)] {
            let result = apply_payment(&owner(), "Asha", june(), &status, None, amount, Utc::now());
            assert!(matches!(result, Err(CoreError::ValidationError(_))));
        }
    }

    #[test]
    fn test_sub_cent_amount_rejected() {
        let status = reconcile(&inputs(30, 0), None);
        let amount: Decimal = "10.005".parse().unwrap();
        let err = apply_payment(&owner(), "Asha", june(), &status, None, amount, Utc::now()).unwrap_err();
        match err {
            CoreError::ValidationError(msg) => assert!(msg.contains("decimal places")),
            other => panic!("unexpected error: {other:?}"),
        }

        let amount: Decimal = "10.50".parse().unwrap();
        assert!(apply_payment(&owner(), "Asha", june(), &status, None, amount, Utc::now()).is_ok());
    }
}
