use milkrun_shared::models::{Customer, SettlementRecord};
use milkrun_shared::money::round_money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Facts a bill is computed from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BillInputs {
    pub price: Decimal,
    pub quantity: Decimal,
    /// Delivered day count from the calendar
    pub total_delivered: u32,
    /// Extra-sale liters in the period
    pub extra_quantity: Decimal,
}

impl BillInputs {
    pub fn for_customer(customer: &Customer, total_delivered: u32, extra_quantity: Decimal) -> Self {
        Self {
            price: customer.price,
            quantity: customer.quantity,
            total_delivered,
            extra_quantity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillBreakdown {
    pub delivered_days: u32,
    pub base_amount: Decimal,
    pub extra_quantity: Decimal,
    pub extra_amount: Decimal,
}

impl BillBreakdown {
    /// Amounts are rounded to cents so the total equals what a settlement stores.
    pub fn compute(inputs: &BillInputs) -> Self {
        let base_amount = round_money(inputs.price * inputs.quantity * Decimal::from(inputs.total_delivered));
        let extra_amount = round_money(inputs.price * inputs.extra_quantity);
        Self {
            delivered_days: inputs.total_delivered,
            base_amount,
            extra_quantity: inputs.extra_quantity,
            extra_amount,
        }
    }

    pub fn total(&self) -> Decimal {
        self.base_amount + self.extra_amount
    }
}

/// Live billing state of one customer for one period
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillStatus {
    pub total_bill: Decimal,
    pub paid: Decimal,
    pub remaining: Decimal,
    pub is_settled: bool,
    /// The live total grew past the last settled total
    pub has_new_charges: bool,
    pub new_charges: Decimal,
    /// Total of the stored settlement, if there is one
    pub original_total: Option<Decimal>,
    pub breakdown: BillBreakdown,
}

/// Compare the live total against the last settlement snapshot.
///
/// A period with no activity and no settlement counts as settled. The
/// remaining amount is never negative.
pub fn reconcile(inputs: &BillInputs, existing: Option<&SettlementRecord>) -> BillStatus {
    let breakdown = BillBreakdown::compute(inputs);
    let current_total = breakdown.total();

    let Some(existing) = existing else {
        return BillStatus {
            total_bill: current_total,
            paid: Decimal::ZERO,
            remaining: current_total.max(Decimal::ZERO),
            is_settled: current_total.is_zero(),
            has_new_charges: false,
            new_charges: Decimal::ZERO,
            original_total: None,
            breakdown,
        };
    };

    if current_total > existing.total {
        let new_charges = current_total - existing.total;
        return BillStatus {
            total_bill: current_total,
            paid: existing.paid,
            remaining: (existing.remaining + new_charges).max(Decimal::ZERO),
            is_settled: false,
            has_new_charges: true,
            new_charges,
            original_total: Some(existing.total),
            breakdown,
        };
    }

    let remaining = (current_total - existing.paid).max(Decimal::ZERO);
    BillStatus {
        total_bill: current_total,
        paid: existing.paid,
        remaining,
        is_settled: remaining <= Decimal::ZERO,
        has_new_charges: false,
        new_charges: Decimal::ZERO,
        original_total: Some(existing.total),
        breakdown,
    }
}
