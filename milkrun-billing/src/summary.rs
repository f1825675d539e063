use milkrun_shared::Period;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::reconciliation::BillStatus;
use crate::statement::CustomerStatement;

/// Which bills a bill board lists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillView {
    #[default]
    All,
    /// Something billed and not yet paid off
    Pending,
    /// Something billed and paid off
    Settled,
}

impl BillView {
    pub fn matches(&self, bill: &BillStatus) -> bool {
        match self {
            BillView::All => true,
            BillView::Pending => bill.total_bill > Decimal::ZERO && !bill.is_settled,
            BillView::Settled => bill.total_bill > Decimal::ZERO && bill.is_settled,
        }
    }
}

/// Dashboard figures for one owner and one month
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlySummary {
    pub month: u32,
    pub year: i32,
    pub total_customers: usize,
    pub delivering_customers: usize,
    /// Subscription liters delivered plus extra-sale liters
    pub total_liters: Decimal,
    pub extra_liters: Decimal,
    pub total_sales: Decimal,
    pub total_collected: Decimal,
    pub total_outstanding: Decimal,
    pub pending_bills: usize,
    pub settled_bills: usize,
    /// Collected over sales, in percent, two decimals
    pub collected_percentage: Decimal,
}

impl MonthlySummary {
    pub fn from_statements(period: Period, statements: &[CustomerStatement]) -> Self {
        let mut summary = Self {
            month: period.month(),
            year: period.year(),
            total_customers: statements.len(),
            delivering_customers: 0,
            total_liters: Decimal::ZERO,
            extra_liters: Decimal::ZERO,
            total_sales: Decimal::ZERO,
            total_collected: Decimal::ZERO,
            total_outstanding: Decimal::ZERO,
            pending_bills: 0,
            settled_bills: 0,
            collected_percentage: Decimal::ZERO,
        };

        for statement in statements {
            let bill = &statement.bill;
            if statement.customer.is_delivering {
                summary.delivering_customers += 1;
            }

            summary.extra_liters += bill.breakdown.extra_quantity;
            summary.total_liters += statement.calendar.delivered_liters(statement.customer.quantity)
                + bill.breakdown.extra_quantity;
            summary.total_sales += bill.total_bill;
            summary.total_collected += bill.paid;
            summary.total_outstanding += bill.remaining;

            if BillView::Pending.matches(bill) {
                summary.pending_bills += 1;
            } else if BillView::Settled.matches(bill) {
                summary.settled_bills += 1;
            }
        }

        if summary.total_sales > Decimal::ZERO {
            summary.collected_percentage =
                (summary.total_collected / summary.total_sales * Decimal::ONE_HUNDRED).round_dp(2);
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::CalendarGenerator;
    use crate::statement::PeriodFacts;
    use chrono::{NaiveDate, Utc};
    use milkrun_shared::models::{Customer, ExtraSaleRecord, SettlementRecord};
    use uuid::Uuid;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn customer(name: &str, delivering: bool) -> Customer {
        Customer {
            id: Uuid::new_v4(),
            owner_email: "owner@example.com".into(),
            name: name.into(),
            phone: "9000000000".into(),
            quantity: Decimal::from(2),
            price: Decimal::from(50),
            start_date: date(1),
            is_delivering: delivering,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_totals() {
        let june = Period::new(5, 2024).unwrap();
        let extra = ExtraSaleRecord {
            id: Uuid::new_v4(),
            owner_email: "owner@example.com".into(),
            customer_name: "Vikram".into(),
            quantity: Decimal::from(4),
            date: date(8),
            created_at: Utc::now(),
        };
        let paid_off = SettlementRecord {
            id: Uuid::new_v4(),
            owner_email: "owner@example.com".into(),
            customer_name: "Asha".into(),
            month: 5,
            year: 2024,
            total: Decimal::from(3000),
            paid: Decimal::from(3000),
            remaining: Decimal::ZERO,
            settled_at: Utc::now(),
        };
        let facts = PeriodFacts::new(june, &[], &[extra], vec![paid_off]);
        let statements = facts.statements(
            &CalendarGenerator::new(date(30)),
            &[customer("Asha", true), customer("Vikram", false)],
        );

        let summary = MonthlySummary::from_statements(june, &statements);

        assert_eq!(summary.total_customers, 2);
        assert_eq!(summary.delivering_customers, 1);
        assert_eq!(summary.total_liters, Decimal::from(124));
        assert_eq!(summary.extra_liters, Decimal::from(4));
        assert_eq!(summary.total_sales, Decimal::from(6200));
        assert_eq!(summary.total_collected, Decimal::from(3000));
        assert_eq!(summary.total_outstanding, Decimal::from(3200));
        assert_eq!(summary.pending_bills, 1);
        assert_eq!(summary.settled_bills, 1);
        assert_eq!(summary.collected_percentage, Decimal::new(4839, 2));
    }

    #[test]
    fn test_zero_sales_has_zero_percentage() {
        let june = Period::new(5, 2024).unwrap();
        let summary = MonthlySummary::from_statements(june, &[]);
        assert_eq!(summary.collected_percentage, Decimal::ZERO);
        assert_eq!(summary.total_customers, 0);
    }
}
