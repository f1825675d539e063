use chrono::NaiveDate;
use milkrun_shared::models::ExtraSaleRecord;
use milkrun_shared::Period;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// Extra-sale quantities summed per customer, and per customer per day.
///
/// Both maps are plain sums so the input order never matters.
#[derive(Debug, Clone, Default)]
pub struct ExtraSaleTotals {
    totals: HashMap<String, Decimal>,
    per_day: HashMap<String, BTreeMap<NaiveDate, Decimal>>,
}

impl ExtraSaleTotals {
    /// Aggregate records that are already limited to the period of interest.
    pub fn from_records(records: &[ExtraSaleRecord]) -> Self {
        let mut totals = Self::default();
        for record in records {
            totals.add(&record.customer_name, record.date, record.quantity);
        }
        totals
    }

    /// Aggregate only the records falling inside `period`.
    pub fn for_period(records: &[ExtraSaleRecord], period: Period) -> Self {
        let mut totals = Self::default();
        for record in records.iter().filter(|r| period.contains(r.date)) {
            totals.add(&record.customer_name, record.date, record.quantity);
        }
        totals
    }

    fn add(&mut self, customer_name: &str, day: NaiveDate, quantity: Decimal) {
        *self.totals.entry(customer_name.to_string()).or_default() += quantity;
        *self
            .per_day
            .entry(customer_name.to_string())
            .or_default()
            .entry(day)
            .or_default() += quantity;
    }

    /// Sum of every extra sale of the customer in the period (zero if none)
    pub fn period_total(&self, customer_name: &str) -> Decimal {
        self.totals.get(customer_name).copied().unwrap_or_default()
    }

    pub fn day_quantity(&self, customer_name: &str, day: NaiveDate) -> Decimal {
        self.per_day
            .get(customer_name)
            .and_then(|days| days.get(&day))
            .copied()
            .unwrap_or_default()
    }

    pub fn days_for(&self, customer_name: &str) -> Option<&BTreeMap<NaiveDate, Decimal>> {
        self.per_day.get(customer_name)
    }

    /// Sum across all customers
    pub fn grand_total(&self) -> Decimal {
        self.totals.values().copied().sum()
    }
}
