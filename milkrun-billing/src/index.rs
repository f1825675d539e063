use chrono::NaiveDate;
use milkrun_shared::models::NonDeliveryRecord;
use std::collections::{BTreeSet, HashMap};

/// Per-customer set of days on which delivery did not happen
#[derive(Debug, Clone, Default)]
pub struct NonDeliveryIndex {
    by_customer: HashMap<String, BTreeSet<NaiveDate>>,
}

impl NonDeliveryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from raw records. Repeated (name, day) pairs collapse.
    pub fn from_records(records: &[NonDeliveryRecord]) -> Self {
        let mut index = Self::new();
        for record in records {
            index.insert(&record.customer_name, record.date);
        }
        index
    }

    /// Returns false if the day was already marked
    pub fn insert(&mut self, customer_name: &str, day: NaiveDate) -> bool {
        self.by_customer
            .entry(customer_name.to_string())
            .or_default()
            .insert(day)
    }

    pub fn is_undelivered(&self, customer_name: &str, day: NaiveDate) -> bool {
        self.by_customer
            .get(customer_name)
            .is_some_and(|days| days.contains(&day))
    }

    pub fn days_for(&self, customer_name: &str) -> Option<&BTreeSet<NaiveDate>> {
        self.by_customer.get(customer_name)
    }

    pub fn customer_count(&self) -> usize {
        self.by_customer.len()
    }
}
