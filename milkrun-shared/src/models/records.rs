use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::period::Period;

/// Marks one day on which a customer's delivery did not happen.
/// Absence of a record means the delivery happened.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NonDeliveryRecord {
    pub id: Uuid,
    pub owner_email: String,
    pub customer_name: String,
    pub date: NaiveDate,
}

impl NonDeliveryRecord {
    pub fn new(owner_email: String, customer_name: String, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_email,
            customer_name,
            date,
        }
    }
}

/// A one-off sale outside the daily subscription
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtraSaleRecord {
    pub id: Uuid,
    pub owner_email: String,
    pub customer_name: String,
    pub quantity: Decimal,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl ExtraSaleRecord {
    pub fn new(owner_email: String, sale: NewExtraSale) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_email,
            customer_name: sale.customer_name,
            quantity: sale.quantity,
            date: sale.date,
            created_at: Utc::now(),
        }
    }

    pub fn apply(&mut self, update: &ExtraSaleUpdate) {
        if let Some(name) = &update.customer_name {
            self.customer_name = name.clone();
        }
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }
        if let Some(date) = update.date {
            self.date = date;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExtraSale {
    pub customer_name: String,
    pub quantity: Decimal,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtraSaleUpdate {
    pub customer_name: Option<String>,
    pub quantity: Option<Decimal>,
    pub date: Option<NaiveDate>,
}

/// Last settled snapshot of a customer's bill for one month.
/// At most one exists per (owner, customer, month, year).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettlementRecord {
    pub id: Uuid,
    pub owner_email: String,
    pub customer_name: String,
    /// 0 = January
    pub month: u32,
    pub year: i32,
    pub total: Decimal,
    pub paid: Decimal,
    /// Always `total - paid` when written
    pub remaining: Decimal,
    pub settled_at: DateTime<Utc>,
}

impl SettlementRecord {
    pub fn period(&self) -> Option<Period> {
        Period::new(self.month, self.year)
    }

    pub fn is_for(&self, customer_name: &str, period: Period) -> bool {
        self.customer_name == customer_name && self.month == period.month() && self.year == period.year()
    }
}
