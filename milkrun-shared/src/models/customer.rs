use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A subscriber receiving a fixed quantity of milk every day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub id: Uuid,
    pub owner_email: String,
    /// Unique per owner. Delivery, extra-sale and settlement records refer to
    /// the customer by this name.
    pub name: String,
    pub phone: String,
    /// Liters per day
    pub quantity: Decimal,
    /// Price per liter
    pub price: Decimal,
    pub start_date: NaiveDate,
    /// Manual start/stop switch. Billing always follows the per-day log.
    pub is_delivering: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(owner_email: String, registration: NewCustomer) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_email,
            name: registration.name,
            phone: registration.phone,
            quantity: registration.quantity,
            price: registration.price,
            start_date: registration.start_date,
            is_delivering: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Amount charged for one delivered day
    pub fn daily_amount(&self) -> Decimal {
        self.price * self.quantity
    }

    /// Apply an edit. Fields left as `None` are untouched.
    pub fn apply(&mut self, update: CustomerUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(phone) = update.phone {
            self.phone = phone;
        }
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(start_date) = update.start_date {
            self.start_date = start_date;
        }
        if let Some(is_delivering) = update.is_delivering {
            self.is_delivering = is_delivering;
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub quantity: Option<Decimal>,
    pub price: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub is_delivering: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> NewCustomer {
        NewCustomer {
            name: "Ramesh".to_string(),
            phone: "9876543210".to_string(),
            quantity: Decimal::new(15, 1),
            price: Decimal::from(60),
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        }
    }

    #[test]
    fn test_new_customer_is_delivering() {
        let customer = Customer::new("owner@example.com".to_string(), registration());
        assert!(customer.is_delivering);
        assert_eq!(customer.daily_amount(), Decimal::from(90));
    }

    #[test]
    fn test_partial_update() {
        let mut customer = Customer::new("owner@example.com".to_string(), registration());
        customer.apply(CustomerUpdate {
            price: Some(Decimal::from(65)),
            ..Default::default()
        });

        assert_eq!(customer.price, Decimal::from(65));
        assert_eq!(customer.name, "Ramesh");
        assert_eq!(customer.quantity, Decimal::new(15, 1));
    }

    #[test]
    fn test_decimal_accepts_numbers_and_strings() {
        let update: CustomerUpdate =
            serde_json::from_value(serde_json::json!({ "quantity": 2, "price": "52.50" })).unwrap();
        assert_eq!(update.quantity, Some(Decimal::from(2)));
        assert_eq!(update.price, Some(Decimal::new(5250, 2)));
    }
}
