//! In-process record store with the same semantics as the Postgres one,
//! including the uniqueness rules the database enforces with indexes and
//! the decimal scales of its `NUMERIC` columns.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use milkrun_core::repository::{
    CascadeReport, CustomerRepository, DeliveryRepository, ExtraSaleRepository, OwnerRepository,
    SettlementRepository, ToggleOutcome,
};
use milkrun_core::{OwnerId, StoreError, StoreResult};
use milkrun_shared::models::{
    Customer, ExtraSaleRecord, ExtraSaleUpdate, NonDeliveryRecord, OwnerAccount, SettlementRecord,
};
use milkrun_shared::money::{round_money, round_quantity};
use milkrun_shared::Period;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    customers: HashMap<Uuid, Customer>,
    non_delivery: Vec<NonDeliveryRecord>,
    extra_sales: Vec<ExtraSaleRecord>,
    settlements: Vec<SettlementRecord>,
    owners: HashMap<String, OwnerAccount>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn in_period(date: NaiveDate, period: Option<Period>) -> bool {
    period.map_or(true, |p| p.contains(date))
}

fn customer_row(customer: &Customer) -> Customer {
    Customer {
        quantity: round_quantity(customer.quantity),
        price: round_money(customer.price),
        ..customer.clone()
    }
}

fn extra_sale_row(sale: &ExtraSaleRecord) -> ExtraSaleRecord {
    ExtraSaleRecord {
        quantity: round_quantity(sale.quantity),
        ..sale.clone()
    }
}

fn settlement_row(record: &SettlementRecord) -> SettlementRecord {
    SettlementRecord {
        total: round_money(record.total),
        paid: round_money(record.paid),
        remaining: round_money(record.remaining),
        ..record.clone()
    }
}

#[async_trait]
impl CustomerRepository for MemoryStore {
    async fn create_customer(&self, customer: &Customer) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let taken = tables
            .customers
            .values()
            .any(|c| c.owner_email == customer.owner_email && c.name == customer.name);
        if taken {
            return Err(StoreError::Duplicate(format!("customer {}", customer.name)));
        }
        tables.customers.insert(customer.id, customer_row(customer));
        Ok(())
    }

    async fn get_customer(&self, owner: &OwnerId, id: Uuid) -> StoreResult<Option<Customer>> {
        let tables = self.tables.read().await;
        Ok(tables
            .customers
            .get(&id)
            .filter(|c| c.owner_email == owner.as_str())
            .cloned())
    }

    async fn find_customer_by_name(&self, owner: &OwnerId, name: &str) -> StoreResult<Option<Customer>> {
        let tables = self.tables.read().await;
        Ok(tables
            .customers
            .values()
            .find(|c| c.owner_email == owner.as_str() && c.name == name)
            .cloned())
    }

    async fn list_customers(&self, owner: &OwnerId) -> StoreResult<Vec<Customer>> {
        let tables = self.tables.read().await;
        let mut customers: Vec<Customer> = tables
            .customers
            .values()
            .filter(|c| c.owner_email == owner.as_str())
            .cloned()
            .collect();
        customers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(customers)
    }

    async fn update_customer(&self, previous_name: &str, customer: &Customer) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let owner = customer.owner_email.as_str();

        if previous_name != customer.name {
            let taken = tables
                .customers
                .values()
                .any(|c| c.id != customer.id && c.owner_email == owner && c.name == customer.name);
            if taken {
                return Err(StoreError::Duplicate(format!("customer {}", customer.name)));
            }

            let new_name = &customer.name;
            for record in tables.non_delivery.iter_mut() {
                if record.owner_email == owner && record.customer_name == previous_name {
                    record.customer_name = new_name.clone();
                }
            }
            for sale in tables.extra_sales.iter_mut() {
                if sale.owner_email == owner && sale.customer_name == previous_name {
                    sale.customer_name = new_name.clone();
                }
            }
            for settlement in tables.settlements.iter_mut() {
                if settlement.owner_email == owner && settlement.customer_name == previous_name {
                    settlement.customer_name = new_name.clone();
                }
            }
        }

        if let Some(stored) = tables.customers.get_mut(&customer.id) {
            if stored.owner_email == owner {
                *stored = customer_row(customer);
            }
        }
        Ok(())
    }

    async fn set_delivering(&self, owner: &OwnerId, id: Uuid, delivering: bool) -> StoreResult<Option<Customer>> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .customers
            .get_mut(&id)
            .filter(|c| c.owner_email == owner.as_str())
            .map(|c| {
                c.is_delivering = delivering;
                c.updated_at = Utc::now();
                c.clone()
            }))
    }

    async fn list_paused_customers(&self) -> StoreResult<Vec<Customer>> {
        let tables = self.tables.read().await;
        Ok(tables
            .customers
            .values()
            .filter(|c| !c.is_delivering)
            .cloned()
            .collect())
    }

    async fn delete_customer_cascade(&self, owner: &OwnerId, id: Uuid) -> StoreResult<Option<CascadeReport>> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .customers
            .get(&id)
            .is_some_and(|c| c.owner_email == owner.as_str());
        if !owned {
            return Ok(None);
        }
        let Some(customer) = tables.customers.remove(&id) else {
            return Ok(None);
        };

        let belongs = |owner_email: &str, name: &str| owner_email == customer.owner_email && name == customer.name;

        let before = tables.extra_sales.len();
        tables.extra_sales.retain(|s| !belongs(&s.owner_email, &s.customer_name));
        let extra_sales = (before - tables.extra_sales.len()) as u64;

        let before = tables.non_delivery.len();
        tables.non_delivery.retain(|r| !belongs(&r.owner_email, &r.customer_name));
        let non_delivery = (before - tables.non_delivery.len()) as u64;

        let before = tables.settlements.len();
        tables.settlements.retain(|s| !belongs(&s.owner_email, &s.customer_name));
        let settlements = (before - tables.settlements.len()) as u64;

        Ok(Some(CascadeReport {
            customer,
            extra_sales,
            non_delivery,
            settlements,
        }))
    }
}

#[async_trait]
impl DeliveryRepository for MemoryStore {
    async fn list_non_delivery(&self, owner: &OwnerId, period: Option<Period>) -> StoreResult<Vec<NonDeliveryRecord>> {
        let tables = self.tables.read().await;
        let mut records: Vec<NonDeliveryRecord> = tables
            .non_delivery
            .iter()
            .filter(|r| r.owner_email == owner.as_str() && in_period(r.date, period))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.customer_name.cmp(&b.customer_name)));
        Ok(records)
    }

    async fn set_delivery_status(
        &self,
        owner: &OwnerId,
        customer_name: &str,
        date: NaiveDate,
        delivered: bool,
    ) -> StoreResult<ToggleOutcome> {
        let mut tables = self.tables.write().await;
        let position = tables
            .non_delivery
            .iter()
            .position(|r| r.owner_email == owner.as_str() && r.customer_name == customer_name && r.date == date);

        Ok(match (delivered, position) {
            (true, Some(index)) => {
                tables.non_delivery.swap_remove(index);
                ToggleOutcome::Removed
            }
            (false, None) => {
                tables
                    .non_delivery
                    .push(NonDeliveryRecord::new(owner.to_string(), customer_name.to_string(), date));
                ToggleOutcome::Saved
            }
            _ => ToggleOutcome::Unchanged,
        })
    }
}

#[async_trait]
impl ExtraSaleRepository for MemoryStore {
    async fn list_extra_sales(&self, owner: &OwnerId, period: Option<Period>) -> StoreResult<Vec<ExtraSaleRecord>> {
        let tables = self.tables.read().await;
        let mut sales: Vec<ExtraSaleRecord> = tables
            .extra_sales
            .iter()
            .filter(|s| s.owner_email == owner.as_str() && in_period(s.date, period))
            .cloned()
            .collect();
        sales.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.created_at.cmp(&a.created_at)));
        Ok(sales)
    }

    async fn create_extra_sale(&self, sale: &ExtraSaleRecord) -> StoreResult<()> {
        self.tables.write().await.extra_sales.push(extra_sale_row(sale));
        Ok(())
    }

    async fn update_extra_sale(
        &self,
        owner: &OwnerId,
        id: Uuid,
        update: &ExtraSaleUpdate,
    ) -> StoreResult<Option<ExtraSaleRecord>> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .extra_sales
            .iter_mut()
            .find(|s| s.id == id && s.owner_email == owner.as_str())
            .map(|s| {
                s.apply(update);
                *s = extra_sale_row(s);
                s.clone()
            }))
    }

    async fn delete_extra_sale(&self, owner: &OwnerId, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.extra_sales.len();
        tables
            .extra_sales
            .retain(|s| !(s.id == id && s.owner_email == owner.as_str()));
        Ok(tables.extra_sales.len() < before)
    }
}

#[async_trait]
impl SettlementRepository for MemoryStore {
    async fn find_settlement(
        &self,
        owner: &OwnerId,
        customer_name: &str,
        period: Period,
    ) -> StoreResult<Option<SettlementRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .settlements
            .iter()
            .find(|s| s.owner_email == owner.as_str() && s.is_for(customer_name, period))
            .cloned())
    }

    async fn list_settlements(&self, owner: &OwnerId, period: Period) -> StoreResult<Vec<SettlementRecord>> {
        let tables = self.tables.read().await;
        let mut settlements: Vec<SettlementRecord> = tables
            .settlements
            .iter()
            .filter(|s| s.owner_email == owner.as_str() && s.month == period.month() && s.year == period.year())
            .cloned()
            .collect();
        settlements.sort_by(|a, b| b.settled_at.cmp(&a.settled_at));
        Ok(settlements)
    }

    async fn upsert_settlement(&self, record: &SettlementRecord) -> StoreResult<SettlementRecord> {
        let mut tables = self.tables.write().await;
        let position = tables.settlements.iter().position(|s| {
            s.owner_email == record.owner_email
                && s.customer_name == record.customer_name
                && s.month == record.month
                && s.year == record.year
        });

        let row = settlement_row(record);
        let stored = match position {
            Some(index) => {
                let current = &mut tables.settlements[index];
                current.total = row.total;
                current.paid = row.paid;
                current.remaining = row.remaining;
                current.settled_at = row.settled_at;
                current.clone()
            }
            None => {
                tables.settlements.push(row.clone());
                row
            }
        };
        Ok(stored)
    }
}

#[async_trait]
impl OwnerRepository for MemoryStore {
    async fn ensure_owner(&self, email: &OwnerId, name: &str) -> StoreResult<OwnerAccount> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .owners
            .entry(email.to_string())
            .or_insert_with(|| OwnerAccount::new(email.to_string(), name.to_string()))
            .clone())
    }

    async fn get_owner(&self, email: &OwnerId) -> StoreResult<Option<OwnerAccount>> {
        Ok(self.tables.read().await.owners.get(email.as_str()).cloned())
    }

    async fn list_owners(&self) -> StoreResult<Vec<OwnerAccount>> {
        let tables = self.tables.read().await;
        let mut owners: Vec<OwnerAccount> = tables.owners.values().cloned().collect();
        owners.sort_by(|a, b| a.joined_at.cmp(&b.joined_at).then_with(|| a.email.cmp(&b.email)));
        Ok(owners)
    }

    async fn delete_owner(&self, email: &OwnerId) -> StoreResult<bool> {
        Ok(self.tables.write().await.owners.remove(email.as_str()).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use milkrun_shared::models::NewCustomer;
    use rust_decimal::Decimal;

    fn owner() -> OwnerId {
        OwnerId::new("dairy@example.com").unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn customer(name: &str) -> Customer {
        Customer::new(
            owner().to_string(),
            NewCustomer {
                name: name.to_string(),
                phone: "9000000000".to_string(),
                quantity: Decimal::from(2),
                price: Decimal::from(50),
                start_date: day(1),
            },
        )
    }

    #[tokio::test]
    async fn test_duplicate_customer_rejected() {
        let store = MemoryStore::new();
        store.create_customer(&customer("Asha")).await.unwrap();
        let result = store.create_customer(&customer("Asha")).await;
        assert!(matches!(result, Err(StoreError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_toggle_is_idempotent() {
        let store = MemoryStore::new();
        let owner = owner();

        assert_eq!(store.set_delivery_status(&owner, "Asha", day(3), false).await.unwrap(), ToggleOutcome::Saved);
        assert_eq!(store.set_delivery_status(&owner, "Asha", day(3), false).await.unwrap(), ToggleOutcome::Unchanged);
        assert_eq!(store.list_non_delivery(&owner, None).await.unwrap().len(), 1);
        assert_eq!(store.set_delivery_status(&owner, "Asha", day(3), true).await.unwrap(), ToggleOutcome::Removed);
        assert_eq!(store.set_delivery_status(&owner, "Asha", day(3), true).await.unwrap(), ToggleOutcome::Unchanged);
        assert!(store.list_non_delivery(&owner, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_period_filter() {
        let store = MemoryStore::new();
        let may = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
        store.set_delivery_status(&owner(), "Asha", may, false).await.unwrap();
        store.set_delivery_status(&owner(), "Asha", day(1), false).await.unwrap();

        let june = Period::new(5, 2024).unwrap();
        let records = store.list_non_delivery(&owner(), Some(june)).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, day(1));
    }

    #[tokio::test]
    async fn test_upsert_keeps_one_record_per_period() {
        let store = MemoryStore::new();
        let mut record = SettlementRecord {
            id: Uuid::new_v4(),
            owner_email: owner().to_string(),
            customer_name: "Asha".into(),
            month: 5,
            year: 2024,
            total: Decimal::from(3000),
            paid: Decimal::from(1000),
            remaining: Decimal::from(2000),
            settled_at: Utc::now(),
        };
        store.upsert_settlement(&record).await.unwrap();

        record.id = Uuid::new_v4();
        record.paid = Decimal::from(3000);
        record.remaining = Decimal::ZERO;
        let stored = store.upsert_settlement(&record).await.unwrap();

        let june = Period::new(5, 2024).unwrap();
        assert_eq!(store.list_settlements(&owner(), june).await.unwrap().len(), 1);
        assert_eq!(stored.paid, Decimal::from(3000));
        assert_ne!(stored.id, record.id);
    }

    #[tokio::test]
    async fn test_amounts_stored_at_column_scale() {
        let store = MemoryStore::new();
        let record = SettlementRecord {
            id: Uuid::new_v4(),
            owner_email: owner().to_string(),
            customer_name: "Asha".into(),
            month: 5,
            year: 2024,
            total: "56.5625".parse().unwrap(),
            paid: "56.5625".parse().unwrap(),
            remaining: Decimal::ZERO,
            settled_at: Utc::now(),
        };
        let stored = store.upsert_settlement(&record).await.unwrap();
        assert_eq!(stored.total, "56.56".parse::<Decimal>().unwrap());
        assert_eq!(stored.paid, "56.56".parse::<Decimal>().unwrap());

        let mut asha = customer("Asha");
        asha.price = "45.255".parse().unwrap();
        asha.quantity = "1.2505".parse().unwrap();
        store.create_customer(&asha).await.unwrap();
        let kept = store.get_customer(&owner(), asha.id).await.unwrap().unwrap();
        assert_eq!(kept.price, "45.26".parse::<Decimal>().unwrap());
        assert_eq!(kept.quantity, "1.251".parse::<Decimal>().unwrap());
    }

    #[tokio::test]
    async fn test_cascade_leaves_other_owners_alone() {
        let store = MemoryStore::new();
        let asha = customer("Asha");
        store.create_customer(&asha).await.unwrap();
        let other = OwnerId::new("other@example.com").unwrap();
        store.set_delivery_status(&owner(), "Asha", day(2), false).await.unwrap();
        store.set_delivery_status(&other, "Asha", day(2), false).await.unwrap();

        let report = store.delete_customer_cascade(&owner(), asha.id).await.unwrap().unwrap();
        assert_eq!(report.non_delivery, 1);
        assert_eq!(store.list_non_delivery(&other, None).await.unwrap().len(), 1);
        assert!(store.delete_customer_cascade(&owner(), asha.id).await.unwrap().is_none());
    }
}
