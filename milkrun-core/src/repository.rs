use async_trait::async_trait;
use chrono::NaiveDate;
use milkrun_shared::models::{
    Customer, ExtraSaleRecord, ExtraSaleUpdate, NonDeliveryRecord, OwnerAccount, SettlementRecord,
};
use milkrun_shared::Period;
use serde::Serialize;
use uuid::Uuid;

use crate::identity::OwnerId;
use crate::StoreResult;

/// What a customer delete removed along with the customer itself
#[derive(Debug, Clone, Serialize)]
pub struct CascadeReport {
    pub customer: Customer,
    pub extra_sales: u64,
    pub non_delivery: u64,
    pub settlements: u64,
}

/// Result of setting one (customer, day) delivery status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToggleOutcome {
    /// A non-delivery record was created
    Saved,
    /// A non-delivery record was removed
    Removed,
    /// The stored state already matched
    Unchanged,
}

/// Repository trait for customer data access
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Fails with `StoreError::Duplicate` if the owner already has a customer of that name.
    async fn create_customer(
        &self,
        customer: &Customer,
    ) -> StoreResult<()>;

    async fn get_customer(
        &self,
        owner: &OwnerId,
        id: Uuid,
    ) -> StoreResult<Option<Customer>>;

    async fn find_customer_by_name(
        &self,
        owner: &OwnerId,
        name: &str,
    ) -> StoreResult<Option<Customer>>;

    async fn list_customers(
        &self,
        owner: &OwnerId,
    ) -> StoreResult<Vec<Customer>>;

    /// Persist an edited customer. When `previous_name` differs from
    /// `customer.name` the customer's delivery, extra-sale and settlement
    /// records are renamed in the same write.
    async fn update_customer(
        &self,
        previous_name: &str,
        customer: &Customer,
    ) -> StoreResult<()>;

    async fn set_delivering(
        &self,
        owner: &OwnerId,
        id: Uuid,
        delivering: bool,
    ) -> StoreResult<Option<Customer>>;

    /// Customers of every owner whose delivery is currently stopped
    async fn list_paused_customers(&self) -> StoreResult<Vec<Customer>>;

    /// Remove a customer and every record referencing it. Returns `None`
    /// when the customer does not exist; missing sub-records are not an error.
    async fn delete_customer_cascade(
        &self,
        owner: &OwnerId,
        id: Uuid,
    ) -> StoreResult<Option<CascadeReport>>;
}

/// Repository trait for the sparse non-delivery log
#[async_trait]
pub trait DeliveryRepository: Send + Sync {
    async fn list_non_delivery(
        &self,
        owner: &OwnerId,
        period: Option<Period>,
    ) -> StoreResult<Vec<NonDeliveryRecord>>;

    /// `delivered = false` ensures a record exists, `true` ensures none does.
    async fn set_delivery_status(
        &self,
        owner: &OwnerId,
        customer_name: &str,
        date: NaiveDate,
        delivered: bool,
    ) -> StoreResult<ToggleOutcome>;
}

/// Repository trait for extra sales
#[async_trait]
pub trait ExtraSaleRepository: Send + Sync {
    /// Most recent first
    async fn list_extra_sales(
        &self,
        owner: &OwnerId,
        period: Option<Period>,
    ) -> StoreResult<Vec<ExtraSaleRecord>>;

    async fn create_extra_sale(
        &self,
        sale: &ExtraSaleRecord,
    ) -> StoreResult<()>;

    async fn update_extra_sale(
        &self,
        owner: &OwnerId,
        id: Uuid,
        update: &ExtraSaleUpdate,
    ) -> StoreResult<Option<ExtraSaleRecord>>;

    async fn delete_extra_sale(
        &self,
        owner: &OwnerId,
        id: Uuid,
    ) -> StoreResult<bool>;
}

/// Repository trait for settlement snapshots
#[async_trait]
pub trait SettlementRepository: Send + Sync {
    async fn find_settlement(
        &self,
        owner: &OwnerId,
        customer_name: &str,
        period: Period,
    ) -> StoreResult<Option<SettlementRecord>>;

    async fn list_settlements(
        &self,
        owner: &OwnerId,
        period: Period,
    ) -> StoreResult<Vec<SettlementRecord>>;

    /// Insert or replace the record for (owner, customer, month, year).
    async fn upsert_settlement(
        &self,
        record: &SettlementRecord,
    ) -> StoreResult<SettlementRecord>;
}

/// Repository trait for owner accounts
#[async_trait]
pub trait OwnerRepository: Send + Sync {
    /// Create the account on first sign-in; existing accounts are returned unchanged.
    async fn ensure_owner(
        &self,
        email: &OwnerId,
        name: &str,
    ) -> StoreResult<OwnerAccount>;

    async fn get_owner(
        &self,
        email: &OwnerId,
    ) -> StoreResult<Option<OwnerAccount>>;

    async fn list_owners(&self) -> StoreResult<Vec<OwnerAccount>>;

    async fn delete_owner(
        &self,
        email: &OwnerId,
    ) -> StoreResult<bool>;
}

/// Everything the service needs from persistence, as one object.
pub trait RecordStore:
    CustomerRepository + DeliveryRepository + ExtraSaleRepository + SettlementRepository + OwnerRepository
{
}

impl<T> RecordStore for T where
    T: CustomerRepository + DeliveryRepository + ExtraSaleRepository + SettlementRepository + OwnerRepository
{
}
