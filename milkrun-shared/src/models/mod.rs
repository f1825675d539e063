pub mod customer;
pub mod records;
pub mod owner;

pub use customer::{Customer, CustomerUpdate, NewCustomer};
pub use owner::OwnerAccount;
pub use records::{ExtraSaleRecord, ExtraSaleUpdate, NewExtraSale, NonDeliveryRecord, SettlementRecord};
