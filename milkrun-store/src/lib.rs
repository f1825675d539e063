pub mod app_config;
pub mod database;
pub mod memory;
pub mod pg_store;

mod customer_repo;
mod delivery_repo;
mod extra_sale_repo;
mod owner_repo;
mod settlement_repo;

pub use database::DbClient;
pub use memory::MemoryStore;
pub use pg_store::PgRecordStore;
