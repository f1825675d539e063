use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use milkrun_core::repository::{CascadeReport, CustomerRepository};
use milkrun_core::{OwnerId, StoreResult};
use milkrun_shared::models::Customer;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::database::map_sqlx;
use crate::pg_store::PgRecordStore;

const CUSTOMER_COLUMNS: &str =
    "id, owner_email, name, phone, quantity, price, start_date, is_delivering, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: Uuid,
    owner_email: String,
    name: String,
    phone: String,
    quantity: Decimal,
    price: Decimal,
    start_date: NaiveDate,
    is_delivering: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: row.id,
            owner_email: row.owner_email,
            name: row.name,
            phone: row.phone,
            quantity: row.quantity,
            price: row.price,
            start_date: row.start_date,
            is_delivering: row.is_delivering,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl CustomerRepository for PgRecordStore {
    async fn create_customer(&self, customer: &Customer) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO customers (id, owner_email, name, phone, quantity, price, start_date, is_delivering, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(customer.id)
        .bind(&customer.owner_email)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(customer.quantity)
        .bind(customer.price)
        .bind(customer.start_date)
        .bind(customer.is_delivering)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn get_customer(&self, owner: &OwnerId, id: Uuid) -> StoreResult<Option<Customer>> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE owner_email = $1 AND id = $2"
        ))
        .bind(owner.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(row.map(Customer::from))
    }

    async fn find_customer_by_name(&self, owner: &OwnerId, name: &str) -> StoreResult<Option<Customer>> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE owner_email = $1 AND name = $2"
        ))
        .bind(owner.as_str())
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(row.map(Customer::from))
    }

    async fn list_customers(&self, owner: &OwnerId) -> StoreResult<Vec<Customer>> {
        let rows = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE owner_email = $1 ORDER BY name"
        ))
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(rows.into_iter().map(Customer::from).collect())
    }

    async fn update_customer(&self, previous_name: &str, customer: &Customer) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        sqlx::query(
            r#"
            UPDATE customers
            SET name = $3, phone = $4, quantity = $5, price = $6, start_date = $7, is_delivering = $8, updated_at = $9
            WHERE owner_email = $1 AND id = $2
            "#,
        )
        .bind(&customer.owner_email)
        .bind(customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(customer.quantity)
        .bind(customer.price)
        .bind(customer.start_date)
        .bind(customer.is_delivering)
        .bind(customer.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx)?;

        if previous_name != customer.name {
            for table in ["non_delivery", "extra_sales", "settlements"] {
                sqlx::query(&format!(
                    "UPDATE {table} SET customer_name = $3 WHERE owner_email = $1 AND customer_name = $2"
                ))
                .bind(&customer.owner_email)
                .bind(previous_name)
                .bind(&customer.name)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx)?;
            }
        }

        tx.commit().await.map_err(map_sqlx)?;
        Ok(())
    }

    async fn set_delivering(&self, owner: &OwnerId, id: Uuid, delivering: bool) -> StoreResult<Option<Customer>> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "UPDATE customers SET is_delivering = $3, updated_at = NOW() \
             WHERE owner_email = $1 AND id = $2 RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(owner.as_str())
        .bind(id)
        .bind(delivering)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(row.map(Customer::from))
    }

    async fn list_paused_customers(&self) -> StoreResult<Vec<Customer>> {
        let rows = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE is_delivering = FALSE ORDER BY owner_email, name"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(rows.into_iter().map(Customer::from).collect())
    }

    async fn delete_customer_cascade(&self, owner: &OwnerId, id: Uuid) -> StoreResult<Option<CascadeReport>> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "DELETE FROM customers WHERE owner_email = $1 AND id = $2 RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(owner.as_str())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let customer = Customer::from(row);

        let mut removed = [0u64; 3];
        for (slot, table) in removed.iter_mut().zip(["extra_sales", "non_delivery", "settlements"]) {
            *slot = sqlx::query(&format!(
                "DELETE FROM {table} WHERE owner_email = $1 AND customer_name = $2"
            ))
            .bind(owner.as_str())
            .bind(&customer.name)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx)?
            .rows_affected();
        }

        tx.commit().await.map_err(map_sqlx)?;

        let [extra_sales, non_delivery, settlements] = removed;
        Ok(Some(CascadeReport {
            customer,
            extra_sales,
            non_delivery,
            settlements,
        }))
    }
}
