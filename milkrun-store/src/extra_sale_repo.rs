use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use milkrun_core::repository::ExtraSaleRepository;
use milkrun_core::{OwnerId, StoreResult};
use milkrun_shared::models::{ExtraSaleRecord, ExtraSaleUpdate};
use milkrun_shared::Period;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::database::map_sqlx;
use crate::pg_store::PgRecordStore;

#[derive(sqlx::FromRow)]
struct ExtraSaleRow {
    id: Uuid,
    owner_email: String,
    customer_name: String,
    quantity: Decimal,
    date: NaiveDate,
    created_at: DateTime<Utc>,
}

impl From<ExtraSaleRow> for ExtraSaleRecord {
    fn from(row: ExtraSaleRow) -> Self {
        ExtraSaleRecord {
            id: row.id,
            owner_email: row.owner_email,
            customer_name: row.customer_name,
            quantity: row.quantity,
            date: row.date,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl ExtraSaleRepository for PgRecordStore {
    async fn list_extra_sales(&self, owner: &OwnerId, period: Option<Period>) -> StoreResult<Vec<ExtraSaleRecord>> {
        let rows = match period {
            Some(period) => {
                sqlx::query_as::<_, ExtraSaleRow>(
                    "SELECT id, owner_email, customer_name, quantity, date, created_at FROM extra_sales \
                     WHERE owner_email = $1 AND date >= $2 AND date < $3 ORDER BY date DESC, created_at DESC",
                )
                .bind(owner.as_str())
                .bind(period.first_day())
                .bind(period.end_exclusive())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, ExtraSaleRow>(
                    "SELECT id, owner_email, customer_name, quantity, date, created_at FROM extra_sales \
                     WHERE owner_email = $1 ORDER BY date DESC, created_at DESC",
                )
                .bind(owner.as_str())
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(map_sqlx)?;

        Ok(rows.into_iter().map(ExtraSaleRecord::from).collect())
    }

    async fn create_extra_sale(&self, sale: &ExtraSaleRecord) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO extra_sales (id, owner_email, customer_name, quantity, date, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(sale.id)
        .bind(&sale.owner_email)
        .bind(&sale.customer_name)
        .bind(sale.quantity)
        .bind(sale.date)
        .bind(sale.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn update_extra_sale(
        &self,
        owner: &OwnerId,
        id: Uuid,
        update: &ExtraSaleUpdate,
    ) -> StoreResult<Option<ExtraSaleRecord>> {
        let row = sqlx::query_as::<_, ExtraSaleRow>(
            r#"
            UPDATE extra_sales
            SET customer_name = COALESCE($3, customer_name),
                quantity = COALESCE($4, quantity),
                date = COALESCE($5, date)
            WHERE owner_email = $1 AND id = $2
            RETURNING id, owner_email, customer_name, quantity, date, created_at
            "#,
        )
        .bind(owner.as_str())
        .bind(id)
        .bind(update.customer_name.as_deref())
        .bind(update.quantity)
        .bind(update.date)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(row.map(ExtraSaleRecord::from))
    }

    async fn delete_extra_sale(&self, owner: &OwnerId, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM extra_sales WHERE owner_email = $1 AND id = $2")
            .bind(owner.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected() > 0)
    }
}
