use async_trait::async_trait;
use chrono::NaiveDate;
use milkrun_core::repository::{DeliveryRepository, ToggleOutcome};
use milkrun_core::{OwnerId, StoreResult};
use milkrun_shared::models::NonDeliveryRecord;
use milkrun_shared::Period;
use uuid::Uuid;

use crate::database::map_sqlx;
use crate::pg_store::PgRecordStore;

#[derive(sqlx::FromRow)]
struct NonDeliveryRow {
    id: Uuid,
    owner_email: String,
    customer_name: String,
    date: NaiveDate,
}

impl From<NonDeliveryRow> for NonDeliveryRecord {
    fn from(row: NonDeliveryRow) -> Self {
        NonDeliveryRecord {
            id: row.id,
            owner_email: row.owner_email,
            customer_name: row.customer_name,
            date: row.date,
        }
    }
}

#[async_trait]
impl DeliveryRepository for PgRecordStore {
    async fn list_non_delivery(&self, owner: &OwnerId, period: Option<Period>) -> StoreResult<Vec<NonDeliveryRecord>> {
        let rows = match period {
            Some(period) => {
                sqlx::query_as::<_, NonDeliveryRow>(
                    "SELECT id, owner_email, customer_name, date FROM non_delivery \
                     WHERE owner_email = $1 AND date >= $2 AND date < $3 ORDER BY date, customer_name",
                )
                .bind(owner.as_str())
                .bind(period.first_day())
                .bind(period.end_exclusive())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, NonDeliveryRow>(
                    "SELECT id, owner_email, customer_name, date FROM non_delivery \
                     WHERE owner_email = $1 ORDER BY date, customer_name",
                )
                .bind(owner.as_str())
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(map_sqlx)?;

        Ok(rows.into_iter().map(NonDeliveryRecord::from).collect())
    }

    async fn set_delivery_status(
        &self,
        owner: &OwnerId,
        customer_name: &str,
        date: NaiveDate,
        delivered: bool,
    ) -> StoreResult<ToggleOutcome> {
        if delivered {
            let result = sqlx::query(
                "DELETE FROM non_delivery WHERE owner_email = $1 AND customer_name = $2 AND date = $3",
            )
            .bind(owner.as_str())
            .bind(customer_name)
            .bind(date)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;

            return Ok(if result.rows_affected() > 0 {
                ToggleOutcome::Removed
            } else {
                ToggleOutcome::Unchanged
            });
        }

        // The unique index on (owner, name, date) keeps this idempotent under concurrent toggles.
        let result = sqlx::query(
            "INSERT INTO non_delivery (id, owner_email, customer_name, date) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (owner_email, customer_name, date) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(owner.as_str())
        .bind(customer_name)
        .bind(date)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(if result.rows_affected() > 0 {
            ToggleOutcome::Saved
        } else {
            ToggleOutcome::Unchanged
        })
    }
}
