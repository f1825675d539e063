use async_trait::async_trait;
use chrono::{DateTime, Utc};
use milkrun_core::repository::SettlementRepository;
use milkrun_core::{OwnerId, StoreError, StoreResult};
use milkrun_shared::models::SettlementRecord;
use milkrun_shared::Period;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::database::map_sqlx;
use crate::pg_store::PgRecordStore;

const SETTLEMENT_COLUMNS: &str = "id, owner_email, customer_name, month, year, total, paid, remaining, settled_at";

#[derive(sqlx::FromRow)]
struct SettlementRow {
    id: Uuid,
    owner_email: String,
    customer_name: String,
    month: i32,
    year: i32,
    total: Decimal,
    paid: Decimal,
    remaining: Decimal,
    settled_at: DateTime<Utc>,
}

impl TryFrom<SettlementRow> for SettlementRecord {
    type Error = StoreError;

    fn try_from(row: SettlementRow) -> Result<Self, Self::Error> {
        let month = u32::try_from(row.month)
            .map_err(|_| StoreError::Backend(format!("settlement {} has month {}", row.id, row.month)))?;
        Ok(SettlementRecord {
            id: row.id,
            owner_email: row.owner_email,
            customer_name: row.customer_name,
            month,
            year: row.year,
            total: row.total,
            paid: row.paid,
            remaining: row.remaining,
            settled_at: row.settled_at,
        })
    }
}

fn month_param(month: u32) -> StoreResult<i32> {
    i32::try_from(month).map_err(|_| StoreError::Backend(format!("month {} out of range", month)))
}

#[async_trait]
impl SettlementRepository for PgRecordStore {
    async fn find_settlement(
        &self,
        owner: &OwnerId,
        customer_name: &str,
        period: Period,
    ) -> StoreResult<Option<SettlementRecord>> {
        let row = sqlx::query_as::<_, SettlementRow>(&format!(
            "SELECT {SETTLEMENT_COLUMNS} FROM settlements \
             WHERE owner_email = $1 AND customer_name = $2 AND month = $3 AND year = $4"
        ))
        .bind(owner.as_str())
        .bind(customer_name)
        .bind(month_param(period.month())?)
        .bind(period.year())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;

        row.map(SettlementRecord::try_from).transpose()
    }

    async fn list_settlements(&self, owner: &OwnerId, period: Period) -> StoreResult<Vec<SettlementRecord>> {
        let rows = sqlx::query_as::<_, SettlementRow>(&format!(
            "SELECT {SETTLEMENT_COLUMNS} FROM settlements \
             WHERE owner_email = $1 AND month = $2 AND year = $3 ORDER BY settled_at DESC"
        ))
        .bind(owner.as_str())
        .bind(month_param(period.month())?)
        .bind(period.year())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        rows.into_iter().map(SettlementRecord::try_from).collect()
    }

    async fn upsert_settlement(&self, record: &SettlementRecord) -> StoreResult<SettlementRecord> {
        // Single statement so a failure never leaves a half-written snapshot.
        let row = sqlx::query_as::<_, SettlementRow>(&format!(
            r#"
            INSERT INTO settlements (id, owner_email, customer_name, month, year, total, paid, remaining, settled_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (owner_email, customer_name, month, year) DO UPDATE
            SET total = EXCLUDED.total,
                paid = EXCLUDED.paid,
                remaining = EXCLUDED.remaining,
                settled_at = EXCLUDED.settled_at
            RETURNING {SETTLEMENT_COLUMNS}
            "#
        ))
        .bind(record.id)
        .bind(&record.owner_email)
        .bind(&record.customer_name)
        .bind(month_param(record.month)?)
        .bind(record.year)
        .bind(record.total)
        .bind(record.paid)
        .bind(record.remaining)
        .bind(record.settled_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx)?;

        SettlementRecord::try_from(row)
    }
}
