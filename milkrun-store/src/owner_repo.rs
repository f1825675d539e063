use async_trait::async_trait;
use chrono::{DateTime, Utc};
use milkrun_core::repository::OwnerRepository;
use milkrun_core::{OwnerId, StoreResult};
use milkrun_shared::models::OwnerAccount;

use crate::database::map_sqlx;
use crate::pg_store::PgRecordStore;

#[derive(sqlx::FromRow)]
struct OwnerRow {
    email: String,
    name: String,
    joined_at: DateTime<Utc>,
}

impl From<OwnerRow> for OwnerAccount {
    fn from(row: OwnerRow) -> Self {
        OwnerAccount {
            email: row.email,
            name: row.name,
            joined_at: row.joined_at,
        }
    }
}

#[async_trait]
impl OwnerRepository for PgRecordStore {
    async fn ensure_owner(&self, email: &OwnerId, name: &str) -> StoreResult<OwnerAccount> {
        let row = sqlx::query_as::<_, OwnerRow>(
            r#"
            INSERT INTO owners (email, name) VALUES ($1, $2)
            ON CONFLICT (email) DO UPDATE SET email = owners.email
            RETURNING email, name, joined_at
            "#,
        )
        .bind(email.as_str())
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(row.into())
    }

    async fn get_owner(&self, email: &OwnerId) -> StoreResult<Option<OwnerAccount>> {
        let row = sqlx::query_as::<_, OwnerRow>("SELECT email, name, joined_at FROM owners WHERE email = $1")
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(row.map(OwnerAccount::from))
    }

    async fn list_owners(&self) -> StoreResult<Vec<OwnerAccount>> {
        let rows = sqlx::query_as::<_, OwnerRow>("SELECT email, name, joined_at FROM owners ORDER BY joined_at")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(rows.into_iter().map(OwnerAccount::from).collect())
    }

    async fn delete_owner(&self, email: &OwnerId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM owners WHERE email = $1")
            .bind(email.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected() > 0)
    }
}
