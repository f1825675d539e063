use milkrun_core::{CoreError, CoreResult, OwnerId};
use milkrun_shared::models::OwnerAccount;
use milkrun_shared::Period;
use serde::Serialize;
use tracing::info;

use super::bills::BillLine;
use super::LedgerService;
use crate::summary::MonthlySummary;

/// Administrative view of one owner for one month
#[derive(Debug, Clone, Serialize)]
pub struct OwnerDetail {
    pub owner: OwnerAccount,
    pub customers: Vec<BillLine>,
    pub summary: MonthlySummary,
}

impl LedgerService {
    /// Called on every owner sign-in; creates the account the first time.
    pub async fn sign_in(&self, owner: &OwnerId, name: &str) -> CoreResult<OwnerAccount> {
        let name = name.trim();
        let name = if name.is_empty() { owner.as_str() } else { name };
        Ok(self.store.ensure_owner(owner, name).await?)
    }

    pub async fn list_owners(&self) -> CoreResult<Vec<OwnerAccount>> {
        Ok(self.store.list_owners().await?)
    }

    pub async fn owner_detail(&self, owner: &OwnerId, period: Period) -> CoreResult<OwnerDetail> {
        let account = self
            .store
            .get_owner(owner)
            .await?
            .ok_or_else(|| CoreError::NotFoundError(format!("Owner {}", owner)))?;

        let statements = self.statements(owner, period).await?;
        let summary = MonthlySummary::from_statements(period, &statements);

        Ok(OwnerDetail {
            owner: account,
            customers: statements.into_iter().map(BillLine::from).collect(),
            summary,
        })
    }

    /// Removes the account only. Customer records stay under the owner's email.
    pub async fn delete_owner(&self, owner: &OwnerId) -> CoreResult<()> {
        if !self.store.delete_owner(owner).await? {
            return Err(CoreError::NotFoundError(format!("Owner {}", owner)));
        }
        info!("Deleted owner account {}", owner);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_sign_in_is_idempotent() {
        let (service, _) = service();
        let first = service.sign_in(&owner(), "Dairy Farm").await.unwrap();
        let second = service.sign_in(&owner(), "Renamed").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(service.list_owners().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_owner_detail_includes_month() {
        let (service, _) = service();
        service.sign_in(&owner(), "").await.unwrap();
        register(&service, "Asha").await;

        let detail = service
            .owner_detail(&owner(), Period::new(5, 2024).unwrap())
            .await
            .unwrap();
        assert_eq!(detail.owner.name, "dairy@example.com");
        assert_eq!(detail.customers.len(), 1);
        assert_eq!(detail.summary.total_sales, Decimal::from(3000));
    }

    #[tokio::test]
    async fn test_delete_unknown_owner() {
        let (service, _) = service();
        let result = service.delete_owner(&owner()).await;
        assert!(matches!(result, Err(CoreError::NotFoundError(_))));

        service.sign_in(&owner(), "Dairy").await.unwrap();
        service.delete_owner(&owner()).await.unwrap();
        assert!(service.list_owners().await.unwrap().is_empty());
    }
}
