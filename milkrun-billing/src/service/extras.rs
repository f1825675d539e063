use milkrun_core::{CoreError, CoreResult, OwnerId};
use milkrun_shared::models::{ExtraSaleRecord, ExtraSaleUpdate, NewExtraSale};
use milkrun_shared::money::QUANTITY_SCALE;
use milkrun_shared::Period;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::customers::validate_amount;
use super::LedgerService;

#[derive(Debug, Clone, Deserialize)]
pub struct ExtraSaleInput {
    pub customer_name: String,
    pub quantity: Decimal,
    /// "YYYY-MM-DD" or an RFC 3339 timestamp
    pub date: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtraSaleEdit {
    pub customer_name: Option<String>,
    pub quantity: Option<Decimal>,
    pub date: Option<String>,
}

impl LedgerService {
    pub async fn record_extra_sale(&self, owner: &OwnerId, input: ExtraSaleInput) -> CoreResult<ExtraSaleRecord> {
        validate_amount("Extra sale quantity", input.quantity, QUANTITY_SCALE)?;
        let date = self.normalize_day(&input.date)?;
        let customer = self.customer_by_name(owner, input.customer_name.trim()).await?;

        let sale = ExtraSaleRecord::new(
            owner.to_string(),
            NewExtraSale {
                customer_name: customer.name,
                quantity: input.quantity,
                date,
            },
        );
        self.store.create_extra_sale(&sale).await?;

        info!("Recorded extra sale of {} for {} on {}", sale.quantity, sale.customer_name, sale.date);
        Ok(sale)
    }

    pub async fn update_extra_sale(&self, owner: &OwnerId, id: Uuid, edit: ExtraSaleEdit) -> CoreResult<ExtraSaleRecord> {
        if let Some(quantity) = edit.quantity {
            validate_amount("Extra sale quantity", quantity, QUANTITY_SCALE)?;
        }
        let date = edit.date.as_deref().map(|d| self.normalize_day(d)).transpose()?;
        let customer_name = match edit.customer_name {
            Some(name) => Some(self.customer_by_name(owner, name.trim()).await?.name),
            None => None,
        };

        let update = ExtraSaleUpdate {
            customer_name,
            quantity: edit.quantity,
            date,
        };
        self.store
            .update_extra_sale(owner, id, &update)
            .await?
            .ok_or_else(|| CoreError::NotFoundError(format!("Extra sale {}", id)))
    }

    pub async fn delete_extra_sale(&self, owner: &OwnerId, id: Uuid) -> CoreResult<()> {
        if !self.store.delete_extra_sale(owner, id).await? {
            return Err(CoreError::NotFoundError(format!("Extra sale {}", id)));
        }
        info!("Deleted extra sale {} for {}", id, owner);
        Ok(())
    }

    /// All of an owner's extra sales, or only one month's, most recent first
    pub async fn list_extra_sales(&self, owner: &OwnerId, period: Option<Period>) -> CoreResult<Vec<ExtraSaleRecord>> {
        Ok(self.store.list_extra_sales(owner, period).await?)
    }
}
