use chrono::NaiveDate;
use milkrun_core::repository::ToggleOutcome;
use milkrun_core::{CoreError, CoreResult, OwnerId};
use milkrun_shared::Period;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, warn};
use uuid::Uuid;

use super::LedgerService;
use crate::calendar::DayStatus;
use crate::index::NonDeliveryIndex;

/// Every customer of an owner with their status on one day
#[derive(Debug, Clone, Serialize)]
pub struct DeliverySheet {
    pub date: NaiveDate,
    pub entries: Vec<DeliverySheetEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliverySheetEntry {
    pub customer_id: Uuid,
    pub customer_name: String,
    pub quantity: Decimal,
    pub is_delivering: bool,
    pub status: DayStatus,
}

/// One requested change of the non-delivery log
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryToggle {
    pub customer_name: String,
    pub date: String,
    pub delivered: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ToggleSummary {
    pub saved: usize,
    pub removed: usize,
    pub unchanged: usize,
}

impl ToggleSummary {
    fn record(&mut self, outcome: ToggleOutcome) {
        match outcome {
            ToggleOutcome::Saved => self.saved += 1,
            ToggleOutcome::Removed => self.removed += 1,
            ToggleOutcome::Unchanged => self.unchanged += 1,
        }
    }
}

impl LedgerService {
    pub async fn delivery_sheet(&self, owner: &OwnerId, date: Option<NaiveDate>) -> CoreResult<DeliverySheet> {
        let date = date.unwrap_or_else(|| self.today());
        let period = Period::containing(date)
            .ok_or_else(|| CoreError::ValidationError(format!("Invalid date: {}", date)))?;

        let customers = self.store.list_customers(owner).await?;
        let index = NonDeliveryIndex::from_records(&self.store.list_non_delivery(owner, Some(period)).await?);
        let today = self.today();

        let entries = customers
            .into_iter()
            .map(|c| DeliverySheetEntry {
                status: DayStatus::resolve(date, Some(c.start_date), Some(today), index.is_undelivered(&c.name, date)),
                customer_id: c.id,
                quantity: c.quantity,
                is_delivering: c.is_delivering,
                customer_name: c.name,
            })
            .collect();

        Ok(DeliverySheet { date, entries })
    }

    /// Apply a batch of delivery toggles. The whole batch is validated before
    /// anything is written, so a bad entry leaves the log untouched.
    pub async fn set_deliveries(&self, owner: &OwnerId, toggles: Vec<DeliveryToggle>) -> CoreResult<ToggleSummary> {
        let known: HashSet<String> = self
            .store
            .list_customers(owner)
            .await?
            .into_iter()
            .map(|c| c.name)
            .collect();

        let mut changes = Vec::with_capacity(toggles.len());
        for toggle in toggles {
            let date = self.normalize_day(&toggle.date)?;
            let name = toggle.customer_name.trim();
            if !known.contains(name) {
                return Err(CoreError::NotFoundError(format!("Customer {}", name)));
            }
            changes.push((name.to_string(), date, toggle.delivered));
        }

        let mut summary = ToggleSummary::default();
        for (name, date, delivered) in changes {
            let outcome = self.store.set_delivery_status(owner, &name, date, delivered).await?;
            summary.record(outcome);
        }

        info!(
            "Delivery log for {}: {} saved, {} removed, {} unchanged",
            owner, summary.saved, summary.removed, summary.unchanged
        );
        Ok(summary)
    }

    /// Record today as undelivered for every customer whose delivery is stopped.
    /// Safe to run repeatedly on the same day.
    pub async fn mark_paused_customers_undelivered(&self) -> CoreResult<usize> {
        let today = self.today();
        let mut marked = 0;

        for customer in self.store.list_paused_customers().await? {
            if customer.start_date > today {
                continue;
            }
            let Some(owner) = OwnerId::new(customer.owner_email.as_str()) else {
                warn!("Skipping paused customer {} with blank owner", customer.id);
                continue;
            };
            let outcome = self
                .store
                .set_delivery_status(&owner, &customer.name, today, false)
                .await?;
            if outcome == ToggleOutcome::Saved {
                marked += 1;
            }
        }

        Ok(marked)
    }
}
