//! Use cases over the record store. Every read that shows a bill or a
//! calendar goes through [`PeriodFacts`] so all surfaces agree.

mod bills;
mod customers;
mod deliveries;
mod extras;
mod owners;

pub use bills::{BillLine, PaymentRequest};
pub use deliveries::{DeliverySheet, DeliverySheetEntry, DeliveryToggle, ToggleSummary};
pub use extras::{ExtraSaleEdit, ExtraSaleInput};
pub use owners::OwnerDetail;

use chrono::NaiveDate;
use milkrun_core::{CoreError, CoreResult, OwnerId, RecordStore};
use milkrun_shared::{BusinessClock, Period};
use std::sync::Arc;

use crate::calendar::CalendarGenerator;
use crate::statement::PeriodFacts;

pub struct LedgerService {
    store: Arc<dyn RecordStore>,
    clock: BusinessClock,
    fixed_today: Option<NaiveDate>,
}

impl LedgerService {
    pub fn new(store: Arc<dyn RecordStore>, clock: BusinessClock) -> Self {
        Self {
            store,
            clock,
            fixed_today: None,
        }
    }

    /// Freeze "today" instead of reading the clock
    pub fn with_fixed_today(mut self, today: NaiveDate) -> Self {
        self.fixed_today = Some(today);
        self
    }

    pub fn clock(&self) -> BusinessClock {
        self.clock
    }

    pub fn today(&self) -> NaiveDate {
        self.fixed_today.unwrap_or_else(|| self.clock.today())
    }

    pub fn generator(&self) -> CalendarGenerator {
        CalendarGenerator::new(self.today())
    }

    /// Resolve an optional month/year pair, defaulting each part to the current period.
    pub fn resolve_period(&self, month: Option<u32>, year: Option<i32>) -> CoreResult<Period> {
        let today = self.today();
        let current = Period::containing(today)
            .ok_or_else(|| CoreError::InternalError(format!("no period contains {}", today)))?;

        let month = month.unwrap_or(current.month());
        let year = year.unwrap_or(current.year());
        Period::new(month, year).ok_or_else(|| {
            CoreError::ValidationError(format!(
                "Invalid period: month must be 0-11 and year four digits (got {}/{})",
                month, year
            ))
        })
    }

    pub fn normalize_day(&self, raw: &str) -> CoreResult<NaiveDate> {
        self.clock
            .normalize_day(raw)
            .ok_or_else(|| CoreError::ValidationError(format!("Invalid date: {}", raw)))
    }

    /// Fetch and index everything the engine needs for one owner and month.
    pub async fn load_facts(&self, owner: &OwnerId, period: Period) -> CoreResult<PeriodFacts> {
        let non_delivery = self.store.list_non_delivery(owner, Some(period)).await?;
        let extra_sales = self.store.list_extra_sales(owner, Some(period)).await?;
        let settlements = self.store.list_settlements(owner, period).await?;

        Ok(PeriodFacts::new(period, &non_delivery, &extra_sales, settlements))
    }
}
