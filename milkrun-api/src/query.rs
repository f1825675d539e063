use milkrun_billing::{BillView, LedgerService};
use milkrun_shared::Period;
use serde::Deserialize;

use crate::error::AppError;

/// `?month=&year=`; each part defaults to the current business month.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl PeriodQuery {
    pub fn resolve(&self, ledger: &LedgerService) -> Result<Period, AppError> {
        Ok(ledger.resolve_period(self.month, self.year)?)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BillsQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
    #[serde(default)]
    pub view: BillView,
}

#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}
