//! Day normalization.
//!
//! Every "day" in the system (non-delivery dates, extra-sale dates, start
//! dates and "today") is a calendar date in the business timezone. The
//! timezone is a fixed UTC offset taken from configuration, so the same
//! instant always maps to the same day regardless of where the server runs.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

use crate::period::Period;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessClock {
    offset: FixedOffset,
}

impl BusinessClock {
    /// Clock for a business located `minutes` east of UTC (IST is 330).
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(|offset| Self { offset })
    }

    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// The business-local day an instant falls on.
    pub fn day_of(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    pub fn today(&self) -> NaiveDate {
        self.day_of(Utc::now())
    }

    /// Period containing today.
    pub fn current_period(&self) -> Option<Period> {
        Period::containing(self.today())
    }

    /// Parses a day from user or record input.
    ///
    /// Plain `YYYY-MM-DD` dates are taken as-is. RFC 3339 timestamps are
    /// shifted into the business offset before the time is dropped, so
    /// `2024-06-14T20:00:00Z` is the 15th for an IST business.
    pub fn normalize_day(&self, raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Some(date);
        }

        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|at| self.day_of(at.with_timezone(&Utc)))
    }
}

impl Default for BusinessClock {
    fn default() -> Self {
        Self::utc()
    }
}
