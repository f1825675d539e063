use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

/// A billing month. `month` is zero based (0 = January) to match the
/// settlement records, `year` is a four digit calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Period {
    month: u32,
    year: i32,
    #[serde(skip)]
    first: NaiveDate,
    #[serde(skip)]
    next: NaiveDate,
}

impl Period {
    /// Returns `None` for a month outside 0..=11 or a year that is not four digits.
    pub fn new(month: u32, year: i32) -> Option<Self> {
        if month > 11 || !(1000..=9999).contains(&year) {
            return None;
        }

        let first = NaiveDate::from_ymd_opt(year, month + 1, 1)?;
        let next = if month == 11 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 2, 1)?
        };

        Some(Self { month, year, first, next })
    }

    /// The period a given day falls in.
    pub fn containing(date: NaiveDate) -> Option<Self> {
        Self::new(date.month0(), date.year())
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next - Duration::days(1)
    }

    /// First day of the following month (exclusive upper bound for range queries).
    pub fn end_exclusive(&self) -> NaiveDate {
        self.next
    }

    pub fn days_in_month(&self) -> u32 {
        (self.next - self.first).num_days() as u32
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first && date < self.next
    }

    /// Every calendar day of the month, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let next = self.next;
        self.first.iter_days().take_while(move |d| *d < next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_in_month() {
        assert_eq!(Period::new(5, 2024).unwrap().days_in_month(), 30);
        assert_eq!(Period::new(1, 2024).unwrap().days_in_month(), 29);
        assert_eq!(Period::new(1, 2023).unwrap().days_in_month(), 28);
        assert_eq!(Period::new(11, 2024).unwrap().days_in_month(), 31);
    }

    #[test]
    fn test_invalid_period() {
        assert!(Period::new(12, 2024).is_none());
        assert!(Period::new(0, 24).is_none());
    }

    #[test]
    fn test_december_rolls_over() {
        let period = Period::new(11, 2024).unwrap();
        assert_eq!(period.end_exclusive(), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(period.last_day(), NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert_eq!(period.days().count(), 31);
    }

    #[test]
    fn test_contains_and_containing() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let period = Period::containing(day).unwrap();
        assert_eq!((period.month(), period.year()), (5, 2024));
        assert!(period.contains(day));
        assert!(!period.contains(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()));
    }
}
