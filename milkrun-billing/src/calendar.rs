//! Delivery calendar.
//!
//! Every day of a month gets exactly one status, decided in this order
//! (first match wins):
//!
//! 1. before the subscription start date → `NotStarted`
//! 2. after today → `Future`
//! 3. present in the non-delivery log → `Undelivered`
//! 4. otherwise → `Delivered`
//!
//! A missing start date or an unknown "today" makes the day `NotStarted`, so
//! a broken input yields an empty calendar instead of an error.

use chrono::{Datelike, NaiveDate};
use milkrun_shared::models::Customer;
use milkrun_shared::Period;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::extras::ExtraSaleTotals;
use crate::index::NonDeliveryIndex;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayStatus {
    NotStarted,
    Future,
    Delivered,
    Undelivered,
}

impl DayStatus {
    pub fn resolve(
        day: NaiveDate,
        start_date: Option<NaiveDate>,
        today: Option<NaiveDate>,
        undelivered: bool,
    ) -> Self {
        let (Some(start_date), Some(today)) = (start_date, today) else {
            return DayStatus::NotStarted;
        };

        if day < start_date {
            DayStatus::NotStarted
        } else if day > today {
            DayStatus::Future
        } else if undelivered {
            DayStatus::Undelivered
        } else {
            DayStatus::Delivered
        }
    }
}

/// One cell of the calendar
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarDay {
    pub day: u32,
    pub date: NaiveDate,
    pub status: DayStatus,
    /// Liters shown for the day. Informational only, never summed into a bill.
    pub quantity: Decimal,
    /// Extra-sale liters recorded on this day
    pub extra: Decimal,
    /// True when the shown quantity is an extra sale on an undelivered day
    pub extra_only: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DeliveryCalendar {
    pub period: Period,
    pub days: Vec<CalendarDay>,
    /// Number of `Delivered` days. Multiplied by the daily quantity downstream.
    pub total_delivered: u32,
}

impl DeliveryCalendar {
    pub fn count(&self, status: DayStatus) -> usize {
        self.days.iter().filter(|d| d.status == status).count()
    }

    pub fn status_on(&self, date: NaiveDate) -> Option<DayStatus> {
        self.days.iter().find(|d| d.date == date).map(|d| d.status)
    }

    /// Subscription liters actually delivered
    pub fn delivered_liters(&self, daily_quantity: Decimal) -> Decimal {
        daily_quantity * Decimal::from(self.total_delivered)
    }
}

/// Subscription terms and logs for one customer
#[derive(Debug, Clone, Copy)]
pub struct Subscription<'a> {
    pub start_date: Option<NaiveDate>,
    pub daily_quantity: Decimal,
    pub undelivered: Option<&'a BTreeSet<NaiveDate>>,
    pub extras: Option<&'a BTreeMap<NaiveDate, Decimal>>,
}

impl<'a> Subscription<'a> {
    pub fn of(customer: &Customer, index: &'a NonDeliveryIndex, extras: &'a ExtraSaleTotals) -> Self {
        Self {
            start_date: Some(customer.start_date),
            daily_quantity: customer.quantity,
            undelivered: index.days_for(&customer.name),
            extras: extras.days_for(&customer.name),
        }
    }
}

/// Produces calendars relative to a fixed "today"
#[derive(Debug, Clone, Copy)]
pub struct CalendarGenerator {
    today: Option<NaiveDate>,
}

impl CalendarGenerator {
    pub fn new(today: NaiveDate) -> Self {
        Self { today: Some(today) }
    }

    /// Generator for an unknown "today". Every day resolves to `NotStarted`.
    pub fn without_today() -> Self {
        Self { today: None }
    }

    pub fn today(&self) -> Option<NaiveDate> {
        self.today
    }

    pub fn generate(&self, period: Period, subscription: Subscription<'_>) -> DeliveryCalendar {
        let mut days = Vec::with_capacity(period.days_in_month() as usize);
        let mut total_delivered = 0;

        for date in period.days() {
            let undelivered = subscription.undelivered.is_some_and(|set| set.contains(&date));
            let status = DayStatus::resolve(date, subscription.start_date, self.today, undelivered);
            let extra = subscription
                .extras
                .and_then(|map| map.get(&date))
                .copied()
                .unwrap_or_default();

            let (quantity, extra_only) = match status {
                DayStatus::Delivered => (subscription.daily_quantity + extra, false),
                DayStatus::Undelivered if extra > Decimal::ZERO => (extra, true),
                _ => (Decimal::ZERO, false),
            };

            if status == DayStatus::Delivered {
                total_delivered += 1;
            }

            days.push(CalendarDay {
                day: date.day(),
                date,
                status,
                quantity,
                extra,
                extra_only,
            });
        }

        DeliveryCalendar {
            period,
            days,
            total_delivered,
        }
    }

    pub fn for_customer(
        &self,
        customer: &Customer,
        period: Period,
        index: &NonDeliveryIndex,
        extras: &ExtraSaleTotals,
    ) -> DeliveryCalendar {
        self.generate(period, Subscription::of(customer, index, extras))
    }
}
