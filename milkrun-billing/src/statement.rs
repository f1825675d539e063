use milkrun_shared::models::{Customer, ExtraSaleRecord, NonDeliveryRecord, SettlementRecord};
use milkrun_shared::Period;
use serde::Serialize;
use std::collections::HashMap;

use crate::calendar::{CalendarGenerator, DeliveryCalendar};
use crate::extras::ExtraSaleTotals;
use crate::index::NonDeliveryIndex;
use crate::reconciliation::{reconcile, BillInputs, BillStatus};

/// Calendar and bill for one customer in one period
#[derive(Debug, Clone, Serialize)]
pub struct CustomerStatement {
    pub customer: Customer,
    pub calendar: DeliveryCalendar,
    pub bill: BillStatus,
}

/// Everything recorded for an owner in one period, indexed for the engine
#[derive(Debug, Clone)]
pub struct PeriodFacts {
    pub period: Period,
    pub non_delivery: NonDeliveryIndex,
    pub extras: ExtraSaleTotals,
    pub settlements: HashMap<String, SettlementRecord>,
}

impl PeriodFacts {
    pub fn new(
        period: Period,
        non_delivery: &[NonDeliveryRecord],
        extra_sales: &[ExtraSaleRecord],
        settlements: Vec<SettlementRecord>,
    ) -> Self {
        let settlements = settlements
            .into_iter()
            .filter(|s| s.month == period.month() && s.year == period.year())
            .map(|s| (s.customer_name.clone(), s))
            .collect();

        Self {
            period,
            non_delivery: NonDeliveryIndex::from_records(non_delivery),
            extras: ExtraSaleTotals::for_period(extra_sales, period),
            settlements,
        }
    }

    pub fn settlement_for(&self, customer_name: &str) -> Option<&SettlementRecord> {
        self.settlements.get(customer_name)
    }

    pub fn calendar(&self, generator: &CalendarGenerator, customer: &Customer) -> DeliveryCalendar {
        generator.for_customer(customer, self.period, &self.non_delivery, &self.extras)
    }

    pub fn statement(&self, generator: &CalendarGenerator, customer: &Customer) -> CustomerStatement {
        let calendar = self.calendar(generator, customer);
        let inputs = BillInputs::for_customer(
            customer,
            calendar.total_delivered,
            self.extras.period_total(&customer.name),
        );
        let bill = reconcile(&inputs, self.settlement_for(&customer.name));

        CustomerStatement {
            customer: customer.clone(),
            calendar,
            bill,
        }
    }

    pub fn statements(&self, generator: &CalendarGenerator, customers: &[Customer]) -> Vec<CustomerStatement> {
        customers.iter().map(|c| self.statement(generator, c)).collect()
    }
}
