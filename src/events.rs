use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{InstrumentId, PlanId, SubscriptionId};

/// changes the tracker has committed to the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // installment events
    InstallmentPlanCreated {
        plan_id: PlanId,
        card_id: InstrumentId,
        monthly_amount: Money,
        remaining_months: u32,
        first_due: Option<NaiveDate>,
    },
    AdminFeeCharged {
        plan_id: PlanId,
        card_id: InstrumentId,
        amount: Money,
        date: NaiveDate,
    },

    // subscription events
    SubscriptionCharged {
        subscription_id: SubscriptionId,
        card_id: InstrumentId,
        amount: Money,
        date: NaiveDate,
    },
    SubscriptionAdvanced {
        subscription_id: SubscriptionId,
        previous_billing_date: NaiveDate,
        next_billing_date: NaiveDate,
    },

    // store events
    SnapshotSaved {
        transactions: usize,
        subscriptions: usize,
        as_of: NaiveDate,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn emit_all(&mut self, events: impl IntoIterator<Item = Event>) {
        self.events.extend(events);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
