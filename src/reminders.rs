//! Upcoming obligations across cards, limit increases and subscriptions.
//!
//! Each source is evaluated on its own and the results are unioned into one list ordered by
//! date. Ties on the same date are broken by kind (payment, limit increase, annual fee,
//! subscription renewal), then by instrument id and event id, so the output is fully
//! deterministic.

use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::calendar::{days_between, next_occurrence, validate_month};
use crate::decimal::Money;
use crate::errors::{ObligationError, Result};
use crate::limits::next_limit_increase_date;
use crate::model::{CreditInstrument, LimitIncreaseRecord, Subscription};
use crate::types::{InstrumentId, ObligationKind};

/// default horizon for upcoming obligations
pub const DEFAULT_LOOKAHEAD_DAYS: u32 = 7;

/// an obligation falling inside the lookahead window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObligationEvent {
    /// `"{kind}:{source_id}:{date}"`
    pub id: String,
    pub instrument_id: InstrumentId,
    /// the instrument for card-level kinds, the subscription for renewals
    pub source_id: Uuid,
    pub kind: ObligationKind,
    pub date: NaiveDate,
    pub days_remaining: u32,
    pub amount: Option<Money>,
}

impl ObligationEvent {
    pub fn is_due_today(&self) -> bool {
        self.days_remaining == 0
    }
}

/// `today ..= today + lookahead_days`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderWindow {
    pub today: NaiveDate,
    pub last_day: NaiveDate,
}

impl ReminderWindow {
    pub fn new(today: NaiveDate, lookahead_days: u32) -> Self {
        Self {
            today,
            last_day: today + Duration::days(lookahead_days as i64),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.today <= date && date <= self.last_day
    }

    /// whole days from today, `None` outside the window
    pub fn days_remaining(&self, date: NaiveDate) -> Option<u32> {
        if !self.contains(date) {
            return None;
        }
        Some(days_between(self.today, date) as u32)
    }
}

/// Annual fee date: the first day of the expiry month, next year once this year's has passed.
pub fn annual_fee_date(expiry_month: u32, today: NaiveDate) -> Result<NaiveDate> {
    let month = validate_month(expiry_month)?;
    let this_year = first_of_month(today.year(), month)?;
    if this_year >= today {
        Ok(this_year)
    } else {
        first_of_month(today.year() + 1, month)
    }
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(ObligationError::InvalidMonth { month })
}

/// Every obligation dated within `lookahead_days` of `today`, ordered by date.
///
/// Archived instruments, and subscriptions billed to them, are skipped. An invalid day,
/// month or frequency on any input fails the whole call.
pub fn collect_upcoming(
    instruments: &[CreditInstrument],
    subscriptions: &[Subscription],
    records: &[LimitIncreaseRecord],
    today: NaiveDate,
    lookahead_days: u32,
) -> Result<Vec<ObligationEvent>> {
    let window = ReminderWindow::new(today, lookahead_days);
    let mut events = Vec::new();

    for instrument in instruments.iter().filter(|i| !i.is_archived) {
        if !instrument.is_paid {
            let due = next_occurrence(instrument.due_day, today, true)?;
            push_event(
                &mut events,
                &window,
                instrument.id,
                instrument.id,
                ObligationKind::Payment,
                due,
                Some(instrument.current_usage),
            );
        }

        if instrument.annual_fee_reminder_enabled {
            let date = annual_fee_date(instrument.expiry_month, today)?;
            push_event(
                &mut events,
                &window,
                instrument.id,
                instrument.id,
                ObligationKind::AnnualFee,
                date,
                instrument.annual_fee,
            );
        }

        if instrument.limit_increase_reminder_enabled {
            if let Some(date) = next_limit_increase_date(instrument, records)? {
                push_event(
                    &mut events,
                    &window,
                    instrument.id,
                    instrument.id,
                    ObligationKind::LimitIncrease,
                    date,
                    None,
                );
            }
        }
    }

    let archived: HashSet<InstrumentId> = instruments
        .iter()
        .filter(|i| i.is_archived)
        .map(|i| i.id)
        .collect();

    for subscription in subscriptions
        .iter()
        .filter(|s| s.is_active && !archived.contains(&s.card_id))
    {
        push_event(
            &mut events,
            &window,
            subscription.card_id,
            subscription.id,
            ObligationKind::SubscriptionRenewal,
            subscription.next_billing_date,
            Some(subscription.amount),
        );
    }

    events.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then(a.kind.cmp(&b.kind))
            .then(a.instrument_id.cmp(&b.instrument_id))
            .then(a.id.cmp(&b.id))
    });

    debug!(
        instruments = instruments.len(),
        subscriptions = subscriptions.len(),
        upcoming = events.len(),
        %today,
        "collected upcoming obligations"
    );

    Ok(events)
}

/// upcoming obligations of a single card
pub fn upcoming_for(events: &[ObligationEvent], instrument_id: InstrumentId) -> Vec<ObligationEvent> {
    events
        .iter()
        .filter(|e| e.instrument_id == instrument_id)
        .cloned()
        .collect()
}

fn push_event(
    events: &mut Vec<ObligationEvent>,
    window: &ReminderWindow,
    instrument_id: InstrumentId,
    source_id: Uuid,
    kind: ObligationKind,
    date: NaiveDate,
    amount: Option<Money>,
) {
    let Some(days_remaining) = window.days_remaining(date) else {
        return;
    };
    events.push(ObligationEvent {
        id: format!("{}:{}:{}", kind, source_id, date),
        instrument_id,
        source_id,
        kind,
        date,
        days_remaining,
        amount,
    });
}
