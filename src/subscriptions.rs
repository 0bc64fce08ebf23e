use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::calendar::{add_months_anchored, clamp_day, next_occurrence, validate_day};
use crate::decimal::{ExchangeRate, Money};
use crate::errors::{ObligationError, Result};
use crate::model::{Subscription, Transaction};
use crate::types::{BillingCycle, InstrumentId};

/// First billing date strictly after `from`.
///
/// Monthly subscriptions take the next occurrence of the billing day; yearly ones bill on
/// the billing day of `from`'s month, a year later if that day has already come.
pub fn initial_billing_date(billing_day: u32, cycle: BillingCycle, from: NaiveDate) -> Result<NaiveDate> {
    match cycle {
        BillingCycle::Monthly => next_occurrence(billing_day, from, false),
        BillingCycle::Yearly => {
            let candidate = clamp_day(from.year(), from.month(), billing_day)?;
            if candidate > from {
                Ok(candidate)
            } else {
                add_months_anchored(candidate, cycle.months(), billing_day)
            }
        }
    }
}

impl Subscription {
    /// active subscription whose first charge is the next billing day after `from`
    pub fn new(
        card_id: InstrumentId,
        name: impl Into<String>,
        amount: Money,
        billing_cycle: BillingCycle,
        billing_day: u32,
        from: NaiveDate,
    ) -> Result<Self> {
        if amount.is_negative() {
            return Err(ObligationError::InvalidAmount { amount });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            card_id,
            name: name.into(),
            amount,
            billing_cycle,
            billing_day,
            next_billing_date: initial_billing_date(billing_day, billing_cycle, from)?,
            is_active: true,
        })
    }
}

/// outcome of rolling a subscription forward to `today`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingAdvance {
    pub subscription: Subscription,
    /// billing dates that fired, oldest first
    pub charged_on: Vec<NaiveDate>,
}

impl BillingAdvance {
    /// the subscription as-is, nothing fired
    pub fn unchanged(subscription: &Subscription) -> Self {
        Self {
            subscription: subscription.clone(),
            charged_on: Vec::new(),
        }
    }

    pub fn advanced(&self) -> bool {
        !self.charged_on.is_empty()
    }

    /// one transaction per fired billing date, ids derived from the subscription and date
    pub fn to_transactions(&self, base_currency: &str) -> Vec<Transaction> {
        let sub = &self.subscription;
        self.charged_on
            .iter()
            .map(|date| Transaction {
                id: Uuid::new_v5(&sub.id, date.to_string().as_bytes()),
                card_id: sub.card_id,
                date: *date,
                amount: sub.amount,
                currency: base_currency.to_string(),
                exchange_rate: ExchangeRate::PAR,
                description: sub.name.clone(),
                installment: None,
                subscription_id: Some(sub.id),
            })
            .collect()
    }
}

/// Advance `next_billing_date` past `today`.
///
/// Every billing date on or before `today` counts as fired and steps the subscription one
/// cycle, re-anchored on the billing day so a day-31 subscription returns to the 31st after
/// a short month. Inactive subscriptions come back unchanged.
pub fn advance_billing_date(subscription: &Subscription, today: NaiveDate) -> Result<BillingAdvance> {
    if !subscription.is_active {
        return Ok(BillingAdvance::unchanged(subscription));
    }

    let mut next = subscription.clone();
    let mut charged_on = Vec::new();

    let billing_day = validate_day(subscription.billing_day)?;
    let step = subscription.billing_cycle.months();

    while next.next_billing_date <= today {
        charged_on.push(next.next_billing_date);
        next.next_billing_date = add_months_anchored(next.next_billing_date, step, billing_day)?;
    }

    if !charged_on.is_empty() {
        debug!(
            subscription_id = %subscription.id,
            fired = charged_on.len(),
            next_billing_date = %next.next_billing_date,
            "advanced subscription"
        );
    }

    Ok(BillingAdvance {
        subscription: next,
        charged_on,
    })
}
