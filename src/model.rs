use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::start_of_day;
use crate::decimal::{ExchangeRate, Money};
use crate::types::{BankId, BillingCycle, InstrumentId, PlanId, SubscriptionId, TransactionId};

/// a tracked credit card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditInstrument {
    pub id: InstrumentId,
    pub name: String,
    pub bank_id: BankId,
    pub credit_limit: Money,
    /// may exceed the limit
    pub current_usage: Money,
    /// 1-31, clamped to short months when resolved
    pub due_day: u32,
    pub use_shared_limit: bool,
    pub is_paid: bool,
    pub is_archived: bool,

    // annual fee reminder
    pub annual_fee_reminder_enabled: bool,
    /// 1-12
    pub expiry_month: u32,
    pub annual_fee: Option<Money>,

    // limit increase reminder
    pub limit_increase_reminder_enabled: bool,
    pub next_limit_increase_date: Option<NaiveDate>,
}

impl CreditInstrument {
    /// create an active, unpaid card with reminders disabled
    pub fn new(name: impl Into<String>, bank_id: impl Into<BankId>, credit_limit: Money, due_day: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            bank_id: bank_id.into(),
            credit_limit,
            current_usage: Money::ZERO,
            due_day,
            use_shared_limit: false,
            is_paid: false,
            is_archived: false,
            annual_fee_reminder_enabled: false,
            expiry_month: 1,
            annual_fee: None,
            limit_increase_reminder_enabled: false,
            next_limit_increase_date: None,
        }
    }

    pub fn with_usage(mut self, usage: Money) -> Self {
        self.current_usage = usage;
        self
    }

    pub fn with_shared_limit(mut self) -> Self {
        self.use_shared_limit = true;
        self
    }

    pub fn with_annual_fee_reminder(mut self, expiry_month: u32, fee: Option<Money>) -> Self {
        self.annual_fee_reminder_enabled = true;
        self.expiry_month = expiry_month;
        self.annual_fee = fee;
        self
    }

    pub fn with_limit_increase_reminder(mut self, next_date: Option<NaiveDate>) -> Self {
        self.limit_increase_reminder_enabled = true;
        self.next_limit_increase_date = next_date;
        self
    }

    pub fn paid(mut self) -> Self {
        self.is_paid = true;
        self
    }

    pub fn archived(mut self) -> Self {
        self.is_archived = true;
        self
    }

    /// true when this card takes part in its bank's shared limit
    pub fn shares_limit(&self) -> bool {
        self.use_shared_limit && !self.is_archived
    }
}

/// append-only history entry of a limit increase request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitIncreaseRecord {
    pub id: Uuid,
    pub instrument_id: InstrumentId,
    pub request_date: DateTime<Utc>,
    pub action_date: Option<DateTime<Utc>>,
    /// months until the next request is allowed
    pub frequency: u32,
}

impl LimitIncreaseRecord {
    pub fn new(instrument_id: InstrumentId, request_date: DateTime<Utc>, frequency: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            instrument_id,
            request_date,
            action_date: None,
            frequency,
        }
    }

    pub fn with_action_date(mut self, action_date: DateTime<Utc>) -> Self {
        self.action_date = Some(action_date);
        self
    }

    /// the date the bank acted on the request, or the request date if it never did
    pub fn effective_date(&self) -> NaiveDate {
        start_of_day(self.action_date.unwrap_or(self.request_date))
    }
}

/// a recurring charge billed to a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub card_id: InstrumentId,
    pub name: String,
    pub amount: Money,
    pub billing_cycle: BillingCycle,
    /// 1-31
    pub billing_day: u32,
    /// sole source of truth for the next charge once the subscription has fired
    pub next_billing_date: NaiveDate,
    pub is_active: bool,
}

/// links a transaction to the installment plan that generated it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentTag {
    pub plan_id: PlanId,
    /// 1-based; `None` for the one-time admin fee
    pub installment_number: Option<u32>,
    pub total_months: u32,
}

/// an ordinary card transaction as the store keeps it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub card_id: InstrumentId,
    pub date: NaiveDate,
    /// amount in the base currency
    pub amount: Money,
    pub currency: String,
    pub exchange_rate: ExchangeRate,
    pub description: String,
    pub installment: Option<InstallmentTag>,
    pub subscription_id: Option<SubscriptionId>,
}

impl Transaction {
    pub fn is_installment(&self) -> bool {
        self.installment.is_some()
    }
}
