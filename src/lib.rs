pub mod calendar;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod installments;
pub mod limits;
pub mod model;
pub mod reminders;
pub mod store;
pub mod subscriptions;
pub mod tracker;
pub mod types;
pub mod views;

// re-export key types
pub use calendar::{add_months, days_in_month, is_leap_year, next_occurrence};
pub use config::{InstallmentConfig, TrackerConfig};
pub use decimal::{ExchangeRate, Money, Rate};
pub use errors::{ObligationError, Result};
pub use events::{Event, EventStore};
pub use installments::{
    AdminFeeCharge, InstallmentInstance, InstallmentPlan, InstallmentRequest,
    InstallmentScheduler, ScheduledPlan,
};
pub use limits::{
    aggregate, effective_limit, next_limit_increase_date, total_limit, total_usage,
    utilization_state, LimitPosition, SharedLimitGroup,
};
pub use model::{CreditInstrument, InstallmentTag, LimitIncreaseRecord, Subscription, Transaction};
pub use reminders::{collect_upcoming, ObligationEvent, ReminderWindow};
pub use store::{MemoryStore, Portfolio, Store};
pub use subscriptions::{advance_billing_date, BillingAdvance};
pub use tracker::Tracker;
pub use types::{
    BankId, BillingCycle, InstrumentId, ObligationKind, PlanId, SubscriptionId,
    UtilizationState, ZeroPercentRounding,
};
pub use views::{CardDetailView, DashboardView, SharedGroupView};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
