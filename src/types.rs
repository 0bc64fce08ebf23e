use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// unique identifier for a credit card record
pub type InstrumentId = Uuid;

/// unique identifier for an installment plan
pub type PlanId = Uuid;

/// unique identifier for a subscription
pub type SubscriptionId = Uuid;

/// unique identifier for a transaction
pub type TransactionId = Uuid;

/// issuing bank key, e.g. "bca"
pub type BankId = String;

/// subscription billing cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Yearly,
}

impl BillingCycle {
    /// calendar months between two charges
    pub fn months(&self) -> u32 {
        match self {
            BillingCycle::Monthly => 1,
            BillingCycle::Yearly => 12,
        }
    }
}

/// kind of upcoming obligation.
///
/// Declaration order is the tie-break order for reminders falling on the same date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObligationKind {
    Payment,
    LimitIncrease,
    AnnualFee,
    SubscriptionRenewal,
}

impl ObligationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObligationKind::Payment => "payment",
            ObligationKind::LimitIncrease => "limitIncrease",
            ObligationKind::AnnualFee => "annualFee",
            ObligationKind::SubscriptionRenewal => "subscriptionRenewal",
        }
    }
}

impl fmt::Display for ObligationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// utilization buckets for a card or a shared-limit group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UtilizationState {
    Unused,    // 0%
    Low,       // < 30%
    Moderate,  // 30-70%
    High,      // 70-90%
    Maxed,     // 90-100%
    Overlimit, // > 100%
}

/// how a zero-percent installment spreads rounding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ZeroPercentRounding {
    /// every month charges the rounded-up figure (can over-collect)
    #[default]
    CeilingEveryMonth,
    /// months charge the rounded-down figure and the final one takes the remainder,
    /// so the plan sums to the principal
    AdjustFinalInstallment,
}
