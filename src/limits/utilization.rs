use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::types::UtilizationState;

/// a limit together with what has been drawn against it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitPosition {
    pub limit: Money,
    pub usage: Money,
}

impl LimitPosition {
    pub fn new(limit: Money, usage: Money) -> Self {
        Self { limit, usage }
    }

    /// remaining credit, negative when over the limit
    pub fn available_credit(&self) -> Money {
        self.limit - self.usage
    }

    pub fn utilization_rate(&self) -> Rate {
        utilization_rate(self.usage, self.limit)
    }

    pub fn utilization_state(&self) -> UtilizationState {
        utilization_state(self.usage, self.limit)
    }

    pub fn is_overlimit(&self) -> bool {
        self.usage > self.limit
    }
}

/// usage as a fraction of the limit; zero when there is no limit
pub fn utilization_rate(usage: Money, limit: Money) -> Rate {
    usage.ratio_of(limit).unwrap_or(Rate::ZERO)
}

/// bucket usage into a utilization state
pub fn utilization_state(usage: Money, limit: Money) -> UtilizationState {
    if usage.is_zero() || usage.is_negative() {
        return UtilizationState::Unused;
    }
    if limit.is_zero() {
        return UtilizationState::Overlimit;
    }

    let rate = utilization_rate(usage, limit);
    if rate < Rate::from_percentage(30) {
        UtilizationState::Low
    } else if rate < Rate::from_percentage(70) {
        UtilizationState::Moderate
    } else if rate < Rate::from_percentage(90) {
        UtilizationState::High
    } else if rate <= Rate::from_percentage(100) {
        UtilizationState::Maxed
    } else {
        UtilizationState::Overlimit
    }
}
