use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{ObligationError, Result};
use crate::reminders::DEFAULT_LOOKAHEAD_DAYS;
use crate::types::ZeroPercentRounding;

/// longest lookahead the dashboard accepts
pub const MAX_LOOKAHEAD_DAYS: u32 = 366;

/// tracker configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// currency amounts are reported in, e.g. "IDR"
    pub base_currency: String,
    /// horizon for upcoming obligations, inclusive of the last day
    pub lookahead_days: u32,
    pub installments: InstallmentConfig,
}

/// installment rounding configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallmentConfig {
    /// zero-percent monthly amounts are rounded to a multiple of this
    pub rounding_unit: Money,
    pub rounding: ZeroPercentRounding,
}

impl Default for InstallmentConfig {
    fn default() -> Self {
        Self {
            rounding_unit: Money::from_major(1_000),
            rounding: ZeroPercentRounding::CeilingEveryMonth,
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::indonesia()
    }
}

impl TrackerConfig {
    /// rupiah-denominated tracker, the shape the dashboard ships with
    pub fn indonesia() -> Self {
        Self {
            base_currency: "IDR".to_string(),
            lookahead_days: DEFAULT_LOOKAHEAD_DAYS,
            installments: InstallmentConfig::default(),
        }
    }

    /// whole-unit shares with the final installment taking the remainder
    pub fn exact_rounding(base_currency: impl Into<String>) -> Self {
        Self {
            base_currency: base_currency.into(),
            lookahead_days: DEFAULT_LOOKAHEAD_DAYS,
            installments: InstallmentConfig {
                rounding_unit: Money::ONE,
                rounding: ZeroPercentRounding::AdjustFinalInstallment,
            },
        }
    }

    pub fn with_lookahead_days(mut self, days: u32) -> Self {
        self.lookahead_days = days;
        self
    }

    pub fn with_rounding_unit(mut self, unit: Money) -> Self {
        self.installments.rounding_unit = unit;
        self
    }

    pub fn with_rounding(mut self, rounding: ZeroPercentRounding) -> Self {
        self.installments.rounding = rounding;
        self
    }

    /// parse and validate a json configuration; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: TrackerConfig = serde_json::from_str(json).map_err(|e| {
            ObligationError::InvalidConfiguration {
                message: e.to_string(),
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_currency.trim().is_empty() {
            return Err(ObligationError::InvalidConfiguration {
                message: "base currency must not be empty".to_string(),
            });
        }
        if self.lookahead_days > MAX_LOOKAHEAD_DAYS {
            return Err(ObligationError::InvalidConfiguration {
                message: format!(
                    "lookahead of {} days exceeds {} days",
                    self.lookahead_days, MAX_LOOKAHEAD_DAYS
                ),
            });
        }
        if !self.installments.rounding_unit.is_positive() {
            return Err(ObligationError::InvalidConfiguration {
                message: format!(
                    "rounding unit must be positive, got {}",
                    self.installments.rounding_unit
                ),
            });
        }
        Ok(())
    }

    /// true when `currency` is the base currency (case-insensitive)
    pub fn is_base_currency(&self, currency: &str) -> bool {
        self.base_currency.eq_ignore_ascii_case(currency)
    }
}
