use thiserror::Error;
use uuid::Uuid;

use crate::decimal::{ExchangeRate, Money};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ObligationError {
    #[error("invalid day of month: {day} (expected 1-31)")]
    InvalidDayOfMonth {
        day: u32,
    },

    #[error("invalid month: {month} (expected 1-12)")]
    InvalidMonth {
        month: u32,
    },

    #[error("date out of range: {date} plus {months} months")]
    DateOutOfRange {
        date: chrono::NaiveDate,
        months: u32,
    },

    #[error("invalid tenor: {total_months} months")]
    InvalidTenor {
        total_months: u32,
    },

    #[error("tenor exhausted: {paid_months} of {total_months} months already paid")]
    TenorExhausted {
        paid_months: u32,
        total_months: u32,
    },

    #[error("invalid limit increase frequency: {frequency} months")]
    InvalidFrequency {
        frequency: u32,
    },

    #[error("monthly amount required for interest-bearing installment")]
    MissingMonthlyAmount,

    #[error("invalid exchange rate: {rate}")]
    InvalidExchangeRate {
        rate: ExchangeRate,
    },

    #[error("invalid amount: {amount}")]
    InvalidAmount {
        amount: Money,
    },

    #[error("instrument not found: {id}")]
    InstrumentNotFound {
        id: Uuid,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("store error: {message}")]
    Store {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, ObligationError>;
