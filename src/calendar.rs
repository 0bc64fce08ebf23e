//! Calendar arithmetic for day-of-month schedules.
//!
//! Every recurring configuration in the tracker (card due days, installment billing days,
//! subscription billing days) is a day-of-month between 1 and 31. Resolving one against a
//! reference date clamps to the month's last day instead of spilling into the next month.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::errors::{ObligationError, Result};

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// number of days in `month` of `year`; months outside 1-12 are rejected
pub fn days_in_month(year: i32, month: u32) -> Result<u32> {
    let days = match validate_month(month)? {
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 31,
    };
    Ok(days)
}

/// reject a day-of-month outside 1-31
pub fn validate_day(day: u32) -> Result<u32> {
    if (1..=31).contains(&day) {
        Ok(day)
    } else {
        Err(ObligationError::InvalidDayOfMonth { day })
    }
}

/// reject a month outside 1-12
pub fn validate_month(month: u32) -> Result<u32> {
    if (1..=12).contains(&month) {
        Ok(month)
    } else {
        Err(ObligationError::InvalidMonth { month })
    }
}

/// `day` in the given month, clamped to the month's last day
pub fn clamp_day(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    validate_day(day)?;
    let day = day.min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day).ok_or(ObligationError::InvalidDayOfMonth { day })
}

/// Next calendar date falling on `day` relative to `from`.
///
/// The candidate is `day` in `from`'s month (clamped). It is kept when it lies after `from`,
/// or when it equals `from` and `inclusive` is set; otherwise the same day of the following
/// month is returned, clamped to that month's length.
pub fn next_occurrence(day: u32, from: NaiveDate, inclusive: bool) -> Result<NaiveDate> {
    let day = validate_day(day)?;
    let candidate = clamp_day(from.year(), from.month(), day)?;

    let passed = if inclusive { candidate < from } else { candidate <= from };
    if !passed {
        return Ok(candidate);
    }

    let (year, month) = shift_month(from.year(), from.month(), 1);
    clamp_day(year, month, day)
}

/// add calendar months, clamping the day to the target month's length
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    add_months_anchored(date, months, date.day())
}

/// Add calendar months and land on `anchor_day` (clamped).
///
/// A schedule billed on the 31st passes through February as the 28th/29th and comes back
/// to the 31st in March, which repeated `add_months` calls would not do.
pub fn add_months_anchored(date: NaiveDate, months: u32, anchor_day: u32) -> Result<NaiveDate> {
    validate_day(anchor_day)?;
    let (year, month) = shift_month(date.year(), date.month(), months);
    clamp_day(year, month, anchor_day).map_err(|_| ObligationError::DateOutOfRange { date, months })
}

/// calendar date of a timestamp, time of day dropped
pub fn start_of_day(timestamp: DateTime<Utc>) -> NaiveDate {
    timestamp.date_naive()
}

/// whole days from `from` to `to`; negative when `to` is earlier
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

fn shift_month(year: i32, month: u32, months: u32) -> (i32, u32) {
    let index = year as i64 * 12 + (month as i64 - 1) + months as i64;
    ((index.div_euclid(12)) as i32, (index.rem_euclid(12) + 1) as u32)
}
