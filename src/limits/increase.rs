use chrono::NaiveDate;

use crate::calendar::add_months;
use crate::errors::{ObligationError, Result};
use crate::model::{CreditInstrument, LimitIncreaseRecord};

/// reject a non-positive request cadence
pub fn validate_frequency(frequency: u32) -> Result<u32> {
    if frequency == 0 {
        return Err(ObligationError::InvalidFrequency { frequency });
    }
    Ok(frequency)
}

/// most recent record for the instrument by `action_date`, falling back to `request_date`
pub fn latest_record<'a>(
    instrument: &CreditInstrument,
    records: &'a [LimitIncreaseRecord],
) -> Option<&'a LimitIncreaseRecord> {
    records
        .iter()
        .filter(|r| r.instrument_id == instrument.id)
        .max_by_key(|r| r.action_date.unwrap_or(r.request_date))
}

/// Date the instrument next becomes eligible for a limit increase.
///
/// With history, the latest record's date plus its frequency in calendar months; without
/// history, the date stored on the instrument.
pub fn next_limit_increase_date(
    instrument: &CreditInstrument,
    records: &[LimitIncreaseRecord],
) -> Result<Option<NaiveDate>> {
    match latest_record(instrument, records) {
        Some(record) => {
            let frequency = validate_frequency(record.frequency)?;
            add_months(record.effective_date(), frequency).map(Some)
        }
        None => Ok(instrument.next_limit_increase_date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Money;
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn card() -> CreditInstrument {
        CreditInstrument::new("Platinum", "bca", Money::from_major(30_000_000), 17)
            .with_limit_increase_reminder(Some(date(2024, 3, 1)))
    }

    #[test]
    fn test_action_date_plus_frequency() {
        let card = card();
        let record = LimitIncreaseRecord::new(card.id, Utc.with_ymd_and_hms(2024, 1, 3, 8, 0, 0).unwrap(), 6)
            .with_action_date(Utc.with_ymd_and_hms(2024, 1, 10, 14, 0, 0).unwrap());

        let next = next_limit_increase_date(&card, &[record]).unwrap();
        assert_eq!(next, Some(date(2024, 7, 10)));
    }

    #[test]
    fn test_latest_record_wins() {
        let card = card();
        let other = CreditInstrument::new("Other", "bni", Money::from_major(1), 1);
        let records = vec![
            LimitIncreaseRecord::new(card.id, Utc.with_ymd_and_hms(2023, 5, 1, 0, 0, 0).unwrap(), 3),
            LimitIncreaseRecord::new(card.id, Utc.with_ymd_and_hms(2023, 2, 1, 0, 0, 0).unwrap(), 3)
                .with_action_date(Utc.with_ymd_and_hms(2023, 8, 20, 0, 0, 0).unwrap()),
            LimitIncreaseRecord::new(other.id, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(), 1),
        ];

        let latest = latest_record(&card, &records).unwrap();
        assert_eq!(latest.id, records[1].id);
        assert_eq!(next_limit_increase_date(&card, &records).unwrap(), Some(date(2023, 11, 20)));
    }

    #[test]
    fn test_calendar_month_addition_clamps() {
        let card = card();
        let record = LimitIncreaseRecord::new(card.id, Utc.with_ymd_and_hms(2023, 8, 31, 0, 0, 0).unwrap(), 6);
        assert_eq!(next_limit_increase_date(&card, &[record]).unwrap(), Some(date(2024, 2, 29)));
    }

    #[test]
    fn test_no_history_uses_stored_date() {
        let card = card();
        assert_eq!(next_limit_increase_date(&card, &[]).unwrap(), Some(date(2024, 3, 1)));

        let bare = CreditInstrument::new("Bare", "bca", Money::from_major(1), 1);
        assert_eq!(next_limit_increase_date(&bare, &[]).unwrap(), None);
    }

    #[test]
    fn test_zero_frequency_rejected() {
        let card = card();
        let record = LimitIncreaseRecord::new(card.id, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(), 0);
        assert_eq!(
            next_limit_increase_date(&card, &[record]),
            Err(ObligationError::InvalidFrequency { frequency: 0 })
        );
    }
}
