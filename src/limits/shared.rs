use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decimal::{Money, Rate};
use crate::errors::{ObligationError, Result};
use crate::limits::utilization::LimitPosition;
use crate::model::CreditInstrument;
use crate::types::{BankId, InstrumentId, UtilizationState};

/// cards of one bank drawing on a single bank-issued limit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedLimitGroup {
    pub bank_id: BankId,
    /// the limit quoted by the first member, never the sum across members
    pub shared_limit: Money,
    pub total_usage: Money,
    pub members: Vec<CreditInstrument>,
}

impl SharedLimitGroup {
    pub fn position(&self) -> LimitPosition {
        LimitPosition::new(self.shared_limit, self.total_usage)
    }

    pub fn available_credit(&self) -> Money {
        self.position().available_credit()
    }

    pub fn utilization_rate(&self) -> Rate {
        self.position().utilization_rate()
    }

    pub fn utilization_state(&self) -> UtilizationState {
        self.position().utilization_state()
    }

    pub fn member_ids(&self) -> Vec<InstrumentId> {
        self.members.iter().map(|m| m.id).collect()
    }
}

/// Group non-archived shared-limit cards by bank.
///
/// Members keep input order; the first member's limit becomes the group limit because
/// every card under a shared arrangement quotes the same combined figure.
pub fn aggregate(instruments: &[CreditInstrument]) -> BTreeMap<BankId, SharedLimitGroup> {
    let mut groups: BTreeMap<BankId, SharedLimitGroup> = BTreeMap::new();

    for instrument in instruments.iter().filter(|i| i.shares_limit()) {
        let group = groups
            .entry(instrument.bank_id.clone())
            .or_insert_with(|| SharedLimitGroup {
                bank_id: instrument.bank_id.clone(),
                shared_limit: instrument.credit_limit,
                total_usage: Money::ZERO,
                members: Vec::new(),
            });
        group.total_usage += instrument.current_usage;
        group.members.push(instrument.clone());
    }

    debug!(
        instruments = instruments.len(),
        groups = groups.len(),
        "aggregated shared limits"
    );
    groups
}

/// shared-limit group of a single bank, if any of its cards shares a limit
pub fn group_for(instruments: &[CreditInstrument], bank_id: &str) -> Option<SharedLimitGroup> {
    let members: Vec<CreditInstrument> = instruments
        .iter()
        .filter(|i| i.shares_limit() && i.bank_id == bank_id)
        .cloned()
        .collect();

    let first = members.first()?;
    Some(SharedLimitGroup {
        bank_id: first.bank_id.clone(),
        shared_limit: first.credit_limit,
        total_usage: members.iter().map(|m| m.current_usage).sum(),
        members,
    })
}

/// Combined credit limit across active cards.
///
/// A shared bank contributes its group limit once, however many cards it has.
pub fn total_limit(instruments: &[CreditInstrument]) -> Money {
    let groups = aggregate(instruments);
    let mut counted: HashSet<&str> = HashSet::new();
    let mut total = Money::ZERO;

    for instrument in instruments.iter().filter(|i| !i.is_archived) {
        if instrument.shares_limit() {
            if !counted.insert(instrument.bank_id.as_str()) {
                continue;
            }
            if let Some(group) = groups.get(&instrument.bank_id) {
                total += group.shared_limit;
            }
        } else {
            total += instrument.credit_limit;
        }
    }

    total
}

/// combined usage across active cards
pub fn total_usage(instruments: &[CreditInstrument]) -> Money {
    instruments
        .iter()
        .filter(|i| !i.is_archived)
        .map(|i| i.current_usage)
        .sum()
}

/// total limit minus total usage; negative once the wallet is over its limits
pub fn available_credit(instruments: &[CreditInstrument]) -> Money {
    total_limit(instruments) - total_usage(instruments)
}

/// dashboard-wide limit position
pub fn overall_position(instruments: &[CreditInstrument]) -> LimitPosition {
    LimitPosition::new(total_limit(instruments), total_usage(instruments))
}

/// The limit a single card effectively draws on.
///
/// A card under a shared limit reports its group's limit and the group's combined usage.
pub fn effective_limit(
    instrument_id: InstrumentId,
    instruments: &[CreditInstrument],
) -> Result<LimitPosition> {
    let instrument = instruments
        .iter()
        .find(|i| i.id == instrument_id)
        .ok_or(ObligationError::InstrumentNotFound { id: instrument_id })?;

    if instrument.shares_limit() {
        if let Some(group) = group_for(instruments, &instrument.bank_id) {
            return Ok(group.position());
        }
    }

    Ok(LimitPosition::new(instrument.credit_limit, instrument.current_usage))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn shared_group_never_sums_limits(
            limit in 1i64..100_000_000,
            usages in proptest::collection::vec(0i64..50_000_000, 1..8)
        ) {
            let cards: Vec<CreditInstrument> = usages
                .iter()
                .map(|u| {
                    CreditInstrument::new("card", "bca", Money::from_major(limit), 1)
                        .with_usage(Money::from_major(*u))
                        .with_shared_limit()
                })
                .collect();

            let group = group_for(&cards, "bca").unwrap();
            prop_assert_eq!(group.shared_limit, Money::from_major(limit));
            prop_assert_eq!(group.total_usage, Money::from_major(usages.iter().sum::<i64>()));
            prop_assert_eq!(total_limit(&cards), Money::from_major(limit));
            prop_assert_eq!(aggregate(&cards), aggregate(&cards));
        }
    }
}
