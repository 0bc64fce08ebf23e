//! Serializable views handed to the presentation layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::{days_between, next_occurrence};
use crate::config::TrackerConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{ObligationError, Result};
use crate::limits::{aggregate, effective_limit, overall_position, SharedLimitGroup};
use crate::reminders::{collect_upcoming, upcoming_for, ObligationEvent};
use crate::store::Portfolio;
use crate::types::{BankId, InstrumentId, UtilizationState};

/// home dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub as_of: NaiveDate,
    pub base_currency: String,
    pub active_cards: usize,
    pub total_limit: Money,
    pub total_usage: Money,
    pub available_credit: Money,
    pub utilization_rate: Rate,
    pub utilization_state: UtilizationState,
    pub shared_groups: Vec<SharedGroupView>,
    pub upcoming: Vec<ObligationEvent>,
    /// sum of amounts attached to upcoming obligations
    pub upcoming_total: Money,
}

/// linked-limits screen row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedGroupView {
    pub bank_id: BankId,
    pub shared_limit: Money,
    pub total_usage: Money,
    pub available_credit: Money,
    pub utilization_state: UtilizationState,
    pub members: Vec<InstrumentId>,
}

impl From<&SharedLimitGroup> for SharedGroupView {
    fn from(group: &SharedLimitGroup) -> Self {
        Self {
            bank_id: group.bank_id.clone(),
            shared_limit: group.shared_limit,
            total_usage: group.total_usage,
            available_credit: group.available_credit(),
            utilization_state: group.utilization_state(),
            members: group.member_ids(),
        }
    }
}

/// card detail screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardDetailView {
    pub id: InstrumentId,
    pub name: String,
    pub bank_id: BankId,
    pub uses_shared_limit: bool,
    /// group figures for shared cards, the card's own otherwise
    pub limit: Money,
    pub usage: Money,
    pub available_credit: Money,
    pub utilization_state: UtilizationState,
    pub next_due_date: NaiveDate,
    pub days_until_due: i64,
    pub upcoming: Vec<ObligationEvent>,
    /// installment charges dated after `as_of`
    pub pending_installments: usize,
    pub pending_installment_total: Money,
}

impl DashboardView {
    pub fn build(portfolio: &Portfolio, today: NaiveDate, config: &TrackerConfig) -> Result<Self> {
        let overall = overall_position(&portfolio.instruments);
        let upcoming = collect_upcoming(
            &portfolio.instruments,
            &portfolio.subscriptions,
            &portfolio.limit_increase_records,
            today,
            config.lookahead_days,
        )?;
        let upcoming_total: Money = upcoming.iter().filter_map(|e| e.amount).sum();

        Ok(Self {
            as_of: today,
            base_currency: config.base_currency.clone(),
            active_cards: portfolio.active_instruments().count(),
            total_limit: overall.limit,
            total_usage: overall.usage,
            available_credit: overall.available_credit(),
            utilization_rate: overall.utilization_rate(),
            utilization_state: overall.utilization_state(),
            shared_groups: aggregate(&portfolio.instruments)
                .values()
                .map(SharedGroupView::from)
                .collect(),
            upcoming,
            upcoming_total,
        })
    }

    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl CardDetailView {
    pub fn build(
        portfolio: &Portfolio,
        instrument_id: InstrumentId,
        today: NaiveDate,
        config: &TrackerConfig,
    ) -> Result<Self> {
        let instrument = portfolio
            .instrument(instrument_id)
            .ok_or(ObligationError::InstrumentNotFound { id: instrument_id })?;
        let position = effective_limit(instrument_id, &portfolio.instruments)?;
        let next_due_date = next_occurrence(instrument.due_day, today, true)?;

        let upcoming = collect_upcoming(
            &portfolio.instruments,
            &portfolio.subscriptions,
            &portfolio.limit_increase_records,
            today,
            config.lookahead_days,
        )?;

        let pending: Vec<Money> = portfolio
            .transactions_for(instrument_id)
            .filter(|t| t.is_installment() && t.date > today)
            .map(|t| t.amount)
            .collect();

        Ok(Self {
            id: instrument.id,
            name: instrument.name.clone(),
            bank_id: instrument.bank_id.clone(),
            uses_shared_limit: instrument.shares_limit(),
            limit: position.limit,
            usage: position.usage,
            available_credit: position.available_credit(),
            utilization_state: position.utilization_state(),
            next_due_date,
            days_until_due: days_between(today, next_due_date),
            upcoming: upcoming_for(&upcoming, instrument_id),
            pending_installments: pending.len(),
            pending_installment_total: pending.iter().sum(),
        })
    }

    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
