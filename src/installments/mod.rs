pub mod scheduler;

use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::start_of_day;
use crate::decimal::{ExchangeRate, Money};
use crate::errors::{ObligationError, Result};
use crate::model::{InstallmentTag, Transaction};
use crate::types::{InstrumentId, PlanId};

pub use scheduler::InstallmentScheduler;

/// purchase-plus-tenor declaration handed to the scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentRequest {
    pub plan_id: PlanId,
    pub card_id: InstrumentId,
    pub description: String,
    /// purchase amount in `currency`
    pub total_amount: Money,
    pub total_months: u32,
    pub is_zero_percent: bool,
    /// bank-quoted monthly amount in the base currency, interest included
    pub custom_monthly_amount: Option<Money>,
    /// installments already paid before the plan was entered
    pub paid_months: u32,
    /// one-time fee in the base currency, charged on `start_date`
    pub admin_fee: Money,
    pub start_date: NaiveDate,
    /// day-of-month charges land on; defaults to the day of `start_date`
    pub billing_day: Option<u32>,
    pub currency: String,
    pub exchange_rate: ExchangeRate,
}

impl InstallmentRequest {
    pub fn builder() -> InstallmentRequestBuilder {
        InstallmentRequestBuilder::new()
    }
}

/// builder for installment requests
#[derive(Debug, Clone, Default)]
pub struct InstallmentRequestBuilder {
    plan_id: Option<PlanId>,
    card_id: Option<InstrumentId>,
    description: Option<String>,
    total_amount: Option<Money>,
    total_months: Option<u32>,
    is_zero_percent: bool,
    custom_monthly_amount: Option<Money>,
    paid_months: u32,
    admin_fee: Option<Money>,
    start_date: Option<NaiveDate>,
    billing_day: Option<u32>,
    currency: Option<String>,
    exchange_rate: Option<ExchangeRate>,
}

impl InstallmentRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// fix the plan id; a fresh one is generated otherwise
    pub fn plan_id(mut self, plan_id: PlanId) -> Self {
        self.plan_id = Some(plan_id);
        self
    }

    pub fn card(mut self, card_id: InstrumentId) -> Self {
        self.card_id = Some(card_id);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn amount(mut self, amount: Money) -> Self {
        self.total_amount = Some(amount);
        self
    }

    pub fn months(mut self, months: u32) -> Self {
        self.total_months = Some(months);
        self
    }

    pub fn zero_percent(mut self) -> Self {
        self.is_zero_percent = true;
        self.custom_monthly_amount = None;
        self
    }

    pub fn monthly_amount(mut self, amount: Money) -> Self {
        self.is_zero_percent = false;
        self.custom_monthly_amount = Some(amount);
        self
    }

    pub fn paid_months(mut self, paid: u32) -> Self {
        self.paid_months = paid;
        self
    }

    pub fn admin_fee(mut self, fee: Money) -> Self {
        self.admin_fee = Some(fee);
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn billing_day(mut self, day: u32) -> Self {
        self.billing_day = Some(day);
        self
    }

    /// foreign-currency purchase converted at `rate`
    pub fn currency(mut self, currency: impl Into<String>, rate: ExchangeRate) -> Self {
        self.currency = Some(currency.into());
        self.exchange_rate = Some(rate);
        self
    }

    /// build, requiring an explicit start date
    pub fn build(self) -> Result<InstallmentRequest> {
        let start_date = self.start_date.ok_or(ObligationError::InvalidConfiguration {
            message: "Start date required".to_string(),
        })?;
        self.finish(start_date)
    }

    /// build, defaulting the start date to the provider's current day
    pub fn build_with_time(self, time_provider: &SafeTimeProvider) -> Result<InstallmentRequest> {
        let start_date = self
            .start_date
            .unwrap_or_else(|| start_of_day(time_provider.now()));
        self.finish(start_date)
    }

    fn finish(self, start_date: NaiveDate) -> Result<InstallmentRequest> {
        let card_id = self.card_id.ok_or(ObligationError::InvalidConfiguration {
            message: "Card required".to_string(),
        })?;

        let total_amount = self.total_amount.ok_or(ObligationError::InvalidConfiguration {
            message: "Amount required".to_string(),
        })?;

        let total_months = self.total_months.ok_or(ObligationError::InvalidConfiguration {
            message: "Tenor required".to_string(),
        })?;

        Ok(InstallmentRequest {
            plan_id: self.plan_id.unwrap_or_else(Uuid::new_v4),
            card_id,
            description: self.description.unwrap_or_else(|| "Installment".to_string()),
            total_amount,
            total_months,
            is_zero_percent: self.is_zero_percent,
            custom_monthly_amount: self.custom_monthly_amount,
            paid_months: self.paid_months,
            admin_fee: self.admin_fee.unwrap_or(Money::ZERO),
            start_date,
            billing_day: self.billing_day,
            // empty currency means the scheduler's base currency
            currency: self.currency.unwrap_or_default(),
            exchange_rate: self.exchange_rate.unwrap_or(ExchangeRate::PAR),
        })
    }
}

/// installment plan as declared at creation time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentPlan {
    pub id: PlanId,
    pub card_id: InstrumentId,
    pub description: String,
    /// purchase amount in the transaction's own currency
    pub original_amount: Money,
    pub currency: String,
    pub exchange_rate: ExchangeRate,
    /// purchase amount converted to the base currency
    pub converted_amount: Money,
    pub base_currency: String,
    pub total_months: u32,
    pub monthly_amount: Money,
    pub is_zero_percent: bool,
    /// 1-based index of the first unpaid installment
    pub start_month: u32,
    pub admin_fee: Money,
    pub start_date: NaiveDate,
    pub billing_day: u32,
}

impl InstallmentPlan {
    pub fn remaining_months(&self) -> u32 {
        self.total_months - (self.start_month - 1)
    }

    fn tag(&self, installment_number: Option<u32>) -> InstallmentTag {
        InstallmentTag {
            plan_id: self.id,
            installment_number,
            total_months: self.total_months,
        }
    }
}

/// one generated monthly charge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentInstance {
    pub plan_id: PlanId,
    pub installment_number: u32,
    pub due_date: NaiveDate,
    pub amount: Money,
}

/// one-time admin fee, never amortized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminFeeCharge {
    pub plan_id: PlanId,
    pub date: NaiveDate,
    pub amount: Money,
}

/// plan plus every charge the caller has to persist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledPlan {
    pub plan: InstallmentPlan,
    pub instances: Vec<InstallmentInstance>,
    pub admin_fee: Option<AdminFeeCharge>,
}

impl ScheduledPlan {
    /// sum of the monthly charges still to come
    pub fn installments_total(&self) -> Money {
        self.instances.iter().map(|i| i.amount).sum()
    }

    /// monthly charges plus the admin fee
    pub fn total_scheduled(&self) -> Money {
        self.installments_total() + self.admin_fee.as_ref().map(|f| f.amount).unwrap_or(Money::ZERO)
    }

    /// Ordinary transactions tagged with the plan id.
    ///
    /// Transaction ids are derived from the plan id, so converting the same plan twice yields
    /// the same records.
    pub fn to_transactions(&self) -> Vec<Transaction> {
        let plan = &self.plan;
        let mut transactions = Vec::with_capacity(self.instances.len() + 1);

        if let Some(fee) = &self.admin_fee {
            transactions.push(Transaction {
                id: Uuid::new_v5(&plan.id, b"admin-fee"),
                card_id: plan.card_id,
                date: fee.date,
                amount: fee.amount,
                currency: plan.base_currency.clone(),
                exchange_rate: ExchangeRate::PAR,
                description: format!("{} admin fee", plan.description),
                installment: Some(plan.tag(None)),
                subscription_id: None,
            });
        }

        for instance in &self.instances {
            let key = format!("installment-{}", instance.installment_number);
            transactions.push(Transaction {
                id: Uuid::new_v5(&plan.id, key.as_bytes()),
                card_id: plan.card_id,
                date: instance.due_date,
                amount: instance.amount,
                currency: plan.currency.clone(),
                exchange_rate: plan.exchange_rate,
                description: format!(
                    "{} ({}/{})",
                    plan.description, instance.installment_number, plan.total_months
                ),
                installment: Some(plan.tag(Some(instance.installment_number))),
                subscription_id: None,
            });
        }

        transactions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use hourglass_rs::TimeSource;

    #[test]
    fn test_builder_requires_fields() {
        let missing_card = InstallmentRequest::builder()
            .amount(Money::from_major(1_000_000))
            .months(3)
            .start_date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
            .build();
        assert_eq!(
            missing_card,
            Err(ObligationError::InvalidConfiguration {
                message: "Card required".to_string()
            })
        );

        let missing_date = InstallmentRequest::builder()
            .card(Uuid::new_v4())
            .amount(Money::from_major(1_000_000))
            .months(3)
            .build();
        assert!(matches!(missing_date, Err(ObligationError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_builder_defaults() {
        let plan_id = Uuid::new_v4();
        let request = InstallmentRequest::builder()
            .plan_id(plan_id)
            .card(Uuid::new_v4())
            .amount(Money::from_major(600_000))
            .months(6)
            .start_date(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap())
            .build()
            .unwrap();

        assert_eq!(request.plan_id, plan_id);
        assert_eq!(request.description, "Installment");
        assert_eq!(request.paid_months, 0);
        assert_eq!(request.admin_fee, Money::ZERO);
        assert_eq!(request.billing_day, None);
        assert!(request.currency.is_empty());
        assert_eq!(request.exchange_rate, ExchangeRate::PAR);
        assert!(!request.is_zero_percent);
    }

    #[test]
    fn test_start_date_from_time_provider() {
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 5, 31, 23, 59, 0).unwrap(),
        ));
        let builder = InstallmentRequest::builder()
            .card(Uuid::new_v4())
            .amount(Money::from_major(1_000_000))
            .months(3)
            .zero_percent();

        let request = builder.clone().build_with_time(&time).unwrap();
        assert_eq!(request.start_date, NaiveDate::from_ymd_opt(2024, 5, 31).unwrap());

        time.test_control().unwrap().advance(Duration::minutes(2));
        let request = builder.build_with_time(&time).unwrap();
        assert_eq!(request.start_date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    }
}
