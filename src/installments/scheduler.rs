use chrono::Datelike;
use rust_decimal::Decimal;
use tracing::debug;

use crate::calendar::{add_months_anchored, next_occurrence, validate_day};
use crate::config::TrackerConfig;
use crate::decimal::{ExchangeRate, Money};
use crate::errors::{ObligationError, Result};
use crate::installments::{
    AdminFeeCharge, InstallmentInstance, InstallmentPlan, InstallmentRequest, ScheduledPlan,
};
use crate::types::ZeroPercentRounding;

/// expands installment requests into monthly charges
#[derive(Debug, Clone)]
pub struct InstallmentScheduler {
    config: TrackerConfig,
}

impl InstallmentScheduler {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    fn adjusts_final_installment(&self) -> bool {
        self.config.installments.rounding == ZeroPercentRounding::AdjustFinalInstallment
    }

    /// Build the plan and its remaining monthly charges.
    ///
    /// Charges start on the first billing day strictly after `start_date` and advance one
    /// calendar month at a time, each anchored back on the billing day.
    pub fn build_plan(&self, request: &InstallmentRequest) -> Result<ScheduledPlan> {
        let total_months = request.total_months;
        if total_months < 1 {
            return Err(ObligationError::InvalidTenor { total_months });
        }
        if request.paid_months >= total_months {
            return Err(ObligationError::TenorExhausted {
                paid_months: request.paid_months,
                total_months,
            });
        }
        if request.total_amount.is_negative() {
            return Err(ObligationError::InvalidAmount {
                amount: request.total_amount,
            });
        }
        if request.admin_fee.is_negative() {
            return Err(ObligationError::InvalidAmount {
                amount: request.admin_fee,
            });
        }

        let (currency, exchange_rate) = self.resolve_currency(request)?;
        let converted_amount = request.total_amount.convert(exchange_rate);
        let monthly_amount = self.monthly_amount(request, converted_amount)?;

        let billing_day = validate_day(request.billing_day.unwrap_or(request.start_date.day()))?;
        let first_due = next_occurrence(billing_day, request.start_date, false)?;

        let remaining_months = total_months - request.paid_months;
        let first_number = request.paid_months + 1;

        let mut instances = Vec::with_capacity(remaining_months as usize);
        for offset in 0..remaining_months {
            instances.push(InstallmentInstance {
                plan_id: request.plan_id,
                installment_number: first_number + offset,
                due_date: add_months_anchored(first_due, offset, billing_day)?,
                amount: monthly_amount,
            });
        }

        // earlier months are floored, so the remainder is never below the plain share
        if request.is_zero_percent && self.adjusts_final_installment() {
            if let Some(last) = instances.last_mut() {
                let earlier = monthly_amount * Decimal::from(total_months - 1);
                last.amount = converted_amount - earlier;
            }
        }

        let admin_fee = if request.admin_fee.is_positive() {
            Some(AdminFeeCharge {
                plan_id: request.plan_id,
                date: request.start_date,
                amount: request.admin_fee,
            })
        } else {
            None
        };

        debug!(
            plan_id = %request.plan_id,
            remaining_months,
            monthly_amount = %monthly_amount,
            first_due = %first_due,
            "built installment plan"
        );

        Ok(ScheduledPlan {
            plan: InstallmentPlan {
                id: request.plan_id,
                card_id: request.card_id,
                description: request.description.clone(),
                original_amount: request.total_amount,
                currency,
                exchange_rate,
                converted_amount,
                base_currency: self.config.base_currency.clone(),
                total_months,
                monthly_amount,
                is_zero_percent: request.is_zero_percent,
                start_month: first_number,
                admin_fee: request.admin_fee,
                start_date: request.start_date,
                billing_day,
            },
            instances,
            admin_fee,
        })
    }

    /// base-currency purchases always convert at par
    fn resolve_currency(&self, request: &InstallmentRequest) -> Result<(String, ExchangeRate)> {
        let currency = request.currency.trim();
        if currency.is_empty() || self.config.is_base_currency(currency) {
            return Ok((self.config.base_currency.clone(), ExchangeRate::PAR));
        }
        if !request.exchange_rate.is_positive() {
            return Err(ObligationError::InvalidExchangeRate {
                rate: request.exchange_rate,
            });
        }
        Ok((currency.to_uppercase(), request.exchange_rate))
    }

    fn monthly_amount(&self, request: &InstallmentRequest, converted_amount: Money) -> Result<Money> {
        if request.is_zero_percent {
            let share = converted_amount / Decimal::from(request.total_months);
            let unit = self.config.installments.rounding_unit;
            return Ok(if self.adjusts_final_installment() {
                share.floor_to(unit)
            } else {
                share.ceil_to(unit)
            });
        }

        let amount = request
            .custom_monthly_amount
            .ok_or(ObligationError::MissingMonthlyAmount)?;
        if amount.is_negative() {
            return Err(ObligationError::InvalidAmount { amount });
        }
        Ok(amount)
    }
}
