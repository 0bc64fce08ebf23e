//! Orchestrating layer between the store and the pure core.
//!
//! Every write follows the same shape: load a full snapshot, compute everything, then hand
//! the complete snapshot back to the store in a single `save_all`. Nothing is written when
//! any computation fails.

use std::collections::HashSet;

use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use tracing::{info, instrument};

use crate::calendar::start_of_day;
use crate::config::TrackerConfig;
use crate::errors::{ObligationError, Result};
use crate::events::{Event, EventStore};
use crate::installments::{InstallmentRequest, InstallmentScheduler, ScheduledPlan};
use crate::reminders::{collect_upcoming, ObligationEvent};
use crate::store::{Portfolio, Store};
use crate::subscriptions::{advance_billing_date, BillingAdvance};
use crate::types::InstrumentId;
use crate::views::{CardDetailView, DashboardView};

pub struct Tracker {
    config: TrackerConfig,
    scheduler: InstallmentScheduler,
    /// committed changes, kept until the caller drains them with `take_events`
    pub events: EventStore,
}

impl Tracker {
    pub fn new(config: TrackerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            scheduler: InstallmentScheduler::new(&config),
            config,
            events: EventStore::new(),
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// the provider's current calendar day
    pub fn today(time_provider: &SafeTimeProvider) -> NaiveDate {
        start_of_day(time_provider.now())
    }

    pub fn upcoming(
        &self,
        portfolio: &Portfolio,
        time_provider: &SafeTimeProvider,
    ) -> Result<Vec<ObligationEvent>> {
        collect_upcoming(
            &portfolio.instruments,
            &portfolio.subscriptions,
            &portfolio.limit_increase_records,
            Self::today(time_provider),
            self.config.lookahead_days,
        )
    }

    pub fn dashboard(
        &self,
        portfolio: &Portfolio,
        time_provider: &SafeTimeProvider,
    ) -> Result<DashboardView> {
        DashboardView::build(portfolio, Self::today(time_provider), &self.config)
    }

    pub fn card_detail(
        &self,
        portfolio: &Portfolio,
        instrument_id: InstrumentId,
        time_provider: &SafeTimeProvider,
    ) -> Result<CardDetailView> {
        CardDetailView::build(portfolio, instrument_id, Self::today(time_provider), &self.config)
    }

    /// Schedule an installment purchase and persist its charges as transactions.
    #[instrument(skip_all, fields(plan_id = %request.plan_id, card_id = %request.card_id))]
    pub fn add_installment<S: Store>(
        &mut self,
        store: &mut S,
        request: &InstallmentRequest,
    ) -> Result<ScheduledPlan> {
        let mut portfolio = store.load()?;

        if portfolio.instrument(request.card_id).is_none() {
            return Err(ObligationError::InstrumentNotFound { id: request.card_id });
        }
        if portfolio.installment_plans.iter().any(|p| p.id == request.plan_id) {
            return Err(ObligationError::InvalidConfiguration {
                message: format!("installment plan {} already recorded", request.plan_id),
            });
        }

        let scheduled = self.scheduler.build_plan(request)?;
        let transactions = scheduled.to_transactions();
        let added = transactions.len();

        portfolio.transactions.extend(transactions);
        portfolio.installment_plans.push(scheduled.plan.clone());
        let subscriptions = portfolio.subscriptions.len();
        store.save_all(portfolio)?;

        info!(transactions = added, "installment plan saved");

        self.events.emit(Event::InstallmentPlanCreated {
            plan_id: scheduled.plan.id,
            card_id: scheduled.plan.card_id,
            monthly_amount: scheduled.plan.monthly_amount,
            remaining_months: scheduled.plan.remaining_months(),
            first_due: scheduled.instances.first().map(|i| i.due_date),
        });
        if let Some(fee) = &scheduled.admin_fee {
            self.events.emit(Event::AdminFeeCharged {
                plan_id: fee.plan_id,
                card_id: scheduled.plan.card_id,
                amount: fee.amount,
                date: fee.date,
            });
        }
        self.events.emit(Event::SnapshotSaved {
            transactions: added,
            subscriptions,
            as_of: scheduled.plan.start_date,
        });

        Ok(scheduled)
    }

    /// Advance every subscription whose billing date has come and record its charges.
    ///
    /// Subscriptions billed to archived cards are left as they are. Returns only the
    /// subscriptions that fired; the store is untouched when none did.
    #[instrument(skip_all)]
    pub fn roll_subscriptions<S: Store>(
        &mut self,
        store: &mut S,
        time_provider: &SafeTimeProvider,
    ) -> Result<Vec<BillingAdvance>> {
        let today = Self::today(time_provider);
        let mut portfolio = store.load()?;

        let archived: HashSet<InstrumentId> = portfolio
            .instruments
            .iter()
            .filter(|i| i.is_archived)
            .map(|i| i.id)
            .collect();

        let advances = portfolio
            .subscriptions
            .iter()
            .map(|s| {
                if archived.contains(&s.card_id) {
                    Ok(BillingAdvance::unchanged(s))
                } else {
                    advance_billing_date(s, today)
                }
            })
            .collect::<Result<Vec<_>>>()?;

        let fired: Vec<BillingAdvance> = advances.iter().filter(|a| a.advanced()).cloned().collect();
        if fired.is_empty() {
            return Ok(fired);
        }

        let mut added = 0;
        for advance in &fired {
            let transactions = advance.to_transactions(&self.config.base_currency);
            added += transactions.len();
            portfolio.transactions.extend(transactions);
        }
        portfolio.subscriptions = advances.into_iter().map(|a| a.subscription).collect();
        let subscriptions = portfolio.subscriptions.len();

        store.save_all(portfolio)?;
        info!(fired = fired.len(), transactions = added, %today, "subscriptions rolled forward");

        for advance in &fired {
            let sub = &advance.subscription;
            self.events.emit_all(advance.charged_on.iter().map(|date| Event::SubscriptionCharged {
                subscription_id: sub.id,
                card_id: sub.card_id,
                amount: sub.amount,
                date: *date,
            }));
            if let Some(first) = advance.charged_on.first() {
                self.events.emit(Event::SubscriptionAdvanced {
                    subscription_id: sub.id,
                    previous_billing_date: *first,
                    next_billing_date: sub.next_billing_date,
                });
            }
        }
        self.events.emit(Event::SnapshotSaved {
            transactions: added,
            subscriptions,
            as_of: today,
        });

        Ok(fired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Money;
    use crate::model::{CreditInstrument, Subscription};
    use crate::store::MemoryStore;
    use crate::types::{BillingCycle, ObligationKind, UtilizationState};
    use chrono::{Duration, TimeZone, Utc};
    use hourglass_rs::TimeSource;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time_at(y: i32, m: u32, d: u32) -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(y, m, d, 18, 30, 0).unwrap()))
    }

    fn portfolio() -> Portfolio {
        let mut portfolio = Portfolio::default();
        portfolio.instruments = vec![
            CreditInstrument::new("BCA Everyday", "bca", Money::from_major(50_000_000), 31)
                .with_usage(Money::from_major(10_000_000))
                .with_shared_limit(),
            CreditInstrument::new("BCA Travel", "bca", Money::from_major(50_000_000), 10)
                .with_usage(Money::from_major(5_000_000))
                .with_shared_limit(),
            CreditInstrument::new("BNI Cashback", "bni", Money::from_major(15_000_000), 2)
                .with_usage(Money::from_major(1_000_000))
                .with_annual_fee_reminder(3, Some(Money::from_major(250_000))),
        ];
        portfolio
    }

    #[test]
    fn test_dashboard() {
        let tracker = Tracker::new(TrackerConfig::default()).unwrap();
        let portfolio = portfolio();
        let time = time_at(2023, 2, 25);

        let dashboard = tracker.dashboard(&portfolio, &time).unwrap();
        assert_eq!(dashboard.as_of, date(2023, 2, 25));
        assert_eq!(dashboard.active_cards, 3);
        assert_eq!(dashboard.total_limit, Money::from_major(65_000_000));
        assert_eq!(dashboard.total_usage, Money::from_major(16_000_000));
        assert_eq!(dashboard.available_credit, Money::from_major(49_000_000));
        assert_eq!(dashboard.utilization_state, UtilizationState::Low);

        assert_eq!(dashboard.shared_groups.len(), 1);
        assert_eq!(dashboard.shared_groups[0].shared_limit, Money::from_major(50_000_000));
        assert_eq!(dashboard.shared_groups[0].total_usage, Money::from_major(15_000_000));

        // due day 31 resolves to feb 28, annual fee on mar 1, bni due on mar 2
        let upcoming: Vec<(NaiveDate, ObligationKind, u32)> = dashboard
            .upcoming
            .iter()
            .map(|e| (e.date, e.kind, e.days_remaining))
            .collect();
        assert_eq!(
            upcoming,
            vec![
                (date(2023, 2, 28), ObligationKind::Payment, 3),
                (date(2023, 3, 1), ObligationKind::AnnualFee, 4),
                (date(2023, 3, 2), ObligationKind::Payment, 5),
            ]
        );
        assert_eq!(dashboard.upcoming_total, Money::from_major(11_250_000));
        assert!(dashboard.to_json_pretty().unwrap().contains("\"bank_id\": \"bca\""));
    }

    #[test]
    fn test_upcoming_follows_controlled_time() {
        let tracker = Tracker::new(TrackerConfig::default()).unwrap();
        let portfolio = portfolio();
        let time = time_at(2023, 2, 1);
        let control = time.test_control().unwrap();

        // feb 2 is tomorrow, feb 10 is nine days out
        let upcoming = tracker.upcoming(&portfolio, &time).unwrap();
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].days_remaining, 1);

        control.advance(Duration::days(3));
        let upcoming = tracker.upcoming(&portfolio, &time).unwrap();
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].date, date(2023, 2, 10));
        assert_eq!(upcoming[0].days_remaining, 6);
    }

    #[test]
    fn test_card_detail() {
        let tracker = Tracker::new(TrackerConfig::default()).unwrap();
        let portfolio = portfolio();
        let time = time_at(2023, 2, 25);

        let travel = tracker.card_detail(&portfolio, portfolio.instruments[1].id, &time).unwrap();
        assert!(travel.uses_shared_limit);
        assert_eq!(travel.limit, Money::from_major(50_000_000));
        assert_eq!(travel.usage, Money::from_major(15_000_000));
        assert_eq!(travel.next_due_date, date(2023, 3, 10));
        assert_eq!(travel.days_until_due, 13);
        assert!(travel.upcoming.is_empty());

        let missing = uuid::Uuid::new_v4();
        assert_eq!(
            tracker.card_detail(&portfolio, missing, &time),
            Err(ObligationError::InstrumentNotFound { id: missing })
        );
    }

    #[test]
    fn test_add_installment_writes_once() {
        let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();
        let portfolio = portfolio();
        let card_id = portfolio.instruments[2].id;
        let mut store = MemoryStore::new(&portfolio).unwrap();
        let time = time_at(2024, 1, 15);

        let request = InstallmentRequest::builder()
            .card(card_id)
            .description("Phone")
            .amount(Money::from_major(1_000_000))
            .months(3)
            .zero_percent()
            .admin_fee(Money::from_major(25_000))
            .build_with_time(&time)
            .unwrap();

        let scheduled = tracker.add_installment(&mut store, &request).unwrap();
        assert_eq!(scheduled.plan.start_date, date(2024, 1, 15));
        assert_eq!(store.saves(), 1);

        let saved = store.load().unwrap();
        assert_eq!(saved.installment_plans.len(), 1);
        assert_eq!(saved.transactions.len(), 4);
        assert_eq!(saved.transactions_for(card_id).count(), 4);

        assert!(matches!(
            tracker.events.events()[0],
            Event::InstallmentPlanCreated { remaining_months: 3, .. }
        ));
        assert!(matches!(tracker.events.events()[1], Event::AdminFeeCharged { .. }));

        // same plan twice is rejected without writing
        assert!(tracker.add_installment(&mut store, &request).is_err());
        assert_eq!(store.saves(), 1);

        let detail = tracker.card_detail(&saved, card_id, &time).unwrap();
        assert_eq!(detail.pending_installments, 3);
        assert_eq!(detail.pending_installment_total, Money::from_major(1_002_000));
    }

    #[test]
    fn test_failed_plan_writes_nothing() {
        let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();
        let portfolio = portfolio();
        let mut store = MemoryStore::new(&portfolio).unwrap();

        let request = InstallmentRequest::builder()
            .card(portfolio.instruments[0].id)
            .amount(Money::from_major(1_000_000))
            .months(3)
            .paid_months(3)
            .zero_percent()
            .start_date(date(2024, 1, 15))
            .build()
            .unwrap();

        assert_eq!(
            tracker.add_installment(&mut store, &request).unwrap_err(),
            ObligationError::TenorExhausted { paid_months: 3, total_months: 3 }
        );
        assert_eq!(store.saves(), 0);
        assert!(tracker.events.events().is_empty());

        let unknown = InstallmentRequest::builder()
            .card(uuid::Uuid::new_v4())
            .amount(Money::from_major(1_000_000))
            .months(3)
            .zero_percent()
            .start_date(date(2024, 1, 15))
            .build()
            .unwrap();
        assert!(matches!(
            tracker.add_installment(&mut store, &unknown),
            Err(ObligationError::InstrumentNotFound { .. })
        ));
    }

    #[test]
    fn test_roll_subscriptions() {
        let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();
        let mut portfolio = portfolio();
        let card_id = portfolio.instruments[0].id;
        let streaming = Subscription::new(
            card_id,
            "Streaming",
            Money::from_major(186_000),
            BillingCycle::Monthly,
            5,
            date(2024, 1, 1),
        )
        .unwrap();
        let mut paused = streaming.clone();
        paused.id = uuid::Uuid::new_v4();
        paused.is_active = false;
        portfolio.subscriptions = vec![streaming.clone(), paused];

        let mut store = MemoryStore::new(&portfolio).unwrap();
        let time = time_at(2024, 1, 4);
        let control = time.test_control().unwrap();

        // nothing due yet, nothing written
        assert!(tracker.roll_subscriptions(&mut store, &time).unwrap().is_empty());
        assert_eq!(store.saves(), 0);

        control.advance(Duration::days(32));
        let fired = tracker.roll_subscriptions(&mut store, &time).unwrap();
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].charged_on, vec![date(2024, 1, 5), date(2024, 2, 5)]);
        assert_eq!(store.saves(), 1);

        let saved = store.load().unwrap();
        assert_eq!(saved.subscriptions[0].next_billing_date, date(2024, 3, 5));
        assert_eq!(saved.subscriptions[1].next_billing_date, date(2024, 1, 5));
        assert_eq!(saved.transactions.len(), 2);
        assert!(saved.transactions.iter().all(|t| t.subscription_id == Some(streaming.id)));

        // rolling again on the same day is a no-op
        assert!(tracker.roll_subscriptions(&mut store, &time).unwrap().is_empty());
        assert_eq!(store.saves(), 1);

        let charged = tracker
            .events
            .events()
            .iter()
            .filter(|e| matches!(e, Event::SubscriptionCharged { .. }))
            .count();
        assert_eq!(charged, 2);

        // the caller drains committed changes; nothing carries over afterwards
        let drained = tracker.events.take_events();
        assert_eq!(drained.len(), 4);
        assert!(tracker.events.events().is_empty());
    }

    #[test]
    fn test_archived_card_subscriptions_are_not_charged() {
        let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();
        let mut portfolio = portfolio();
        portfolio.instruments[2].is_archived = true;
        let archived_card = portfolio.instruments[2].id;
        let live_card = portfolio.instruments[0].id;

        let music = Subscription::new(
            archived_card,
            "Music",
            Money::from_major(55_000),
            BillingCycle::Monthly,
            10,
            date(2024, 1, 1),
        )
        .unwrap();
        let news = Subscription::new(
            live_card,
            "News",
            Money::from_major(70_000),
            BillingCycle::Monthly,
            10,
            date(2024, 1, 1),
        )
        .unwrap();
        portfolio.subscriptions = vec![music.clone(), news.clone()];
        let mut store = MemoryStore::new(&portfolio).unwrap();

        let fired = tracker
            .roll_subscriptions(&mut store, &time_at(2024, 1, 12))
            .unwrap();
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].subscription.id, news.id);

        let saved = store.load().unwrap();
        assert_eq!(saved.subscriptions[0].next_billing_date, date(2024, 1, 10));
        assert_eq!(saved.subscriptions[1].next_billing_date, date(2024, 2, 10));
        assert!(saved.transactions.iter().all(|t| t.card_id == live_card));
        assert_eq!(saved.transactions.len(), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(Tracker::new(TrackerConfig::default().with_lookahead_days(1_000)).is_err());
    }
}
