/// dashboard - shared limits and the upcoming obligations of a small wallet
use card_obligations_rs::chrono::{TimeZone, Utc};
use card_obligations_rs::{
    CreditInstrument, LimitIncreaseRecord, Money, Portfolio, SafeTimeProvider, TimeSource,
    Tracker, TrackerConfig,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2023, 2, 25, 9, 0, 0).unwrap()));

    let everyday = CreditInstrument::new("BCA Everyday", "bca", Money::from_major(50_000_000), 31)
        .with_usage(Money::from_major(10_000_000))
        .with_shared_limit();
    let travel = CreditInstrument::new("BCA Travel", "bca", Money::from_major(50_000_000), 10)
        .with_usage(Money::from_major(5_000_000))
        .with_shared_limit();
    let cashback = CreditInstrument::new("BNI Cashback", "bni", Money::from_major(15_000_000), 2)
        .with_usage(Money::from_major(1_000_000))
        .with_annual_fee_reminder(3, Some(Money::from_major(250_000)))
        .with_limit_increase_reminder(None);

    let mut portfolio = Portfolio::default();
    portfolio.limit_increase_records.push(LimitIncreaseRecord::new(
        cashback.id,
        Utc.with_ymd_and_hms(2022, 11, 28, 0, 0, 0).unwrap(),
        3,
    ));
    portfolio.instruments = vec![everyday, travel, cashback];

    let tracker = Tracker::new(TrackerConfig::default())?;
    let dashboard = tracker.dashboard(&portfolio, &time)?;

    println!("total limit:  {}", dashboard.total_limit);
    println!("total usage:  {}", dashboard.total_usage);
    println!("available:    {}", dashboard.available_credit);
    println!("state:        {:?}", dashboard.utilization_state);

    for group in &dashboard.shared_groups {
        println!(
            "shared {}: {} of {} used across {} cards",
            group.bank_id,
            group.total_usage,
            group.shared_limit,
            group.members.len()
        );
    }

    println!("\nnext {} days:", tracker.config().lookahead_days);
    for event in &dashboard.upcoming {
        let name = portfolio
            .instrument(event.instrument_id)
            .map(|i| i.name.as_str())
            .unwrap_or("?");
        println!(
            "  {} {:<20} {:<13} in {} days {}",
            event.date,
            name,
            event.kind,
            event.days_remaining,
            event.amount.map(|a| a.to_string()).unwrap_or_default()
        );
    }

    let detail = tracker.card_detail(&portfolio, portfolio.instruments[1].id, &time)?;
    println!(
        "\n{} next due {} ({} days)",
        detail.name, detail.next_due_date, detail.days_until_due
    );

    println!("\n{}", dashboard.to_json_pretty()?);

    Ok(())
}
