/// subscriptions - roll recurring charges forward as time passes
use card_obligations_rs::chrono::{Duration, TimeZone, Utc};
use card_obligations_rs::{
    BillingCycle, CreditInstrument, MemoryStore, Money, Portfolio, SafeTimeProvider, Store,
    Subscription, TimeSource, Tracker, TrackerConfig,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2024, 1, 20, 8, 0, 0).unwrap()));
    let control = time.test_control().unwrap();
    let today = Tracker::today(&time);

    let card = CreditInstrument::new("BNI Cashback", "bni", Money::from_major(15_000_000), 2);
    let streaming = Subscription::new(
        card.id,
        "Streaming",
        Money::from_major(186_000),
        BillingCycle::Monthly,
        31,
        today,
    )?;
    let storage = Subscription::new(
        card.id,
        "Cloud storage",
        Money::from_major(1_350_000),
        BillingCycle::Yearly,
        25,
        today,
    )?;

    let mut portfolio = Portfolio::default();
    portfolio.instruments.push(card);
    portfolio.subscriptions = vec![streaming, storage];
    let mut store = MemoryStore::new(&portfolio)?;
    let mut tracker = Tracker::new(TrackerConfig::default().with_lookahead_days(14))?;

    for event in tracker.upcoming(&store.load()?, &time)? {
        println!("upcoming {} {} in {} days", event.date, event.kind, event.days_remaining);
    }

    // step through the quarter a fortnight at a time
    let mut recorded = 0;
    for _ in 0..7 {
        control.advance(Duration::days(14));
        let fired = tracker.roll_subscriptions(&mut store, &time)?;
        for advance in &fired {
            for date in &advance.charged_on {
                println!(
                    "{} charged {} on {}",
                    advance.subscription.name, advance.subscription.amount, date
                );
            }
            println!("  next billing {}", advance.subscription.next_billing_date);
        }
        recorded += tracker.events.take_events().len();
    }

    let saved = store.load()?;
    let charged: Money = saved.transactions.iter().map(|t| t.amount).sum();
    println!(
        "\n{} charges totalling {} written in {} saves",
        saved.transactions.len(),
        charged,
        store.saves()
    );
    println!("{} events recorded", recorded);

    Ok(())
}
