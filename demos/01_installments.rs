/// installments - schedule purchases and write their charges to a store
use card_obligations_rs::chrono::{NaiveDate, TimeZone, Utc};
use card_obligations_rs::{
    CreditInstrument, ExchangeRate, InstallmentRequest, InstallmentScheduler, MemoryStore, Money,
    Portfolio, SafeTimeProvider, Store, TimeSource, Tracker, TrackerConfig, ZeroPercentRounding,
};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2024, 1, 31, 10, 0, 0).unwrap()));

    let card = CreditInstrument::new("BCA Everyday", "bca", Money::from_major(50_000_000), 25);
    let card_id = card.id;
    let mut portfolio = Portfolio::default();
    portfolio.instruments.push(card);
    let mut store = MemoryStore::new(&portfolio)?;

    let mut tracker = Tracker::new(TrackerConfig::default())?;

    // 0% over three months, ceiled to the nearest thousand
    let phone = InstallmentRequest::builder()
        .card(card_id)
        .description("Phone")
        .amount(Money::from_major(1_000_000))
        .months(3)
        .zero_percent()
        .admin_fee(Money::from_major(50_000))
        .build_with_time(&time)?;
    let scheduled = tracker.add_installment(&mut store, &phone)?;

    println!("{} monthly {}", scheduled.plan.description, scheduled.plan.monthly_amount);
    for instance in &scheduled.instances {
        println!("  #{} due {} {}", instance.installment_number, instance.due_date, instance.amount);
    }
    println!("  total scheduled {}", scheduled.total_scheduled());

    // foreign currency, two of twelve months already paid, billed on the 31st
    let laptop = InstallmentRequest::builder()
        .card(card_id)
        .description("Laptop")
        .amount(Money::from_major(1_200))
        .months(12)
        .paid_months(2)
        .monthly_amount(Money::from_major(1_550_000))
        .currency("USD", ExchangeRate::from_decimal(dec!(15500)))
        .start_date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
        .billing_day(31)
        .build()?;
    let scheduled = tracker.add_installment(&mut store, &laptop)?;

    println!(
        "\n{} {} {} -> {} {}",
        scheduled.plan.description,
        scheduled.plan.original_amount,
        scheduled.plan.currency,
        scheduled.plan.converted_amount,
        scheduled.plan.base_currency
    );
    for instance in scheduled.instances.iter().take(3) {
        println!("  #{} due {} {}", instance.installment_number, instance.due_date, instance.amount);
    }

    // same phone priced to the rupiah, remainder folded into the final month
    let config = TrackerConfig::exact_rounding("IDR")
        .with_rounding(ZeroPercentRounding::AdjustFinalInstallment);
    let exact = InstallmentScheduler::new(&config).build_plan(&phone)?;
    let amounts: Vec<String> = exact.instances.iter().map(|i| i.amount.to_string()).collect();
    println!("\nexact rounding: {}", amounts.join(" + "));

    let saved = store.load()?;
    println!(
        "\nstore holds {} plans and {} transactions after {} saves",
        saved.installment_plans.len(),
        saved.transactions.len(),
        store.saves()
    );
    for event in tracker.events.take_events() {
        println!("  {:?}", event);
    }

    Ok(())
}
