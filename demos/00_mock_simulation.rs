/// mock simulation - bill two advances for two weeks against a scripted gateway
use advance_billing_rs::chrono::NaiveDate;
use advance_billing_rs::{
    Advance, BillingOrchestrator, MockGateway, Money, SafeTimeProvider, Simulation, TimeSource,
};
use rust_decimal_macros::dec;

fn advance(id: u64, customer_id: u64, total: &str, fee: &str, start: NaiveDate) -> Advance {
    Advance {
        id,
        customer_id,
        created: start,
        total_advanced: total.to_string(),
        fee: fee.to_string(),
        mandate_id: 1000 + id,
        repayment_start_date: start,
        repayment_percentage: dec!(11),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let start = NaiveDate::from_ymd_opt(2022, 1, 1).ok_or("bad date")?;
    let end = NaiveDate::from_ymd_opt(2022, 1, 14).ok_or("bad date")?;

    let gateway = MockGateway::new();
    gateway.set_advances(vec![
        advance(1, 10, "500.00", "25.00", start),
        advance(2, 20, "60000.00", "3000.00", NaiveDate::from_ymd_opt(2022, 1, 8).ok_or("bad date")?),
    ]);
    gateway.set_daily_revenue(10, Money::from_major(900));
    gateway.set_daily_revenue(20, Money::from_str_exact("12345.67")?);

    let time = SafeTimeProvider::new(TimeSource::Test("2022-01-01T09:00:00Z".parse()?));
    let mut simulation = Simulation::new(BillingOrchestrator::new(gateway, time));
    let report = simulation.run(start, end).await;

    for day in &report.days {
        println!(
            "{}: {} charge(s), collected {}",
            day.date,
            day.charges_posted(),
            day.amount_collected()
        );
    }
    println!("paid off: {:?}", report.advances_paid_off());
    println!("{}", simulation.orchestrator().snapshot().to_json()?);

    Ok(())
}
