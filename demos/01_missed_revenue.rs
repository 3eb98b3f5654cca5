/// missed revenue - a charge is queued when revenue is late and recovered once it arrives
use advance_billing_rs::chrono::NaiveDate;
use advance_billing_rs::{
    Advance, BillingOrchestrator, GatewayResponse, MockGateway, Money, SafeTimeProvider,
    TimeSource,
};
use rust_decimal_macros::dec;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let day = |d: u32| NaiveDate::from_ymd_opt(2022, 1, d).ok_or("bad date");

    let advance = Advance {
        id: 7,
        customer_id: 70,
        created: day(1)?,
        total_advanced: "1000".to_string(),
        fee: "50".to_string(),
        mandate_id: 700,
        repayment_start_date: day(2)?,
        repayment_percentage: dec!(10),
    };

    let gateway = MockGateway::new();
    // revenue for the 2nd is not published until the 4th
    gateway.set_revenue_on(70, day(2)?, GatewayResponse::NoData);
    gateway.set_revenue_on(70, day(3)?, GatewayResponse::Ok(Money::from_major(200)));

    let time = SafeTimeProvider::new(TimeSource::Test("2022-01-03T09:00:00Z".parse()?));
    let mut billing = BillingOrchestrator::new(gateway, time);

    billing.process_day(day(3)?, &[advance.clone()]).await;
    println!("pending after the 3rd: {:?}", billing.state().missed.pending(70));

    billing
        .gateway()
        .set_revenue_on(70, day(2)?, GatewayResponse::Ok(Money::from_major(150)));
    billing.process_day(day(4)?, &[advance]).await;

    for charge in billing.gateway().charges() {
        println!("charged {} to mandate {} on {}", charge.amount, charge.mandate_id, charge.as_of);
    }
    println!("balance: {:?}", billing.state().ledger.balance(7));
    println!("pending after the 4th: {:?}", billing.state().missed.pending(70));

    for event in billing.take_events() {
        println!("{:?}", event);
    }

    Ok(())
}
