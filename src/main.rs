use std::path::PathBuf;

use advance_billing_rs::{
    BillingConfig, BillingOrchestrator, HttpGateway, SafeTimeProvider, Simulation, TimeSource,
};
use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "billing-sim", version, about = "Simulate daily revenue-share billing of cash advances")]
struct Cli {
    /// first day to bill (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// last day to bill, inclusive (YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,

    /// billing gateway base url
    #[arg(long = "base-url")]
    base_url: Option<String>,

    /// request timeout in seconds
    #[arg(long = "timeout-secs")]
    timeout_secs: Option<u64>,

    /// write the final ledger and missed payments as json
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// write the per-day report as json
    #[arg(long)]
    report: Option<PathBuf>,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,advance_billing_rs=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let mut config = BillingConfig::from_env().context("loading configuration")?;
    if let Some(start) = cli.start {
        config.simulation.start_date = start;
    }
    if let Some(end) = cli.end {
        config.simulation.end_date = end;
    }
    if let Some(base_url) = cli.base_url {
        config.gateway.base_url = base_url;
    }
    if let Some(timeout_secs) = cli.timeout_secs {
        config.gateway.timeout_secs = timeout_secs;
    }
    config.validate()?;

    info!(
        base_url = %config.gateway.base_url,
        start = %config.simulation.start_date,
        end = %config.simulation.end_date,
        "starting billing simulation"
    );

    let gateway = HttpGateway::new(&config.gateway).context("building http gateway")?;
    let time = SafeTimeProvider::new(TimeSource::System);
    let mut simulation = Simulation::new(BillingOrchestrator::new(gateway, time));

    let report = simulation
        .run(config.simulation.start_date, config.simulation.end_date)
        .await;

    if let Some(path) = cli.report {
        std::fs::write(&path, report.to_json()?)
            .with_context(|| format!("writing report to {}", path.display()))?;
    }
    if let Some(path) = cli.snapshot {
        let snapshot = simulation.orchestrator().snapshot();
        std::fs::write(&path, snapshot.to_json()?)
            .with_context(|| format!("writing snapshot to {}", path.display()))?;
    }

    info!(
        charges = report.charges_posted(),
        collected = %report.amount_collected(),
        paid_off = report.advances_paid_off().len(),
        pending_missed = report.pending_missed,
        "Billing simulation complete."
    );

    Ok(())
}
