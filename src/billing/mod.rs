pub mod calculator;
pub mod orchestrator;

pub use calculator::{compute_charge, repayment_amount};
pub use orchestrator::{BillingOrchestrator, DayOutcome};
