pub mod billing;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod gateway;
pub mod ledger;
pub mod simulation;
pub mod state;
pub mod types;

// re-export key types
pub use billing::{compute_charge, repayment_amount, BillingOrchestrator, DayOutcome};
pub use config::{BillingConfig, GatewayConfig, SimulationConfig};
pub use decimal::Money;
pub use errors::{BillingError, Result};
pub use events::{Event, EventStore};
pub use gateway::{BillingGateway, GatewayResponse, HttpGateway, MockGateway};
pub use ledger::{BalanceLedger, MissedPaymentRegistry};
pub use simulation::{date_range, previous_day, DaySummary, Simulation, SimulationReport};
pub use state::{BillingSnapshot, BillingState};
pub use types::{Advance, AdvanceId, ChargeQuote, CustomerId, MandateId, MissedAdvance};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
