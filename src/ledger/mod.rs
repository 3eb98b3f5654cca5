pub mod balance;
pub mod missed;

pub use balance::BalanceLedger;
pub use missed::MissedPaymentRegistry;
