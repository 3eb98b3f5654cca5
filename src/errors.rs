use thiserror::Error;

use crate::types::AdvanceId;

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("invalid amount for advance {advance_id}: {value:?}")]
    InvalidAmount {
        advance_id: AdvanceId,
        value: String,
    },

    #[error("gateway {operation} failed: {message}")]
    Gateway {
        operation: &'static str,
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BillingError>;
