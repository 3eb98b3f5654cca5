use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{BillingError, Result};

pub const DEFAULT_BASE_URL: &str = "https://billing.eng-test.wayflyer.com/v2";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_TODAY_HEADER: &str = "Today";

/// billing configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillingConfig {
    pub gateway: GatewayConfig,
    pub simulation: SimulationConfig,
}

/// remote billing gateway settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// header carrying the as-of date on every request
    pub today_header: String,
}

/// simulated date range, both ends inclusive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            today_header: DEFAULT_TODAY_HEADER.to_string(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or(NaiveDate::MIN),
            end_date: NaiveDate::from_ymd_opt(2022, 2, 1).unwrap_or(NaiveDate::MIN),
        }
    }
}

impl BillingConfig {
    /// defaults overlaid with BILLING_* environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// defaults overlaid with whatever `lookup` returns for each BILLING_* key
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("BILLING_BASE_URL") {
            config.gateway.base_url = url;
        }
        if let Some(timeout) = lookup("BILLING_TIMEOUT_SECS") {
            config.gateway.timeout_secs = parse_var("BILLING_TIMEOUT_SECS", &timeout)?;
        }
        if let Some(header) = lookup("BILLING_TODAY_HEADER") {
            config.gateway.today_header = header;
        }
        if let Some(start) = lookup("BILLING_START_DATE") {
            config.simulation.start_date = parse_date(&start)?;
        }
        if let Some(end) = lookup("BILLING_END_DATE") {
            config.simulation.end_date = parse_date(&end)?;
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.gateway.base_url.trim().is_empty() {
            return Err(BillingError::InvalidConfiguration {
                message: "gateway base url is empty".to_string(),
            });
        }
        if self.gateway.timeout_secs == 0 {
            return Err(BillingError::InvalidConfiguration {
                message: "gateway timeout must be at least one second".to_string(),
            });
        }
        if self.simulation.start_date > self.simulation.end_date {
            return Err(BillingError::InvalidConfiguration {
                message: format!(
                    "start date {} is after end date {}",
                    self.simulation.start_date, self.simulation.end_date
                ),
            });
        }
        Ok(())
    }
}

/// parse an ISO `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| BillingError::InvalidDate {
        message: format!("{value:?}: {e}"),
    })
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| BillingError::InvalidConfiguration {
            message: format!("{key} has invalid value {value:?}"),
        })
}
