use serde::{Deserialize, Serialize};

pub const DEFAULT_COUNTRIES_URL: &str =
    "https://restcountries.com/v3.1/all?fields=name,cca2,idd,flags";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub logging: LogConfig,
    pub simulation: SimulationConfig,
    pub auth: AuthConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
        }
    }
}

/// Delays and outcomes of the simulated backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimulationConfig {
    pub reply_delay_min_ms: u64,
    pub reply_delay_max_ms: u64,
    pub page_settle_ms: u64,
    pub otp_send_delay_ms: u64,
    pub otp_verify_delay_ms: u64,
    pub accepted_otp: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            reply_delay_min_ms: 2_000,
            reply_delay_max_ms: 5_000,
            page_settle_ms: 500,
            otp_send_delay_ms: 3_000,
            otp_verify_delay_ms: 2_000,
            accepted_otp: "123456".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthConfig {
    pub default_dial_code: String,
    pub countries_url: String,
    pub countries_timeout_ms: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            default_dial_code: "+1".to_owned(),
            countries_url: DEFAULT_COUNTRIES_URL.to_owned(),
            countries_timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UiConfig {
    pub page_size: usize,
    pub tick_rate_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            tick_rate_ms: 100,
        }
    }
}
