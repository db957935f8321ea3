use serde::Deserialize;

use crate::infra::config::{AppConfig, AuthConfig, LogConfig, SimulationConfig, UiConfig};

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub logging: Option<FileLogConfig>,
    pub simulation: Option<FileSimulationConfig>,
    pub auth: Option<FileAuthConfig>,
    pub ui: Option<FileUiConfig>,
}

impl FileConfig {
    pub fn merge_into(self, config: &mut AppConfig) {
        if let Some(logging) = self.logging {
            logging.merge_into(&mut config.logging);
        }

        if let Some(simulation) = self.simulation {
            simulation.merge_into(&mut config.simulation);
        }

        if let Some(auth) = self.auth {
            auth.merge_into(&mut config.auth);
        }

        if let Some(ui) = self.ui {
            ui.merge_into(&mut config.ui);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLogConfig {
    pub level: Option<String>,
}

impl FileLogConfig {
    fn merge_into(self, config: &mut LogConfig) {
        if let Some(level) = self.level {
            config.level = level;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileSimulationConfig {
    pub reply_delay_min_ms: Option<u64>,
    pub reply_delay_max_ms: Option<u64>,
    pub page_settle_ms: Option<u64>,
    pub otp_send_delay_ms: Option<u64>,
    pub otp_verify_delay_ms: Option<u64>,
    pub accepted_otp: Option<String>,
}

impl FileSimulationConfig {
    fn merge_into(self, config: &mut SimulationConfig) {
        if let Some(value) = self.reply_delay_min_ms {
            config.reply_delay_min_ms = value;
        }

        if let Some(value) = self.reply_delay_max_ms {
            config.reply_delay_max_ms = value;
        }

        // an inverted range collapses to its lower bound
        if config.reply_delay_max_ms < config.reply_delay_min_ms {
            config.reply_delay_max_ms = config.reply_delay_min_ms;
        }

        if let Some(value) = self.page_settle_ms {
            config.page_settle_ms = value;
        }

        if let Some(value) = self.otp_send_delay_ms {
            config.otp_send_delay_ms = value;
        }

        if let Some(value) = self.otp_verify_delay_ms {
            config.otp_verify_delay_ms = value;
        }

        if let Some(code) = self.accepted_otp {
            config.accepted_otp = code;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileAuthConfig {
    pub default_dial_code: Option<String>,
    pub countries_url: Option<String>,
    pub countries_timeout_ms: Option<u64>,
}

impl FileAuthConfig {
    fn merge_into(self, config: &mut AuthConfig) {
        if let Some(dial_code) = self.default_dial_code {
            config.default_dial_code = dial_code;
        }

        if let Some(url) = self.countries_url {
            config.countries_url = url;
        }

        if let Some(timeout_ms) = self.countries_timeout_ms {
            config.countries_timeout_ms = timeout_ms;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileUiConfig {
    pub page_size: Option<usize>,
    pub tick_rate_ms: Option<u64>,
}

impl FileUiConfig {
    fn merge_into(self, config: &mut UiConfig) {
        if let Some(page_size) = self.page_size {
            config.page_size = page_size.max(1);
        }

        if let Some(tick_rate_ms) = self.tick_rate_ms {
            config.tick_rate_ms = tick_rate_ms.max(10);
        }
    }
}
