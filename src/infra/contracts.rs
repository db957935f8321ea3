use anyhow::Result;

use crate::{
    domain::{store::PersistedStore, theme::Theme},
    infra::config::AppConfig,
};

pub trait ConfigAdapter {
    fn load(&self) -> Result<AppConfig>;
}

/// Writes the durable parts of application state.
pub trait StatePersistence {
    fn save_store(&mut self, snapshot: &PersistedStore) -> Result<()>;
    fn save_theme(&mut self, theme: Theme) -> Result<()>;
}

pub trait ClipboardWriter {
    fn copy_text(&mut self, text: &str) -> Result<()>;
}
