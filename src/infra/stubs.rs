use anyhow::{anyhow, Result};

use crate::{
    domain::{store::PersistedStore, theme::Theme},
    infra::{
        config::AppConfig,
        contracts::{ClipboardWriter, ConfigAdapter, StatePersistence},
    },
};

#[derive(Debug, Clone, Default)]
pub struct StubConfigAdapter;

impl ConfigAdapter for StubConfigAdapter {
    fn load(&self) -> Result<AppConfig> {
        Ok(AppConfig::default())
    }
}

/// Keeps the last saved values in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    pub store: Option<PersistedStore>,
    pub theme: Option<Theme>,
    pub store_saves: usize,
    pub fail: bool,
}

impl StatePersistence for MemoryPersistence {
    fn save_store(&mut self, snapshot: &PersistedStore) -> Result<()> {
        if self.fail {
            return Err(anyhow!("disk full"));
        }
        self.store = Some(snapshot.clone());
        self.store_saves += 1;
        Ok(())
    }

    fn save_theme(&mut self, theme: Theme) -> Result<()> {
        if self.fail {
            return Err(anyhow!("disk full"));
        }
        self.theme = Some(theme);
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingClipboard {
    pub copied: Vec<String>,
    pub fail: bool,
}

impl ClipboardWriter for RecordingClipboard {
    fn copy_text(&mut self, text: &str) -> Result<()> {
        if self.fail {
            return Err(anyhow!("no clipboard available"));
        }
        self.copied.push(text.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_config_returns_defaults() {
        let config = StubConfigAdapter.load().expect("stub config must load");

        assert_eq!(config, AppConfig::default());
    }
}
