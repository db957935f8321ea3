use anyhow::{Context, Result};
use arboard::Clipboard;

use crate::infra::contracts::ClipboardWriter;

/// System clipboard via `arboard`. A handle is opened per copy since the
/// display connection may come and go while the TUI runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl ClipboardWriter for SystemClipboard {
    fn copy_text(&mut self, text: &str) -> Result<()> {
        let mut clipboard = Clipboard::new().context("clipboard is unavailable")?;
        clipboard
            .set_text(text.to_owned())
            .context("clipboard rejected the text")?;
        Ok(())
    }
}
