use std::time::Duration;

use rand::Rng;

use crate::infra::config::SimulationConfig;

const IMAGE_PREFIX: &str = "Based on the image and your request: ";
const TEXT_PREFIX: &str = "Here is your detailed answer: ";
const IMAGE_ONLY_SUBJECT: &str = "the attached image";

/// Inclusive range the generation delay is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyDelayRange {
    min_ms: u64,
    max_ms: u64,
}

impl Default for ReplyDelayRange {
    fn default() -> Self {
        Self::new(2_000, 5_000)
    }
}

impl ReplyDelayRange {
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms,
            max_ms: max_ms.max(min_ms),
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.reply_delay_min_ms, config.reply_delay_max_ms)
    }

    /// Uniform draw over whole milliseconds.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        Duration::from_millis(rng.gen_range(self.min_ms..=self.max_ms))
    }
}

/// Text of the synthetic answer to `text` after `delay`.
pub fn compose_reply(text: &str, has_image: bool, delay: Duration) -> String {
    let prefix = if has_image { IMAGE_PREFIX } else { TEXT_PREFIX };
    let subject = if text.is_empty() {
        IMAGE_ONLY_SUBJECT
    } else {
        text
    };
    let seconds = delay.as_millis() as f64 / 1000.0;

    format!(
        "{prefix}I'm delighted to assist you with your request regarding \"{subject}.\" \
This response simulates the complete, throttled output after a {seconds} second generation delay."
    )
}
