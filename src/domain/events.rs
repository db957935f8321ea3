use super::{pagination::PageToken, store::ReplyTicket};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Tick,
    QuitRequested,
    InputKey(KeyInput),
    /// A simulated reply finished its generation delay.
    ReplyReady(ReplyDelivery),
    /// The settle delay of an older-page fetch elapsed.
    OlderPageReady(PageToken),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyDelivery {
    pub ticket: ReplyTicket,
    pub text: String,
}

/// A key press normalized for the orchestrator.
///
/// Printable keys carry the character itself; others use lowercase names
/// such as `enter`, `esc`, `backspace`, `up`, `pageup`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    pub key: String,
    pub ctrl: bool,
}

impl KeyInput {
    pub fn new(key: impl Into<String>, ctrl: bool) -> Self {
        Self {
            key: key.into(),
            ctrl,
        }
    }

    /// The printable character, when the key is one and no modifier is held.
    pub fn as_char(&self) -> Option<char> {
        if self.ctrl {
            return None;
        }

        let mut chars = self.key.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Some(ch),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_char_accepts_single_printable_keys_only() {
        assert_eq!(KeyInput::new("q", false).as_char(), Some('q'));
        assert_eq!(KeyInput::new("ж", false).as_char(), Some('ж'));
        assert_eq!(KeyInput::new("enter", false).as_char(), None);
        assert_eq!(KeyInput::new("a", true).as_char(), None);
    }
}
