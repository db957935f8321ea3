use std::fmt;

use serde::{Deserialize, Serialize};

use super::message::Message;

/// Sidebar titles are cut to this many characters.
const DISPLAY_TITLE_MAX_CHARS: usize = 25;

pub const DEFAULT_CHAT_TITLE: &str = "New Chat";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(String);

impl ChatId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: ChatId,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at_ms: i64,
    /// Incarnation number assigned by the store on insert; never persisted.
    #[serde(skip)]
    pub generation: u64,
}

impl Chat {
    pub fn new(id: ChatId, title: impl Into<String>, created_at_ms: i64) -> Self {
        Self {
            id,
            title: title.into(),
            messages: Vec::new(),
            created_at_ms,
            generation: 0,
        }
    }

    pub fn blank(created_at_ms: i64) -> Self {
        Self::new(ChatId::generate(), DEFAULT_CHAT_TITLE, created_at_ms)
    }

    fn first_message_text(&self) -> Option<&str> {
        self.messages
            .first()
            .map(|message| message.text.as_str())
            .filter(|text| !text.is_empty())
    }

    /// Title shown in the sidebar: the opening message, else the chat title.
    pub fn display_title(&self) -> String {
        if let Some(text) = self.first_message_text() {
            let mut chars = text.chars();
            let head: String = chars.by_ref().take(DISPLAY_TITLE_MAX_CHARS).collect();
            return if chars.next().is_some() {
                format!("{head}...")
            } else {
                head
            };
        }

        if self.title.is_empty() {
            DEFAULT_CHAT_TITLE.to_owned()
        } else {
            self.title.clone()
        }
    }

    /// Case-insensitive match on the title or the opening message.
    pub fn matches_filter(&self, filter: &str) -> bool {
        let needle = filter.to_lowercase();
        if needle.is_empty() {
            return true;
        }

        if !self.title.is_empty() && self.title.to_lowercase().contains(&needle) {
            return true;
        }

        self.first_message_text()
            .is_some_and(|text| text.to_lowercase().contains(&needle))
    }
}
