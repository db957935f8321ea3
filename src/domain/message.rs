use serde::{Deserialize, Serialize};

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Ai,
}

/// Content kind of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
    Image,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub role: MessageRole,
    pub timestamp_ms: i64,
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
    /// Attached image as a `data:` URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Message {
    pub fn user(text: impl Into<String>, image: Option<String>, now_ms: i64) -> Self {
        let kind = if image.is_some() {
            MessageKind::Image
        } else {
            MessageKind::Text
        };

        Self {
            id: format!("{now_ms}u-{}", short_suffix()),
            text: text.into(),
            role: MessageRole::User,
            timestamp_ms: now_ms,
            kind,
            image,
        }
    }

    pub fn ai(text: impl Into<String>, now_ms: i64) -> Self {
        Self {
            id: format!("{now_ms}a-{}", short_suffix()),
            text: text.into(),
            role: MessageRole::Ai,
            timestamp_ms: now_ms,
            kind: MessageKind::Text,
            image: None,
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }

    /// Returns the display content: image label + text, or just text.
    pub fn display_content(&self) -> String {
        let label = self.image.as_deref().map(image_label);
        match (label, self.text.is_empty()) {
            (Some(label), true) => label,
            (Some(label), false) => format!("{} {}", label, self.text),
            (None, _) => self.text.clone(),
        }
    }
}

fn short_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_owned()
}

fn image_label(data_uri: &str) -> String {
    let payload_len = data_uri
        .split_once(',')
        .map(|(_, payload)| payload.len())
        .unwrap_or(0);
    // base64 expands by 4/3
    let approx_bytes = payload_len / 4 * 3;
    format!("[Image {}]", human_size(approx_bytes))
}

fn human_size(bytes: usize) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{} KB", bytes / 1024)
    } else {
        format!("{bytes} B")
    }
}
