//! State for the message composer: text buffer, cursor and image attachment.

/// Maximum allowed input length in characters.
const MAX_INPUT_LENGTH: usize = 4096;

/// An image picked for the next message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    /// `data:<mime>;base64,...`
    pub data_uri: String,
}

/// What the composer hands over on submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub text: String,
    pub image: Option<String>,
}

impl Draft {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.image.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageInputState {
    text: String,
    /// Character index, not byte.
    cursor_position: usize,
    attachment: Option<Attachment>,
}

impl MessageInputState {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    /// True when submit would produce a message.
    pub fn can_send(&self) -> bool {
        !self.text.trim().is_empty() || self.attachment.is_some()
    }

    /// Inserts a character at the cursor. Returns false at the length limit.
    pub fn insert_char(&mut self, ch: char) -> bool {
        if self.text.chars().count() >= MAX_INPUT_LENGTH {
            return false;
        }
        let byte_idx = self.char_to_byte_index(self.cursor_position);
        self.text.insert(byte_idx, ch);
        self.cursor_position += 1;
        true
    }

    pub fn delete_char_before(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            self.remove_at_cursor();
        }
    }

    pub fn delete_char_at(&mut self) {
        if self.cursor_position < self.text.chars().count() {
            self.remove_at_cursor();
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.text.chars().count() {
            self.cursor_position += 1;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_position = self.text.chars().count();
    }

    pub fn attach(&mut self, attachment: Attachment) {
        self.attachment = Some(attachment);
    }

    pub fn remove_attachment(&mut self) -> Option<Attachment> {
        self.attachment.take()
    }

    /// Takes the trimmed text and attachment, leaving the composer empty.
    pub fn take_draft(&mut self) -> Draft {
        let draft = Draft {
            text: self.text.trim().to_owned(),
            image: self.attachment.take().map(|attachment| attachment.data_uri),
        };
        self.clear();
        draft
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor_position = 0;
        self.attachment = None;
    }

    fn remove_at_cursor(&mut self) {
        let byte_idx = self.char_to_byte_index(self.cursor_position);
        let next_byte_idx = self.char_to_byte_index(self.cursor_position + 1);
        self.text.drain(byte_idx..next_byte_idx);
    }

    fn char_to_byte_index(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.text.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> MessageInputState {
        let mut state = MessageInputState::default();
        for ch in text.chars() {
            state.insert_char(ch);
        }
        state
    }

    fn image() -> Attachment {
        Attachment {
            file_name: "cat.png".to_owned(),
            data_uri: "data:image/png;base64,AAAA".to_owned(),
        }
    }

    #[test]
    fn insert_char_at_middle_position() {
        let mut state = typed("Ho");
        state.move_cursor_left();
        state.insert_char('i');

        assert_eq!(state.text(), "Hio");
        assert_eq!(state.cursor_position(), 2);
    }

    #[test]
    fn delete_before_and_at_cursor() {
        let mut state = typed("abc");
        state.delete_char_before();
        assert_eq!(state.text(), "ab");

        state.move_cursor_home();
        state.delete_char_at();
        assert_eq!(state.text(), "b");
        assert_eq!(state.cursor_position(), 0);

        state.delete_char_before();
        assert_eq!(state.text(), "b");
    }

    #[test]
    fn cursor_stays_within_bounds() {
        let mut state = typed("ab");

        state.move_cursor_right();
        assert_eq!(state.cursor_position(), 2);

        state.move_cursor_home();
        state.move_cursor_left();
        assert_eq!(state.cursor_position(), 0);

        state.move_cursor_end();
        assert_eq!(state.cursor_position(), 2);
    }

    #[test]
    fn handles_multibyte_characters() {
        let mut state = typed("Привет");
        state.delete_char_before();
        assert_eq!(state.text(), "Приве");

        state.move_cursor_home();
        state.delete_char_at();
        assert_eq!(state.text(), "риве");
    }

    #[test]
    fn insert_char_respects_max_length_limit() {
        let mut state = MessageInputState::default();
        for _ in 0..MAX_INPUT_LENGTH {
            assert!(state.insert_char('x'));
        }

        assert!(!state.insert_char('y'));
        assert_eq!(state.text().chars().count(), MAX_INPUT_LENGTH);
    }

    #[test]
    fn whitespace_only_text_cannot_be_sent() {
        let state = typed("   ");

        assert!(!state.can_send());
    }

    #[test]
    fn attachment_alone_can_be_sent() {
        let mut state = MessageInputState::default();
        state.attach(image());

        assert!(state.can_send());
    }

    #[test]
    fn take_draft_trims_and_clears() {
        let mut state = typed("  hello  ");
        state.attach(image());

        let draft = state.take_draft();

        assert_eq!(draft.text, "hello");
        assert_eq!(draft.image.as_deref(), Some("data:image/png;base64,AAAA"));
        assert!(state.is_empty());
        assert_eq!(state.attachment(), None);
        assert_eq!(state.cursor_position(), 0);
    }

    #[test]
    fn remove_attachment_keeps_text() {
        let mut state = typed("hi");
        state.attach(image());

        let removed = state.remove_attachment();

        assert_eq!(removed.map(|a| a.file_name), Some("cat.png".to_owned()));
        assert_eq!(state.text(), "hi");
    }
}
