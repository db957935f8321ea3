use std::time::{Duration, Instant};

use super::{chat::ChatId, debounce::Debounced};

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Sidebar state: search filter, highlighted row and delete confirmation.
///
/// The chats themselves live in the store; callers pass the ids currently
/// visible under the applied filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatListState {
    selected_chat_id: Option<ChatId>,
    search_input: String,
    applied_filter: String,
    pending_filter: Debounced<String>,
    pending_delete: Option<ChatId>,
}

impl Default for ChatListState {
    fn default() -> Self {
        Self {
            selected_chat_id: None,
            search_input: String::new(),
            applied_filter: String::new(),
            pending_filter: Debounced::new(SEARCH_DEBOUNCE),
            pending_delete: None,
        }
    }
}

impl ChatListState {
    pub fn selected_chat_id(&self) -> Option<&ChatId> {
        self.selected_chat_id.as_ref()
    }

    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    pub fn applied_filter(&self) -> &str {
        &self.applied_filter
    }

    pub fn pending_delete(&self) -> Option<&ChatId> {
        self.pending_delete.as_ref()
    }

    /// Index of the highlighted chat among `visible`, falling back to the first row.
    pub fn selected_index(&self, visible: &[ChatId]) -> Option<usize> {
        resolve_selection_index(visible, self.selected_chat_id.as_ref())
    }

    pub fn select(&mut self, chat_id: Option<ChatId>) {
        self.selected_chat_id = chat_id;
    }

    pub fn select_next(&mut self, visible: &[ChatId]) {
        let Some(index) = self.selected_index(visible) else {
            return;
        };

        let last_index = visible.len().saturating_sub(1);
        let next = std::cmp::min(index.saturating_add(1), last_index);
        self.selected_chat_id = visible.get(next).cloned();
    }

    pub fn select_previous(&mut self, visible: &[ChatId]) {
        let Some(index) = self.selected_index(visible) else {
            return;
        };

        self.selected_chat_id = visible.get(index.saturating_sub(1)).cloned();
    }

    pub fn push_search_char(&mut self, ch: char, now: Instant) {
        self.search_input.push(ch);
        self.pending_filter.push(self.search_input.clone(), now);
    }

    pub fn pop_search_char(&mut self, now: Instant) {
        self.search_input.pop();
        self.pending_filter.push(self.search_input.clone(), now);
    }

    pub fn clear_search(&mut self) {
        self.search_input.clear();
        self.applied_filter.clear();
        self.pending_filter.cancel();
    }

    /// Applies the typed filter once typing has paused. Returns true on change.
    pub fn poll_filter(&mut self, now: Instant) -> bool {
        match self.pending_filter.poll(now) {
            Some(filter) if filter != self.applied_filter => {
                self.applied_filter = filter;
                true
            }
            _ => false,
        }
    }

    pub fn request_delete(&mut self, chat_id: ChatId) {
        self.pending_delete = Some(chat_id);
    }

    pub fn take_pending_delete(&mut self) -> Option<ChatId> {
        self.pending_delete.take()
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }
}

fn resolve_selection_index(visible: &[ChatId], selected: Option<&ChatId>) -> Option<usize> {
    if visible.is_empty() {
        return None;
    }

    selected
        .and_then(|chat_id| visible.iter().position(|id| id == chat_id))
        .or(Some(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<ChatId> {
        values.iter().map(|value| ChatId::new(*value)).collect()
    }

    #[test]
    fn selection_defaults_to_first_visible_chat() {
        let state = ChatListState::default();

        assert_eq!(state.selected_index(&ids(&["a", "b"])), Some(0));
        assert_eq!(state.selected_index(&[]), None);
    }

    #[test]
    fn selection_moves_within_bounds() {
        let visible = ids(&["a", "b"]);
        let mut state = ChatListState::default();

        state.select_next(&visible);
        state.select_next(&visible);
        assert_eq!(state.selected_chat_id(), Some(&ChatId::new("b")));

        state.select_previous(&visible);
        state.select_previous(&visible);
        assert_eq!(state.selected_chat_id(), Some(&ChatId::new("a")));
    }

    #[test]
    fn selection_is_preserved_by_id_when_rows_reorder() {
        let mut state = ChatListState::default();
        state.select(Some(ChatId::new("b")));

        assert_eq!(state.selected_index(&ids(&["x", "b", "a"])), Some(1));
        assert_eq!(state.selected_index(&ids(&["x", "y"])), Some(0));
    }

    #[test]
    fn filter_applies_after_debounce() {
        let mut state = ChatListState::default();
        let start = Instant::now();

        state.push_search_char('r', start);
        state.push_search_char('u', start + Duration::from_millis(100));
        assert!(!state.poll_filter(start + Duration::from_millis(200)));
        assert_eq!(state.applied_filter(), "");

        assert!(state.poll_filter(start + Duration::from_millis(450)));
        assert_eq!(state.applied_filter(), "ru");
        assert_eq!(state.search_input(), "ru");
    }

    #[test]
    fn clear_search_resets_immediately() {
        let mut state = ChatListState::default();
        let start = Instant::now();
        state.push_search_char('a', start);
        state.poll_filter(start + SEARCH_DEBOUNCE);

        state.clear_search();

        assert_eq!(state.applied_filter(), "");
        assert!(!state.poll_filter(start + Duration::from_secs(2)));
    }

    #[test]
    fn delete_confirmation_round_trip() {
        let mut state = ChatListState::default();

        state.request_delete(ChatId::new("a"));
        assert_eq!(state.pending_delete(), Some(&ChatId::new("a")));

        state.cancel_delete();
        assert_eq!(state.take_pending_delete(), None);
    }
}
