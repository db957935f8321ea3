//! Backward-growing message window.
//!
//! Only the newest `page * page_size` messages of a chat are rendered. Scrolling
//! near the top asks for one more page; the page arrives after a settling delay
//! and the caller keeps the viewport anchored by the height the new rows add.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, Instant},
};

use super::chat::ChatId;

pub const MESSAGES_PER_PAGE: usize = 20;

/// Rows from the top of the content at which an older page is requested.
pub const TOP_THRESHOLD_ROWS: usize = 2;

pub const SCROLL_THROTTLE: Duration = Duration::from_millis(100);

// Shared by every pager in the process, so a fresh pager never accepts a
// token issued before it was built.
static NEXT_ACTIVATION: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub start: usize,
    pub end: usize,
    pub has_more: bool,
}

impl PageWindow {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start..self.end).contains(&index)
    }
}

/// Suffix window of `total` messages for the given page.
pub fn page_window(total: usize, page: usize, page_size: usize) -> PageWindow {
    let shown = page.saturating_mul(page_size);
    PageWindow {
        start: total.saturating_sub(shown),
        end: total,
        has_more: total > shown,
    }
}

/// Ties a delayed page load to one chat activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageToken {
    pub chat_id: ChatId,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollCommand {
    Stay,
    JumpToBottom,
    SmoothToBottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    Idle,
    /// Fetch in flight; content height captured before growth.
    Waiting { height: usize },
    /// Page grew; the next layout pass applies the delta.
    Ready { height: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePager {
    page_size: usize,
    page: usize,
    chat_id: Option<ChatId>,
    generation: u64,
    anchor: Anchor,
    initial_load: bool,
    known_total: usize,
    throttle: Duration,
    last_scroll_event: Option<Instant>,
}

impl Default for MessagePager {
    fn default() -> Self {
        Self::new(MESSAGES_PER_PAGE, SCROLL_THROTTLE)
    }
}

impl MessagePager {
    pub fn new(page_size: usize, throttle: Duration) -> Self {
        Self {
            page_size: page_size.max(1),
            page: 1,
            chat_id: None,
            generation: 0,
            anchor: Anchor::Idle,
            initial_load: true,
            known_total: 0,
            throttle,
            last_scroll_event: None,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn chat_id(&self) -> Option<&ChatId> {
        self.chat_id.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_fetching_older(&self) -> bool {
        !matches!(self.anchor, Anchor::Idle)
    }

    pub fn window(&self, total: usize) -> PageWindow {
        page_window(total, self.page, self.page_size)
    }

    /// Starts a new activation: page 1, no fetch in flight, initial load armed.
    ///
    /// Tokens issued before this call are no longer accepted.
    pub fn activate(&mut self, chat_id: Option<ChatId>) {
        self.generation = NEXT_ACTIVATION.fetch_add(1, Ordering::Relaxed);
        self.chat_id = chat_id;
        self.page = 1;
        self.anchor = Anchor::Idle;
        self.initial_load = true;
        self.known_total = 0;
        self.last_scroll_event = None;
    }

    /// Handles an upward scroll event at `offset_rows` from the top.
    ///
    /// Returns a token when an older page should be loaded.
    pub fn on_scroll_up(
        &mut self,
        offset_rows: usize,
        content_height: usize,
        total: usize,
        ai_typing: bool,
        now: Instant,
    ) -> Option<PageToken> {
        if let Some(last) = self.last_scroll_event {
            if now.saturating_duration_since(last) < self.throttle {
                return None;
            }
        }
        self.last_scroll_event = Some(now);

        if offset_rows >= TOP_THRESHOLD_ROWS {
            return None;
        }

        let chat_id = self.chat_id.clone()?;
        if !self.window(total).has_more || ai_typing || self.is_fetching_older() {
            return None;
        }

        self.anchor = Anchor::Waiting {
            height: content_height,
        };
        Some(PageToken {
            chat_id,
            generation: self.generation,
        })
    }

    /// Grows the window by one page if the token belongs to this activation.
    pub fn complete_older(&mut self, token: &PageToken) -> bool {
        let Anchor::Waiting { height } = self.anchor else {
            return false;
        };

        if token.generation != self.generation || self.chat_id.as_ref() != Some(&token.chat_id) {
            return false;
        }

        self.page += 1;
        self.anchor = Anchor::Ready { height };
        true
    }

    /// After the grown window is laid out, returns how many rows were added
    /// above the previous content and ends the fetch.
    pub fn take_anchor_delta(&mut self, new_height: usize) -> Option<usize> {
        let Anchor::Ready { height } = self.anchor else {
            return None;
        };

        self.anchor = Anchor::Idle;
        Some(new_height.saturating_sub(height))
    }

    /// Decides how to scroll after the chat's message count is observed.
    pub fn on_message_count(&mut self, total: usize) -> ScrollCommand {
        if self.initial_load {
            if total == 0 {
                return ScrollCommand::Stay;
            }
            self.initial_load = false;
            self.known_total = total;
            return ScrollCommand::JumpToBottom;
        }

        if total == self.known_total {
            return ScrollCommand::Stay;
        }

        self.known_total = total;
        ScrollCommand::SmoothToBottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_pager() -> MessagePager {
        let mut pager = MessagePager::default();
        pager.activate(Some(ChatId::new("c")));
        pager
    }

    #[test]
    fn window_for_45_messages_grows_over_three_pages() {
        assert_eq!(
            page_window(45, 1, 20),
            PageWindow {
                start: 25,
                end: 45,
                has_more: true
            }
        );
        assert_eq!(
            page_window(45, 2, 20),
            PageWindow {
                start: 5,
                end: 45,
                has_more: true
            }
        );
        assert_eq!(
            page_window(45, 3, 20),
            PageWindow {
                start: 0,
                end: 45,
                has_more: false
            }
        );
    }

    #[test]
    fn window_shows_everything_when_page_exceeds_total() {
        let window = page_window(7, 1, 20);

        assert_eq!(window.start, 0);
        assert_eq!(window.len(), 7);
        assert!(!window.has_more);
    }

    #[test]
    fn window_on_exact_multiple_has_no_more() {
        assert!(!page_window(40, 2, 20).has_more);
        assert!(page_window(41, 2, 20).has_more);
    }

    #[test]
    fn load_older_cycle_matches_paging_contract() {
        let mut pager = active_pager();
        let start = Instant::now();

        for (step, expected_len, expected_more) in [(1, 40, true), (2, 45, false)] {
            let now = start + Duration::from_millis(200 * step);
            let token = pager
                .on_scroll_up(0, 100, 45, false, now)
                .expect("older page should be requested");
            assert!(pager.complete_older(&token));
            assert_eq!(pager.take_anchor_delta(150), Some(50));

            let window = pager.window(45);
            assert_eq!(window.len(), expected_len);
            assert_eq!(window.has_more, expected_more);
        }

        let later = start + Duration::from_secs(5);
        assert_eq!(pager.on_scroll_up(0, 100, 45, false, later), None);
    }

    #[test]
    fn scroll_away_from_top_does_not_request() {
        let mut pager = active_pager();

        let token = pager.on_scroll_up(TOP_THRESHOLD_ROWS, 100, 45, false, Instant::now());

        assert_eq!(token, None);
        assert!(!pager.is_fetching_older());
    }

    #[test]
    fn no_request_while_ai_is_typing() {
        let mut pager = active_pager();

        assert_eq!(pager.on_scroll_up(0, 100, 45, true, Instant::now()), None);
    }

    #[test]
    fn second_request_while_fetch_in_flight_is_ignored() {
        let mut pager = active_pager();
        let now = Instant::now();
        pager
            .on_scroll_up(0, 100, 45, false, now)
            .expect("first request");

        let again = pager.on_scroll_up(0, 100, 45, false, now + Duration::from_millis(500));

        assert_eq!(again, None);
    }

    #[test]
    fn rapid_scroll_events_are_throttled() {
        let mut pager = active_pager();
        let now = Instant::now();

        assert_eq!(pager.on_scroll_up(10, 100, 45, false, now), None);
        assert_eq!(
            pager.on_scroll_up(0, 100, 45, false, now + Duration::from_millis(50)),
            None
        );
        assert!(pager
            .on_scroll_up(0, 100, 45, false, now + Duration::from_millis(150))
            .is_some());
    }

    #[test]
    fn token_from_previous_activation_is_rejected() {
        let mut pager = active_pager();
        let token = pager
            .on_scroll_up(0, 100, 45, false, Instant::now())
            .expect("request");

        pager.activate(Some(ChatId::new("other")));

        assert!(!pager.complete_older(&token));
        assert_eq!(pager.page(), 1);
    }

    #[test]
    fn token_from_another_pager_is_rejected() {
        let mut earlier = active_pager();
        let token = earlier
            .on_scroll_up(0, 100, 45, false, Instant::now())
            .expect("request");

        let mut current = active_pager();
        current
            .on_scroll_up(0, 100, 45, false, Instant::now())
            .expect("request");

        assert!(!current.complete_older(&token));
        assert_eq!(current.page(), 1);
        assert!(current.is_fetching_older());
    }

    #[test]
    fn activation_resets_page_and_fetch_state() {
        let mut pager = active_pager();
        let token = pager
            .on_scroll_up(0, 100, 45, false, Instant::now())
            .expect("request");
        pager.complete_older(&token);

        pager.activate(Some(ChatId::new("c")));

        assert_eq!(pager.page(), 1);
        assert!(!pager.is_fetching_older());
        assert_eq!(pager.take_anchor_delta(10), None);
    }

    #[test]
    fn initial_load_jumps_once_then_smooth_scrolls_on_new_messages() {
        let mut pager = active_pager();

        assert_eq!(pager.on_message_count(0), ScrollCommand::Stay);
        assert_eq!(pager.on_message_count(3), ScrollCommand::JumpToBottom);
        assert_eq!(pager.on_message_count(3), ScrollCommand::Stay);
        assert_eq!(pager.on_message_count(4), ScrollCommand::SmoothToBottom);

        pager.activate(Some(ChatId::new("d")));
        assert_eq!(pager.on_message_count(4), ScrollCommand::JumpToBottom);
    }
}
