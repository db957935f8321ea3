use std::time::Instant;

use super::{
    chat::ChatId,
    pagination::{MessagePager, PageToken, PageWindow, ScrollCommand},
};

/// Scroll margin - number of rows to keep visible above/below the selection.
const SCROLL_MARGIN: usize = 2;

/// Rows advanced per tick while smooth-scrolling to the bottom.
const SMOOTH_SCROLL_STEP: usize = 3;

/// Messages pane state: page window, viewport and selected message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OpenChatState {
    pager: MessagePager,
    /// Absolute index into the chat's messages.
    selected_index: Option<usize>,
    scroll_offset: usize,
    content_height: usize,
    viewport_height: usize,
    smooth_target: Option<usize>,
    pending_jump: bool,
    follow_selection: bool,
}

impl OpenChatState {
    pub fn with_pager(pager: MessagePager) -> Self {
        Self {
            pager,
            ..Self::default()
        }
    }

    pub fn chat_id(&self) -> Option<&ChatId> {
        self.pager.chat_id()
    }

    pub fn pager(&self) -> &MessagePager {
        &self.pager
    }

    pub fn window(&self, total: usize) -> PageWindow {
        self.pager.window(total)
    }

    pub fn is_fetching_older(&self) -> bool {
        self.pager.is_fetching_older()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    /// Switches to another chat (or none) and resets paging and scrolling.
    pub fn activate(&mut self, chat_id: Option<ChatId>) {
        self.pager.activate(chat_id);
        self.selected_index = None;
        self.scroll_offset = 0;
        self.content_height = 0;
        self.smooth_target = None;
        self.pending_jump = false;
        self.follow_selection = false;
    }

    /// Reacts to the current message count of the open chat.
    pub fn observe_message_count(&mut self, total: usize) {
        match self.pager.on_message_count(total) {
            ScrollCommand::Stay => {}
            ScrollCommand::JumpToBottom => {
                self.selected_index = total.checked_sub(1);
                self.pending_jump = true;
                self.smooth_target = None;
            }
            ScrollCommand::SmoothToBottom => {
                self.selected_index = total.checked_sub(1);
                self.smooth_target = Some(usize::MAX);
            }
        }
    }

    /// Applies a layout pass: content and viewport heights in rows, plus the
    /// row range of the selected message when it is in the window.
    pub fn sync_layout(
        &mut self,
        content_height: usize,
        viewport_height: usize,
        selected_rows: Option<(usize, usize)>,
    ) {
        self.content_height = content_height;
        self.viewport_height = viewport_height;

        if let Some(delta) = self.pager.take_anchor_delta(content_height) {
            self.scroll_offset = self.scroll_offset.saturating_add(delta);
        }

        if self.pending_jump {
            self.scroll_offset = self.max_offset();
            self.pending_jump = false;
        } else if self.follow_selection {
            if let Some((top, bottom)) = selected_rows {
                self.keep_rows_visible(top, bottom);
            }
        }
        self.follow_selection = false;

        if let Some(target) = self.smooth_target {
            self.smooth_target = Some(target.min(self.max_offset()));
        }

        self.scroll_offset = self.scroll_offset.min(self.max_offset());
    }

    /// Advances an in-progress smooth scroll by one step.
    pub fn tick(&mut self) {
        let Some(target) = self.smooth_target else {
            return;
        };
        let target = target.min(self.max_offset());

        if self.scroll_offset < target {
            self.scroll_offset = (self.scroll_offset + SMOOTH_SCROLL_STEP).min(target);
        } else if self.scroll_offset > target {
            self.scroll_offset = self
                .scroll_offset
                .saturating_sub(SMOOTH_SCROLL_STEP)
                .max(target);
        }

        if self.scroll_offset == target {
            self.smooth_target = None;
        }
    }

    pub fn select_next(&mut self, total: usize) {
        if total == 0 {
            return;
        }

        self.selected_index = match self.selected_index {
            None => Some(total - 1),
            Some(idx) if idx + 1 < total => Some(idx + 1),
            Some(idx) => Some(idx),
        };
        self.follow_selection = true;
        self.smooth_target = None;
    }

    /// Moves the selection up within the window and reports whether an older
    /// page should be fetched.
    pub fn select_previous(
        &mut self,
        total: usize,
        ai_typing: bool,
        now: Instant,
    ) -> Option<PageToken> {
        if total == 0 {
            return None;
        }

        let window = self.pager.window(total);
        self.selected_index = match self.selected_index {
            None => Some(total - 1),
            Some(idx) if idx > window.start => Some(idx - 1),
            Some(idx) => Some(idx),
        };
        self.follow_selection = true;
        self.smooth_target = None;

        self.scroll_event(total, ai_typing, now)
    }

    /// Scrolls the viewport up by `rows`; an upward scroll may fetch older messages.
    pub fn scroll_up(
        &mut self,
        rows: usize,
        total: usize,
        ai_typing: bool,
        now: Instant,
    ) -> Option<PageToken> {
        self.scroll_offset = self.scroll_offset.saturating_sub(rows);
        self.smooth_target = None;
        self.scroll_event(total, ai_typing, now)
    }

    pub fn scroll_down(&mut self, rows: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(rows).min(self.max_offset());
        self.smooth_target = None;
    }

    /// Delivers a delayed page load; stale tokens are ignored.
    pub fn complete_older(&mut self, token: &PageToken) -> bool {
        self.pager.complete_older(token)
    }

    fn scroll_event(&mut self, total: usize, ai_typing: bool, now: Instant) -> Option<PageToken> {
        self.pager.on_scroll_up(
            self.scroll_offset,
            self.content_height,
            total,
            ai_typing,
            now,
        )
    }

    fn max_offset(&self) -> usize {
        self.content_height.saturating_sub(self.viewport_height)
    }

    fn keep_rows_visible(&mut self, top: usize, bottom: usize) {
        if self.viewport_height == 0 {
            return;
        }

        let margin = SCROLL_MARGIN.min(self.viewport_height / 2);

        if top < self.scroll_offset + margin {
            self.scroll_offset = top.saturating_sub(margin);
        }

        let visible_bottom = self.scroll_offset + self.viewport_height;
        if bottom + margin >= visible_bottom {
            let wanted = (bottom + margin + 1).saturating_sub(self.viewport_height);
            // a message taller than the viewport keeps its first row visible
            self.scroll_offset = wanted.min(top);
        }
    }
}
