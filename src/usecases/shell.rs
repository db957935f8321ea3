use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::Result;
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    domain::{
        chat::ChatId,
        events::{AppEvent, KeyInput, ReplyDelivery},
        open_chat_state::OpenChatState,
        pagination::{MessagePager, PageToken, SCROLL_THROTTLE},
        shell_state::{ActivePane, ShellState},
        store::{AppStore, StoreError},
    },
    infra::{
        config::AppConfig,
        contracts::{ClipboardWriter, StatePersistence},
        image::{load_attachment, ImageError},
    },
    simulation::reply::ReplyDelayRange,
};

use super::{
    contracts::{EffectScheduler, ShellOrchestrator},
    send_message::{deliver_reply, send_message, EMPTY_MESSAGE_TEXT},
};

pub const COPIED_TEXT: &str = "Copied to clipboard!";
pub const COPY_FAILED_TEXT: &str = "Failed to copy.";
pub const NOT_AN_IMAGE_TEXT: &str = "Please select an image file.";
pub const CHAT_DELETED_TEXT: &str = "Chat deleted.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellSettings {
    pub reply_delay: ReplyDelayRange,
    /// Pause before an older page is revealed.
    pub page_settle: Duration,
    pub page_size: usize,
}

impl ShellSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            reply_delay: ReplyDelayRange::from_config(&config.simulation),
            page_settle: Duration::from_millis(config.simulation.page_settle_ms),
            page_size: config.ui.page_size,
        }
    }
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Routes UI events into store actions and view state.
///
/// The orchestrator owns the store; after every event the view receives a
/// fresh snapshot.
pub struct DefaultShellOrchestrator<P, C, S>
where
    P: StatePersistence,
    C: ClipboardWriter,
    S: EffectScheduler,
{
    state: ShellState,
    store: AppStore,
    persistence: P,
    clipboard: C,
    scheduler: S,
    settings: ShellSettings,
    rng: StdRng,
}

impl<P, C, S> DefaultShellOrchestrator<P, C, S>
where
    P: StatePersistence,
    C: ClipboardWriter,
    S: EffectScheduler,
{
    pub fn new(
        store: AppStore,
        persistence: P,
        clipboard: C,
        scheduler: S,
        settings: ShellSettings,
    ) -> Self {
        let pager = MessagePager::new(settings.page_size, SCROLL_THROTTLE);
        let mut orchestrator = Self {
            state: ShellState::new(store.snapshot(), OpenChatState::with_pager(pager)),
            store,
            persistence,
            clipboard,
            scheduler,
            settings,
            rng: StdRng::from_entropy(),
        };

        orchestrator.state.set_active_pane(ActivePane::MessageInput);
        orchestrator.refresh();
        orchestrator
    }

    pub fn store(&self) -> &AppStore {
        &self.store
    }

    fn on_key(&mut self, key: &KeyInput, now: Instant) {
        match self.state.active_pane() {
            ActivePane::ChatList => self.on_chat_list_key(key, now),
            ActivePane::ChatSearch => self.on_search_key(key, now),
            ActivePane::Messages => self.on_messages_key(key, now),
            ActivePane::MessageInput => self.on_input_key(key, now),
            ActivePane::AttachPath => self.on_attach_key(key, now),
        }
    }

    fn on_chat_list_key(&mut self, key: &KeyInput, now: Instant) {
        if self.state.chat_list().pending_delete().is_some() {
            self.on_delete_confirmation(key, now);
            return;
        }

        let visible = self.state.visible_chat_ids();
        match key.key.as_str() {
            "j" | "down" => self.state.chat_list_mut().select_next(&visible),
            "k" | "up" => self.state.chat_list_mut().select_previous(&visible),
            "enter" | "l" => self.open_selected_chat(&visible),
            "n" => self.new_chat(now),
            "d" => {
                if let Some(chat_id) = selected_visible(&self.state, &visible) {
                    self.state.chat_list_mut().request_delete(chat_id);
                }
            }
            "/" => self.state.set_active_pane(ActivePane::ChatSearch),
            "i" => self.state.set_active_pane(ActivePane::MessageInput),
            "tab" => self.state.set_active_pane(ActivePane::Messages),
            "q" => self.state.stop(),
            _ => self.on_global_key(key),
        }
    }

    fn on_delete_confirmation(&mut self, key: &KeyInput, now: Instant) {
        match key.key.as_str() {
            "y" | "enter" => {
                let Some(chat_id) = self.state.chat_list_mut().take_pending_delete() else {
                    return;
                };
                match self.store.delete_chat(&chat_id) {
                    Ok(_) => {
                        tracing::info!(code = "CHAT_DELETED", chat_id = %chat_id, "chat deleted");
                        self.persist();
                        self.state.notifications_mut().success(CHAT_DELETED_TEXT, now);
                    }
                    Err(error) => self.report_store_error(error, now),
                }
            }
            "n" | "esc" => self.state.chat_list_mut().cancel_delete(),
            _ => {}
        }
    }

    fn on_search_key(&mut self, key: &KeyInput, now: Instant) {
        match key.key.as_str() {
            "esc" => {
                self.state.chat_list_mut().clear_search();
                self.state.set_active_pane(ActivePane::ChatList);
            }
            "enter" | "down" | "tab" => self.state.set_active_pane(ActivePane::ChatList),
            "backspace" => self.state.chat_list_mut().pop_search_char(now),
            _ => {
                if let Some(ch) = key.as_char() {
                    self.state.chat_list_mut().push_search_char(ch, now);
                }
            }
        }
    }

    fn on_messages_key(&mut self, key: &KeyInput, now: Instant) {
        let total = self.active_message_count();
        let ai_typing = self
            .store
            .state()
            .active_chat_id
            .as_ref()
            .is_some_and(|chat_id| self.store.state().is_composing_in(chat_id));
        let page_rows = (self.state.open_chat().viewport_height() / 2).max(1);

        match key.key.as_str() {
            "j" | "down" => self.state.open_chat_mut().select_next(total),
            "k" | "up" => {
                let token = self
                    .state
                    .open_chat_mut()
                    .select_previous(total, ai_typing, now);
                self.schedule_older_page(token);
            }
            "pageup" => {
                let token = self
                    .state
                    .open_chat_mut()
                    .scroll_up(page_rows, total, ai_typing, now);
                self.schedule_older_page(token);
            }
            "pagedown" => self.state.open_chat_mut().scroll_down(page_rows),
            "y" => self.copy_selected_message(now),
            "i" | "enter" => self.state.set_active_pane(ActivePane::MessageInput),
            "h" | "esc" | "tab" => self.state.set_active_pane(ActivePane::ChatList),
            "n" => self.new_chat(now),
            "q" => self.state.stop(),
            _ => self.on_global_key(key),
        }
    }

    fn on_input_key(&mut self, key: &KeyInput, now: Instant) {
        if key.ctrl {
            match key.key.as_str() {
                "a" => {
                    self.state.attach_path_mut().clear();
                    self.state.set_active_pane(ActivePane::AttachPath);
                }
                "r" => {
                    if let Some(attachment) = self.state.message_input_mut().remove_attachment() {
                        self.state
                            .notifications_mut()
                            .info(format!("Removed {}.", attachment.file_name), now);
                    }
                }
                _ => {}
            }
            return;
        }

        match key.key.as_str() {
            "enter" => self.submit_message(now),
            "esc" => self.state.set_active_pane(ActivePane::Messages),
            "tab" => self.state.set_active_pane(ActivePane::ChatList),
            "backspace" => self.state.message_input_mut().delete_char_before(),
            "delete" => self.state.message_input_mut().delete_char_at(),
            "left" => self.state.message_input_mut().move_cursor_left(),
            "right" => self.state.message_input_mut().move_cursor_right(),
            "home" => self.state.message_input_mut().move_cursor_home(),
            "end" => self.state.message_input_mut().move_cursor_end(),
            _ => {
                if let Some(ch) = key.as_char() {
                    self.state.message_input_mut().insert_char(ch);
                }
            }
        }
    }

    fn on_attach_key(&mut self, key: &KeyInput, now: Instant) {
        match key.key.as_str() {
            "esc" => {
                self.state.attach_path_mut().clear();
                self.state.set_active_pane(ActivePane::MessageInput);
            }
            "enter" => self.attach_from_path(now),
            "backspace" => {
                self.state.attach_path_mut().pop();
            }
            _ => {
                if let Some(ch) = key.as_char() {
                    self.state.attach_path_mut().push(ch);
                }
            }
        }
    }

    /// Keys shared by the list and message panes.
    fn on_global_key(&mut self, key: &KeyInput) {
        match key.key.as_str() {
            "t" => {
                let theme = self.store.toggle_theme();
                if let Err(error) = self.persistence.save_theme(theme) {
                    tracing::warn!(code = "PREFERENCES_SAVE_FAILED", error = %error, "theme not saved");
                }
            }
            "b" => {
                self.store.toggle_sidebar();
            }
            "L" => self.logout(),
            _ => {}
        }
    }

    fn open_selected_chat(&mut self, visible: &[ChatId]) {
        let Some(chat_id) = selected_visible(&self.state, visible) else {
            return;
        };

        match self.store.set_active_chat_id(&chat_id) {
            Ok(()) => {
                if self.store.state().sidebar_open {
                    self.store.toggle_sidebar();
                }
                self.persist();
                self.state.set_active_pane(ActivePane::MessageInput);
            }
            Err(error) => self.report_store_error(error, Instant::now()),
        }
    }

    fn new_chat(&mut self, now: Instant) {
        match self.store.new_chat(now_ms()) {
            Ok(chat_id) => {
                tracing::info!(code = "CHAT_CREATED", chat_id = %chat_id, "new chat");
                self.persist();
                self.state.set_active_pane(ActivePane::MessageInput);
            }
            Err(error) => self.report_store_error(error, now),
        }
    }

    fn submit_message(&mut self, now: Instant) {
        if !self.state.message_input().can_send() {
            self.state.notifications_mut().error(EMPTY_MESSAGE_TEXT, now);
            return;
        }

        let chat_id = match self.store.state().active_chat_id.clone() {
            Some(chat_id) => chat_id,
            None => match self.store.new_chat(now_ms()) {
                Ok(chat_id) => chat_id,
                Err(error) => {
                    self.report_store_error(error, now);
                    return;
                }
            },
        };
        let draft = self.state.message_input_mut().take_draft();
        let delay = self.settings.reply_delay.sample(&mut self.rng);

        match send_message(
            &mut self.store,
            &self.scheduler,
            &chat_id,
            draft,
            delay,
            now_ms(),
        ) {
            Ok(ticket) => {
                tracing::debug!(chat_id = %ticket.chat_id, seq = ticket.seq, "message sent");
                self.persist();
            }
            Err(error) => {
                tracing::warn!(code = "MESSAGE_SEND_FAILED", error = %error, "message not sent");
                self.state.notifications_mut().error(error.to_string(), now);
            }
        }
    }

    fn attach_from_path(&mut self, now: Instant) {
        let raw = std::mem::take(self.state.attach_path_mut());
        self.state.set_active_pane(ActivePane::MessageInput);

        let Some(path) = expand_path(raw.trim()) else {
            return;
        };

        match load_attachment(&path) {
            Ok(attachment) => {
                self.state
                    .notifications_mut()
                    .info(format!("Attached {}.", attachment.file_name), now);
                self.state.message_input_mut().attach(attachment);
            }
            Err(ImageError::NotAnImage { .. }) => {
                self.state.notifications_mut().error(NOT_AN_IMAGE_TEXT, now);
            }
            Err(error) => {
                tracing::warn!(code = "ATTACHMENT_LOAD_FAILED", error = %error, "image not attached");
                self.state.notifications_mut().error(error.to_string(), now);
            }
        }
    }

    fn copy_selected_message(&mut self, now: Instant) {
        let text = self.state.open_chat().selected_index().and_then(|index| {
            self.store
                .state()
                .active_chat()
                .and_then(|chat| chat.messages.get(index))
                .map(|message| message.text.clone())
        });

        let Some(text) = text.filter(|text| !text.is_empty()) else {
            return;
        };

        match self.clipboard.copy_text(&text) {
            Ok(()) => self.state.notifications_mut().success(COPIED_TEXT, now),
            Err(error) => {
                tracing::warn!(code = "CLIPBOARD_WRITE_FAILED", error = %error, "copy failed");
                self.state.notifications_mut().error(COPY_FAILED_TEXT, now);
            }
        }
    }

    fn logout(&mut self) {
        self.store.logout();
        self.persist();
        tracing::info!(code = "AUTH_LOGGED_OUT", "logged out from the shell");
        self.state.stop();
    }

    fn on_tick(&mut self, now: Instant) {
        self.state.chat_list_mut().poll_filter(now);
        self.state.notifications_mut().prune(now);
        self.state.open_chat_mut().tick();
    }

    fn on_reply_ready(&mut self, delivery: ReplyDelivery) {
        match deliver_reply(&mut self.store, delivery, now_ms()) {
            Ok(()) => self.persist(),
            Err(StoreError::StaleTicket(chat_id)) => {
                tracing::info!(
                    code = "REPLY_STALE_TICKET",
                    chat_id = %chat_id,
                    "reply dropped for a removed chat"
                );
            }
            Err(error) => {
                tracing::warn!(code = "REPLY_DELIVERY_FAILED", error = %error, "reply dropped");
            }
        }
    }

    fn on_older_page_ready(&mut self, token: &PageToken) {
        if !self.state.open_chat_mut().complete_older(token) {
            tracing::debug!(
                chat_id = %token.chat_id,
                generation = token.generation,
                "stale page token ignored"
            );
        }
    }

    fn schedule_older_page(&self, token: Option<PageToken>) {
        if let Some(token) = token {
            self.scheduler
                .schedule_older_page(token, self.settings.page_settle);
        }
    }

    fn report_store_error(&mut self, error: StoreError, now: Instant) {
        tracing::warn!(code = "STORE_ACTION_REJECTED", error = %error, "store action failed");
        self.state.notifications_mut().error(error.to_string(), now);
    }

    fn persist(&mut self) {
        if let Err(error) = self.persistence.save_store(&self.store.persisted()) {
            tracing::warn!(code = "STATE_SAVE_FAILED", error = %error, "store snapshot not saved");
        }
    }

    fn active_message_count(&self) -> usize {
        self.store
            .state()
            .active_chat()
            .map_or(0, |chat| chat.messages.len())
    }

    /// Publishes the latest snapshot and re-targets the open chat if needed.
    fn refresh(&mut self) {
        self.state.set_store(self.store.snapshot());

        let active = self.store.state().active_chat_id.clone();
        if self.state.open_chat().chat_id() != active.as_ref() {
            self.state.chat_list_mut().select(active.clone());
            self.state.open_chat_mut().activate(active);
        }

        let total = self.active_message_count();
        self.state.open_chat_mut().observe_message_count(total);
    }
}

impl<P, C, S> ShellOrchestrator for DefaultShellOrchestrator<P, C, S>
where
    P: StatePersistence,
    C: ClipboardWriter,
    S: EffectScheduler,
{
    fn state(&self) -> &ShellState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ShellState {
        &mut self.state
    }

    fn handle_event(&mut self, event: AppEvent) -> Result<()> {
        let now = Instant::now();
        match event {
            AppEvent::Tick => self.on_tick(now),
            AppEvent::QuitRequested => self.state.stop(),
            AppEvent::InputKey(key) => self.on_key(&key, now),
            AppEvent::ReplyReady(delivery) => self.on_reply_ready(delivery),
            AppEvent::OlderPageReady(token) => self.on_older_page_ready(&token),
        }

        self.refresh();
        Ok(())
    }
}

fn selected_visible(state: &ShellState, visible: &[ChatId]) -> Option<ChatId> {
    state
        .chat_list()
        .selected_index(visible)
        .and_then(|index| visible.get(index))
        .cloned()
}

/// `~/` expands to the home directory.
fn expand_path(raw: &str) -> Option<PathBuf> {
    if raw.is_empty() {
        return None;
    }

    match raw.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
        None => Some(PathBuf::from(raw)),
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
