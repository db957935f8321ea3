//! Process-wide application state with typed actions.
//!
//! `AppStore` owns an `Arc<StoreState>`; every action produces a new state
//! (copy-on-write), so snapshots handed out earlier never change under a
//! reader. Invalid ids are reported through `StoreError` instead of being
//! ignored.

use std::{
    collections::BTreeSet,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    auth::AuthState,
    chat::{Chat, ChatId},
    message::Message,
    theme::Theme,
};

const SEED_CHAT_ID: &str = "1";
const SEED_CHAT_TITLE: &str = "Initial Conversation";
const SEED_USER_TEXT: &str =
    "Hello, can you help me understand how to build a terminal chat client in Rust?";
const SEED_AI_TEXT: &str = "I'd be happy to! A terminal chat client usually pairs an event loop \
with a rendering layer such as ratatui, keeps its state in plain structs, and pushes slow work \
onto background tasks. What part are you most interested in learning about first?";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("chat `{0}` does not exist")]
    ChatNotFound(ChatId),
    #[error("chat `{0}` already exists")]
    DuplicateChat(ChatId),
    #[error("reply for chat `{0}` is no longer expected")]
    StaleTicket(ChatId),
}

/// Identifies one pending synthetic reply.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReplyTicket {
    pub chat_id: ChatId,
    pub generation: u64,
    pub seq: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoreState {
    pub auth: AuthState,
    pub theme: Theme,
    pub sidebar_open: bool,
    pub chats: Vec<Chat>,
    pub active_chat_id: Option<ChatId>,
    pending_replies: BTreeSet<ReplyTicket>,
    hydrated: bool,
}

impl StoreState {
    pub fn chat(&self, chat_id: &ChatId) -> Option<&Chat> {
        self.chats.iter().find(|chat| &chat.id == chat_id)
    }

    pub fn active_chat(&self) -> Option<&Chat> {
        self.active_chat_id
            .as_ref()
            .and_then(|chat_id| self.chat(chat_id))
    }

    /// True while at least one synthetic reply is pending.
    pub fn is_ai_typing(&self) -> bool {
        !self.pending_replies.is_empty()
    }

    pub fn is_composing_in(&self, chat_id: &ChatId) -> bool {
        self.pending_replies
            .iter()
            .any(|ticket| &ticket.chat_id == chat_id)
    }

    pub fn has_hydrated(&self) -> bool {
        self.hydrated
    }

    pub fn filtered_chats<'a>(&'a self, filter: &'a str) -> impl Iterator<Item = &'a Chat> + 'a {
        self.chats.iter().filter(move |chat| chat.matches_filter(filter))
    }

    fn chat_mut(&mut self, chat_id: &ChatId) -> Option<&mut Chat> {
        self.chats.iter_mut().find(|chat| &chat.id == chat_id)
    }
}

// Process-wide so a store hydrated after logout never reuses an earlier
// session's generations or reply numbers.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);
static NEXT_REPLY_SEQ: AtomicU64 = AtomicU64::new(1);

fn issue_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

fn issue_reply_seq() -> u64 {
    NEXT_REPLY_SEQ.fetch_add(1, Ordering::Relaxed)
}

/// The part of the store that survives restarts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PersistedStore {
    #[serde(default)]
    pub auth: AuthState,
    #[serde(default)]
    pub chats: Vec<Chat>,
    #[serde(default)]
    pub active_chat_id: Option<ChatId>,
}

#[derive(Debug, Clone, Default)]
pub struct AppStore {
    state: Arc<StoreState>,
}

impl AppStore {
    /// Builds a hydrated store from persisted data, or a seeded one on first run.
    pub fn hydrate(persisted: Option<PersistedStore>, theme: Theme, now_ms: i64) -> Self {
        let persisted = persisted.unwrap_or_else(|| seed(now_ms));
        let mut state = StoreState {
            auth: persisted.auth,
            theme,
            ..StoreState::default()
        };

        for mut chat in persisted.chats {
            if state.chat(&chat.id).is_some() {
                tracing::warn!(chat_id = %chat.id, "dropping duplicate chat from snapshot");
                continue;
            }
            chat.generation = issue_generation();
            state.chats.push(chat);
        }

        state.active_chat_id = persisted
            .active_chat_id
            .filter(|chat_id| state.chat(chat_id).is_some())
            .or_else(|| state.chats.first().map(|chat| chat.id.clone()));
        state.hydrated = true;

        Self {
            state: Arc::new(state),
        }
    }

    pub fn snapshot(&self) -> Arc<StoreState> {
        Arc::clone(&self.state)
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn persisted(&self) -> PersistedStore {
        PersistedStore {
            auth: self.state.auth.clone(),
            chats: self.state.chats.clone(),
            active_chat_id: self.state.active_chat_id.clone(),
        }
    }

    fn mutate(&mut self) -> &mut StoreState {
        Arc::make_mut(&mut self.state)
    }

    pub fn set_auth_state(&mut self, auth: AuthState) {
        self.mutate().auth = auth;
    }

    pub fn logout(&mut self) {
        self.mutate().auth = AuthState::default();
    }

    /// Flips the theme and returns the new value.
    pub fn toggle_theme(&mut self) -> Theme {
        let state = self.mutate();
        state.theme = state.theme.toggled();
        state.theme
    }

    pub fn toggle_sidebar(&mut self) -> bool {
        let state = self.mutate();
        state.sidebar_open = !state.sidebar_open;
        state.sidebar_open
    }

    /// Inserts at the head of the collection and makes the chat active.
    pub fn add_chat(&mut self, mut chat: Chat) -> Result<ChatId, StoreError> {
        if self.state.chat(&chat.id).is_some() {
            return Err(StoreError::DuplicateChat(chat.id));
        }

        let state = self.mutate();
        chat.generation = issue_generation();
        let chat_id = chat.id.clone();
        state.chats.insert(0, chat);
        state.active_chat_id = Some(chat_id.clone());
        Ok(chat_id)
    }

    /// Creates an empty chat, activates it and closes the sidebar.
    pub fn new_chat(&mut self, now_ms: i64) -> Result<ChatId, StoreError> {
        let mut chat = Chat::blank(now_ms);
        while self.state.chat(&chat.id).is_some() {
            chat.id = ChatId::generate();
        }

        let chat_id = self.add_chat(chat)?;
        self.mutate().sidebar_open = false;
        Ok(chat_id)
    }

    pub fn set_active_chat_id(&mut self, chat_id: &ChatId) -> Result<(), StoreError> {
        if self.state.chat(chat_id).is_none() {
            return Err(StoreError::ChatNotFound(chat_id.clone()));
        }

        self.mutate().active_chat_id = Some(chat_id.clone());
        Ok(())
    }

    /// Removes a chat. When it was active, the first remaining chat becomes active.
    pub fn delete_chat(&mut self, chat_id: &ChatId) -> Result<Chat, StoreError> {
        let index = self
            .state
            .chats
            .iter()
            .position(|chat| &chat.id == chat_id)
            .ok_or_else(|| StoreError::ChatNotFound(chat_id.clone()))?;

        let state = self.mutate();
        let removed = state.chats.remove(index);
        state
            .pending_replies
            .retain(|ticket| &ticket.chat_id != chat_id);

        if state.active_chat_id.as_ref() == Some(chat_id) {
            state.active_chat_id = state.chats.first().map(|chat| chat.id.clone());
        }

        Ok(removed)
    }

    /// Appends to the chat's message sequence.
    pub fn add_message(&mut self, chat_id: &ChatId, message: Message) -> Result<(), StoreError> {
        if self.state.chat(chat_id).is_none() {
            return Err(StoreError::ChatNotFound(chat_id.clone()));
        }

        if let Some(chat) = self.mutate().chat_mut(chat_id) {
            chat.messages.push(message);
        }
        Ok(())
    }

    /// Registers a pending reply for the chat; the composing flag turns on.
    pub fn begin_reply(&mut self, chat_id: &ChatId) -> Result<ReplyTicket, StoreError> {
        let generation = self
            .state
            .chat(chat_id)
            .map(|chat| chat.generation)
            .ok_or_else(|| StoreError::ChatNotFound(chat_id.clone()))?;

        let state = self.mutate();
        let ticket = ReplyTicket {
            chat_id: chat_id.clone(),
            generation,
            seq: issue_reply_seq(),
        };
        state.pending_replies.insert(ticket.clone());
        Ok(ticket)
    }

    /// Lands a reply if its ticket is still pending and its chat still exists
    /// in the same incarnation.
    ///
    /// The ticket is retired either way.
    pub fn complete_reply(&mut self, ticket: &ReplyTicket, message: Message) -> Result<(), StoreError> {
        let is_current = self
            .state
            .chat(&ticket.chat_id)
            .is_some_and(|chat| chat.generation == ticket.generation);

        let state = self.mutate();
        let was_pending = state.pending_replies.remove(ticket);

        if !was_pending || !is_current {
            return Err(StoreError::StaleTicket(ticket.chat_id.clone()));
        }

        if let Some(chat) = state.chat_mut(&ticket.chat_id) {
            chat.messages.push(message);
        }
        Ok(())
    }
}

fn seed(now_ms: i64) -> PersistedStore {
    let mut chat = Chat::new(ChatId::new(SEED_CHAT_ID), SEED_CHAT_TITLE, now_ms);
    chat.messages.push(Message::user(SEED_USER_TEXT, None, now_ms - 50_000));
    chat.messages.push(Message::ai(SEED_AI_TEXT, now_ms - 40_000));

    PersistedStore {
        auth: AuthState::default(),
        active_chat_id: Some(chat.id.clone()),
        chats: vec![chat],
    }
}
