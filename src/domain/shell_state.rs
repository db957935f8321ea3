use std::sync::Arc;

use super::{
    chat::ChatId, chat_list_state::ChatListState, message_input_state::MessageInputState,
    notification::Notifications, open_chat_state::OpenChatState, store::StoreState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivePane {
    #[default]
    ChatList,
    ChatSearch,
    Messages,
    MessageInput,
    /// The composer is asking for an image path.
    AttachPath,
}

/// Everything the view needs for one frame.
///
/// `store` is the latest immutable snapshot; the orchestrator replaces it
/// after each store action.
#[derive(Debug, Clone)]
pub struct ShellState {
    running: bool,
    active_pane: ActivePane,
    store: Arc<StoreState>,
    chat_list: ChatListState,
    open_chat: OpenChatState,
    message_input: MessageInputState,
    attach_path: String,
    notifications: Notifications,
}

impl Default for ShellState {
    fn default() -> Self {
        Self {
            running: true,
            active_pane: ActivePane::default(),
            store: Arc::new(StoreState::default()),
            chat_list: ChatListState::default(),
            open_chat: OpenChatState::default(),
            message_input: MessageInputState::default(),
            attach_path: String::new(),
            notifications: Notifications::default(),
        }
    }
}

impl ShellState {
    pub fn new(store: Arc<StoreState>, open_chat: OpenChatState) -> Self {
        Self {
            store,
            open_chat,
            ..Self::default()
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn active_pane(&self) -> ActivePane {
        self.active_pane
    }

    pub fn set_active_pane(&mut self, pane: ActivePane) {
        self.active_pane = pane;
    }

    pub fn store(&self) -> &StoreState {
        &self.store
    }

    pub fn set_store(&mut self, store: Arc<StoreState>) {
        self.store = store;
    }

    /// Ids of the chats visible under the applied sidebar filter, in display order.
    pub fn visible_chat_ids(&self) -> Vec<ChatId> {
        self.store
            .filtered_chats(self.chat_list.applied_filter())
            .map(|chat| chat.id.clone())
            .collect()
    }

    pub fn chat_list(&self) -> &ChatListState {
        &self.chat_list
    }

    pub fn chat_list_mut(&mut self) -> &mut ChatListState {
        &mut self.chat_list
    }

    pub fn open_chat(&self) -> &OpenChatState {
        &self.open_chat
    }

    pub fn open_chat_mut(&mut self) -> &mut OpenChatState {
        &mut self.open_chat
    }

    pub fn message_input(&self) -> &MessageInputState {
        &self.message_input
    }

    pub fn message_input_mut(&mut self) -> &mut MessageInputState {
        &mut self.message_input
    }

    pub fn attach_path(&self) -> &str {
        &self.attach_path
    }

    pub fn attach_path_mut(&mut self) -> &mut String {
        &mut self.attach_path
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }
}
