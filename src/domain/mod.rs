//! Domain layer: core entities and business rules.

pub mod auth;
pub mod chat;
pub mod chat_list_state;
pub mod country;
pub mod debounce;
pub mod events;
pub mod message;
pub mod message_input_state;
pub mod notification;
pub mod open_chat_state;
pub mod pagination;
pub mod shell_state;
pub mod store;
pub mod theme;

/// Returns the domain module name for smoke checks.
pub fn module_name() -> &'static str {
    "domain"
}
