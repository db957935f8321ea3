//! Sending a user message and landing its simulated reply.

use std::time::Duration;

use thiserror::Error;

use crate::{
    domain::{
        chat::ChatId,
        events::ReplyDelivery,
        message::Message,
        message_input_state::Draft,
        store::{AppStore, ReplyTicket, StoreError},
    },
    simulation::reply::compose_reply,
};

use super::contracts::EffectScheduler;

pub const EMPTY_MESSAGE_TEXT: &str = "Please enter a message or attach an image.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("{}", EMPTY_MESSAGE_TEXT)]
    EmptyMessage,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Appends the user's message and schedules one synthetic reply after `delay`.
///
/// The reply is tied to a ticket so it lands only if the chat still exists.
pub fn send_message(
    store: &mut AppStore,
    scheduler: &dyn EffectScheduler,
    chat_id: &ChatId,
    draft: Draft,
    delay: Duration,
    now_ms: i64,
) -> Result<ReplyTicket, SendMessageError> {
    let text = draft.text.trim().to_owned();
    if text.is_empty() && draft.image.is_none() {
        return Err(SendMessageError::EmptyMessage);
    }

    let has_image = draft.image.is_some();
    store.add_message(chat_id, Message::user(text.clone(), draft.image, now_ms))?;
    let ticket = store.begin_reply(chat_id)?;

    scheduler.schedule_reply(
        ReplyDelivery {
            ticket: ticket.clone(),
            text: compose_reply(&text, has_image, delay),
        },
        delay,
    );

    Ok(ticket)
}

/// Lands a delivered reply; stale tickets are rejected by the store.
pub fn deliver_reply(
    store: &mut AppStore,
    delivery: ReplyDelivery,
    now_ms: i64,
) -> Result<(), StoreError> {
    store.complete_reply(&delivery.ticket, Message::ai(delivery.text, now_ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            chat::Chat,
            message::{MessageKind, MessageRole},
            store::PersistedStore,
            theme::Theme,
        },
        usecases::contracts::testing::RecordingScheduler,
    };

    fn store_with_chat(id: &str) -> AppStore {
        let mut store = AppStore::hydrate(Some(PersistedStore::default()), Theme::Dark, 0);
        store
            .add_chat(Chat::new(ChatId::new(id), "Chat", 0))
            .expect("chat should be added");
        store
    }

    fn draft(text: &str, image: Option<&str>) -> Draft {
        Draft {
            text: text.to_owned(),
            image: image.map(ToOwned::to_owned),
        }
    }

    #[test]
    fn rejects_whitespace_without_image() {
        let mut store = store_with_chat("c");
        let scheduler = RecordingScheduler::default();

        let result = send_message(
            &mut store,
            &scheduler,
            &ChatId::new("c"),
            draft("   ", None),
            Duration::from_secs(2),
            10,
        );

        assert_eq!(result, Err(SendMessageError::EmptyMessage));
        assert!(store.state().chat(&ChatId::new("c")).map(|c| c.messages.is_empty()).unwrap_or(false));
        assert!(scheduler.take_replies().is_empty());
    }

    #[test]
    fn appends_message_and_schedules_one_reply() {
        let mut store = store_with_chat("c");
        let scheduler = RecordingScheduler::default();
        let chat_id = ChatId::new("c");

        let ticket = send_message(
            &mut store,
            &scheduler,
            &chat_id,
            draft(" hello ", None),
            Duration::from_millis(2_500),
            10,
        )
        .expect("message should be sent");

        let chat = store.state().chat(&chat_id).expect("chat exists");
        assert_eq!(chat.messages.len(), 1);
        assert_eq!(chat.messages[0].text, "hello");
        assert_eq!(chat.messages[0].role, MessageRole::User);
        assert!(store.state().is_ai_typing());

        let replies = scheduler.take_replies();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].0.ticket, ticket);
        assert_eq!(replies[0].1, Duration::from_millis(2_500));
        assert!(replies[0].0.text.starts_with("Here is your detailed answer: "));
        assert!(replies[0].0.text.contains("after a 2.5 second"));
    }

    #[test]
    fn image_only_message_is_accepted() {
        let mut store = store_with_chat("c");
        let scheduler = RecordingScheduler::default();
        let chat_id = ChatId::new("c");

        send_message(
            &mut store,
            &scheduler,
            &chat_id,
            draft("", Some("data:image/png;base64,AAAA")),
            Duration::from_secs(3),
            10,
        )
        .expect("image message should be sent");

        let chat = store.state().chat(&chat_id).expect("chat exists");
        assert_eq!(chat.messages[0].kind, MessageKind::Image);
        let replies = scheduler.take_replies();
        assert!(replies[0].0.text.starts_with("Based on the image and your request: "));
    }

    #[test]
    fn unknown_chat_is_reported_and_nothing_is_scheduled() {
        let mut store = store_with_chat("c");
        let scheduler = RecordingScheduler::default();

        let result = send_message(
            &mut store,
            &scheduler,
            &ChatId::new("missing"),
            draft("hi", None),
            Duration::from_secs(2),
            10,
        );

        assert_eq!(
            result,
            Err(SendMessageError::Store(StoreError::ChatNotFound(ChatId::new("missing"))))
        );
        assert!(!store.state().is_ai_typing());
        assert!(scheduler.take_replies().is_empty());
    }

    #[test]
    fn delivered_reply_lands_and_clears_composing() {
        let mut store = store_with_chat("c");
        let scheduler = RecordingScheduler::default();
        let chat_id = ChatId::new("c");
        send_message(&mut store, &scheduler, &chat_id, draft("hi", None), Duration::from_secs(2), 10)
            .expect("message should be sent");
        let (delivery, _) = scheduler.take_replies().remove(0);

        deliver_reply(&mut store, delivery, 2_010).expect("reply should land");

        let chat = store.state().chat(&chat_id).expect("chat exists");
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.messages[1].role, MessageRole::Ai);
        assert!(!store.state().is_ai_typing());
    }

    #[test]
    fn reply_for_deleted_chat_is_dropped() {
        let mut store = store_with_chat("c");
        store
            .add_chat(Chat::new(ChatId::new("other"), "Other", 0))
            .expect("chat should be added");
        let scheduler = RecordingScheduler::default();
        let chat_id = ChatId::new("c");
        send_message(&mut store, &scheduler, &chat_id, draft("hi", None), Duration::from_secs(2), 10)
            .expect("message should be sent");
        let (delivery, _) = scheduler.take_replies().remove(0);

        store.delete_chat(&chat_id).expect("chat should be deleted");
        let result = deliver_reply(&mut store, delivery, 2_010);

        assert_eq!(result, Err(StoreError::StaleTicket(chat_id)));
        assert!(store
            .state()
            .chats
            .iter()
            .all(|chat| chat.messages.is_empty()));
        assert!(!store.state().is_ai_typing());
    }
}
