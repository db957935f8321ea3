use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

const DEFAULT_TTL: Duration = Duration::from_secs(3);
const MAX_VISIBLE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub text: String,
    expires_at: Instant,
}

/// Transient toasts shown in the status area.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Notifications {
    queue: VecDeque<Notification>,
}

impl Notifications {
    pub fn push(&mut self, level: NotificationLevel, text: impl Into<String>, now: Instant) {
        self.queue.push_back(Notification {
            level,
            text: text.into(),
            expires_at: now + DEFAULT_TTL,
        });

        while self.queue.len() > MAX_VISIBLE {
            self.queue.pop_front();
        }
    }

    pub fn info(&mut self, text: impl Into<String>, now: Instant) {
        self.push(NotificationLevel::Info, text, now);
    }

    pub fn success(&mut self, text: impl Into<String>, now: Instant) {
        self.push(NotificationLevel::Success, text, now);
    }

    pub fn error(&mut self, text: impl Into<String>, now: Instant) {
        self.push(NotificationLevel::Error, text, now);
    }

    /// Drops expired toasts.
    pub fn prune(&mut self, now: Instant) {
        self.queue.retain(|item| item.expires_at > now);
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.queue.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.queue.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_expire_after_ttl() {
        let mut notifications = Notifications::default();
        let now = Instant::now();
        notifications.success("Copied to clipboard!", now);

        notifications.prune(now + Duration::from_secs(1));
        assert_eq!(
            notifications.latest().map(|item| item.text.as_str()),
            Some("Copied to clipboard!")
        );

        notifications.prune(now + DEFAULT_TTL);
        assert!(notifications.is_empty());
    }

    #[test]
    fn keeps_only_the_newest_few() {
        let mut notifications = Notifications::default();
        let now = Instant::now();
        for n in 0..5 {
            notifications.info(format!("n{n}"), now);
        }

        let texts: Vec<_> = notifications.iter().map(|item| item.text.clone()).collect();
        assert_eq!(texts, ["n2", "n3", "n4"]);
    }
}
