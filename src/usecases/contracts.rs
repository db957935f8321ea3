use std::time::Duration;

use anyhow::Result;

use crate::domain::{
    events::{AppEvent, ReplyDelivery},
    pagination::PageToken,
    shell_state::ShellState,
};

pub trait AppEventSource {
    fn next_event(&mut self) -> Result<Option<AppEvent>>;
}

pub trait ShellOrchestrator {
    fn state(&self) -> &ShellState;
    fn state_mut(&mut self) -> &mut ShellState;
    fn handle_event(&mut self, event: AppEvent) -> Result<()>;
}

/// Runs delayed effects and reports them back as events.
pub trait EffectScheduler {
    fn schedule_reply(&self, delivery: ReplyDelivery, delay: Duration);
    fn schedule_older_page(&self, token: PageToken, delay: Duration);
}

impl<T: EffectScheduler + ?Sized> EffectScheduler for &T {
    fn schedule_reply(&self, delivery: ReplyDelivery, delay: Duration) {
        (**self).schedule_reply(delivery, delay);
    }

    fn schedule_older_page(&self, token: PageToken, delay: Duration) {
        (**self).schedule_older_page(token, delay);
    }
}

#[cfg(test)]
pub mod testing {
    use std::cell::RefCell;

    use super::*;

    /// Records scheduled effects instead of running them.
    #[derive(Debug, Default)]
    pub struct RecordingScheduler {
        pub replies: RefCell<Vec<(ReplyDelivery, Duration)>>,
        pub pages: RefCell<Vec<(PageToken, Duration)>>,
    }

    impl RecordingScheduler {
        pub fn take_replies(&self) -> Vec<(ReplyDelivery, Duration)> {
            self.replies.borrow_mut().drain(..).collect()
        }

        pub fn take_pages(&self) -> Vec<(PageToken, Duration)> {
            self.pages.borrow_mut().drain(..).collect()
        }
    }

    impl EffectScheduler for RecordingScheduler {
        fn schedule_reply(&self, delivery: ReplyDelivery, delay: Duration) {
            self.replies.borrow_mut().push((delivery, delay));
        }

        fn schedule_older_page(&self, token: PageToken, delay: Duration) {
            self.pages.borrow_mut().push((token, delay));
        }
    }
}
