use std::{sync::mpsc::Sender, time::Duration};

use tokio::runtime::{Builder, Handle, Runtime};

use crate::{
    domain::{
        events::{AppEvent, ReplyDelivery},
        pagination::PageToken,
    },
    infra::error::AppError,
    usecases::contracts::EffectScheduler,
};

const SIMULATION_EVENT_DROPPED: &str = "SIMULATION_EVENT_DROPPED";
const SIMULATION_RUNTIME_STARTED: &str = "SIMULATION_RUNTIME_STARTED";

/// Background runtime for delayed effects.
///
/// Each effect is a task that sleeps, then posts an [`AppEvent`] to the UI
/// thread. Pending tasks are dropped with the runtime.
#[derive(Debug)]
pub struct SimulationRuntime {
    runtime: Runtime,
    events: Sender<AppEvent>,
}

impl SimulationRuntime {
    pub fn start(events: Sender<AppEvent>) -> Result<Self, AppError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("gemclone-sim")
            .enable_all()
            .build()
            .map_err(AppError::RuntimeStart)?;

        tracing::info!(code = SIMULATION_RUNTIME_STARTED, "simulation runtime started");
        Ok(Self { runtime, events })
    }

    pub fn handle(&self) -> Handle {
        self.runtime.handle().clone()
    }

    /// Blocks the calling thread for `delay` on the runtime's timer.
    #[cfg(test)]
    pub fn sleep_blocking(&self, delay: Duration) {
        self.runtime
            .block_on(async move { tokio::time::sleep(delay).await });
    }

    fn post_after(&self, delay: Duration, event: AppEvent) {
        let events = self.events.clone();
        self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if events.send(event).is_err() {
                tracing::debug!(
                    code = SIMULATION_EVENT_DROPPED,
                    "event receiver closed before delivery"
                );
            }
        });
    }
}

impl EffectScheduler for SimulationRuntime {
    fn schedule_reply(&self, delivery: ReplyDelivery, delay: Duration) {
        tracing::debug!(
            chat_id = %delivery.ticket.chat_id,
            seq = delivery.ticket.seq,
            delay_ms = delay.as_millis() as u64,
            "reply scheduled"
        );
        self.post_after(delay, AppEvent::ReplyReady(delivery));
    }

    fn schedule_older_page(&self, token: PageToken, delay: Duration) {
        tracing::debug!(
            chat_id = %token.chat_id,
            generation = token.generation,
            "older page scheduled"
        );
        self.post_after(delay, AppEvent::OlderPageReady(token));
    }
}
