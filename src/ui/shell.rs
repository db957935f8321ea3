use anyhow::{bail, Result};

use crate::{
    domain::shell_state::ShellState,
    usecases::{
        context::AppContext,
        contracts::{AppEventSource, ShellOrchestrator},
    },
};

use super::{terminal::TerminalSession, view};

pub fn start(
    context: &AppContext,
    event_source: &mut dyn AppEventSource,
    orchestrator: &mut dyn ShellOrchestrator,
) -> Result<()> {
    if !orchestrator.state().store().has_hydrated() {
        bail!("UI_STORE_NOT_HYDRATED: chat store must be loaded before the shell starts");
    }

    tracing::info!(
        log_level = %context.config.logging.level,
        theme = %orchestrator.state().store().theme,
        chats = orchestrator.state().store().chats.len(),
        "starting TUI shell"
    );

    let mut terminal = TerminalSession::new()?;
    run_loop(
        |state| terminal.draw(|frame| view::render(frame, state)),
        event_source,
        orchestrator,
    )?;

    tracing::info!("TUI shell stopped");
    Ok(())
}

/// Draws a frame, then handles one event, until the orchestrator stops.
fn run_loop<D>(
    mut draw: D,
    event_source: &mut dyn AppEventSource,
    orchestrator: &mut dyn ShellOrchestrator,
) -> Result<()>
where
    D: FnMut(&mut ShellState) -> Result<()>,
{
    while orchestrator.state().is_running() {
        draw(orchestrator.state_mut())?;

        if let Some(event) = event_source.next_event()? {
            orchestrator.handle_event(event)?;
        }
    }

    Ok(())
}
