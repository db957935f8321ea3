use std::{
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf},
};

use fs2::FileExt;

use crate::{
    domain::{
        auth::AuthFlow,
        store::{AppStore, PersistedStore},
        theme::Theme,
    },
    infra::{error::AppError, persistence, storage_layout::StorageLayout},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupFlowState {
    LaunchTui,
    GuidedAuth,
}

/// Exclusive advisory lock on `session.lock`, released on drop.
#[derive(Debug)]
pub struct SessionLockGuard {
    file: File,
    path: PathBuf,
}

impl Drop for SessionLockGuard {
    fn drop(&mut self) {
        if let Err(error) = FileExt::unlock(&self.file) {
            tracing::debug!(path = %self.path.display(), %error, "session lock release failed");
        }
    }
}

pub struct StartupPlan {
    pub store: AppStore,
    pub state: StartupFlowState,
}

pub fn acquire_session_lock(path: PathBuf) -> Result<SessionLockGuard, AppError> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&path)
        .map_err(|source| AppError::SessionLockCreate {
            path: path.clone(),
            source,
        })?;

    if file.try_lock_exclusive().is_err() {
        return Err(AppError::SessionStoreBusy { path });
    }

    Ok(SessionLockGuard { file, path })
}

/// Hydrates the store from disk and decides whether login is needed.
pub fn plan_startup(layout: &StorageLayout, now_ms: i64) -> Result<StartupPlan, AppError> {
    let theme = load_theme_or_default(&layout.preferences_file());
    let persisted = load_store_or_backup(&layout.store_file())?;
    let store = AppStore::hydrate(persisted, theme, now_ms);

    let state = if AuthFlow::from_state(&store.state().auth).is_authenticated() {
        StartupFlowState::LaunchTui
    } else {
        StartupFlowState::GuidedAuth
    };
    tracing::info!(
        code = "STARTUP_PLANNED",
        chats = store.state().chats.len(),
        ?state,
        "store hydrated"
    );

    Ok(StartupPlan { store, state })
}

fn load_theme_or_default(path: &Path) -> Theme {
    persistence::load_theme(path).unwrap_or_else(|error| {
        tracing::warn!(code = "PREFERENCES_UNREADABLE", %error, "using default theme");
        Theme::default()
    })
}

/// A snapshot that fails to parse is moved aside and startup begins fresh.
fn load_store_or_backup(path: &Path) -> Result<Option<PersistedStore>, AppError> {
    match persistence::load_store(path) {
        Ok(snapshot) => Ok(snapshot),
        Err(AppError::StateParse { source, .. }) => {
            let backup = path.with_extension("json.corrupt");
            fs::rename(path, &backup).map_err(|source| AppError::StateWrite {
                path: backup.clone(),
                source,
            })?;
            tracing::warn!(
                code = "STATE_CORRUPT_BACKED_UP",
                backup = %backup.display(),
                error = %source,
                "stored state was unreadable"
            );
            Ok(None)
        }
        Err(error) => Err(error),
    }
}
