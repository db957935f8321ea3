use crate::{
    domain::auth::AuthState,
    infra::{error::AppError, persistence, storage_layout::StorageLayout},
    usecases::startup::acquire_session_lock,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogoutOutcome {
    pub was_logged_in: bool,
}

/// Clears the stored session while keeping chats and theme.
pub fn logout_and_reset(layout: &StorageLayout) -> Result<LogoutOutcome, AppError> {
    layout.ensure_dirs()?;
    let _lock = acquire_session_lock(layout.session_lock_file())?;

    let path = layout.store_file();
    let Some(mut snapshot) = persistence::load_store(&path)? else {
        return Ok(LogoutOutcome {
            was_logged_in: false,
        });
    };

    let was_logged_in = snapshot.auth.is_logged_in;
    snapshot.auth = AuthState::default();
    persistence::save_store(&path, &snapshot)?;
    tracing::info!(code = "AUTH_LOGGED_OUT", was_logged_in, "session cleared");

    Ok(LogoutOutcome { was_logged_in })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        auth::UserProfile,
        chat::{Chat, ChatId},
        store::PersistedStore,
    };

    fn layout() -> (tempfile::TempDir, StorageLayout) {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let layout = StorageLayout::under(dir.path().join("gemclone"));
        (dir, layout)
    }

    #[test]
    fn logout_clears_auth_and_keeps_chats() {
        let (_dir, layout) = layout();
        layout.ensure_dirs().expect("dirs should be created");
        let snapshot = PersistedStore {
            auth: AuthState::logged_in(UserProfile {
                phone: "+15551234567".to_owned(),
                name: "User".to_owned(),
            }),
            chats: vec![Chat::new(ChatId::new("c1"), "Kept", 0)],
            active_chat_id: Some(ChatId::new("c1")),
        };
        persistence::save_store(&layout.store_file(), &snapshot).expect("snapshot should be saved");

        let outcome = logout_and_reset(&layout).expect("logout should succeed");

        assert!(outcome.was_logged_in);
        let stored = persistence::load_store(&layout.store_file())
            .expect("store should load")
            .expect("store should exist");
        assert_eq!(stored.auth, AuthState::default());
        assert_eq!(stored.chats.len(), 1);
    }

    #[test]
    fn logout_is_idempotent_when_nothing_is_stored() {
        let (_dir, layout) = layout();

        let outcome = logout_and_reset(&layout).expect("logout should succeed");

        assert!(!outcome.was_logged_in);
        assert!(!layout.store_file().exists());
    }
}
