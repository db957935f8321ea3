//! Disk persistence: theme in `preferences.toml`, store snapshot in `state/store.json`.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Result;
use toml_edit::DocumentMut;

use crate::{
    domain::{store::PersistedStore, theme::Theme},
    infra::{contracts::StatePersistence, error::AppError, storage_layout::StorageLayout},
};

const THEME_KEY: &str = "theme";

/// Reads the theme preference; a missing file or key yields the default theme.
pub fn load_theme(path: &Path) -> Result<Theme, AppError> {
    let Some(raw) = read_optional(path)? else {
        return Ok(Theme::default());
    };

    let document = parse_preferences(path, &raw)?;
    let theme = match document.get(THEME_KEY).and_then(|item| item.as_str()) {
        Some(value) => value.parse::<Theme>().unwrap_or_else(|error| {
            tracing::warn!(code = "PREFERENCES_THEME_UNKNOWN", %error, "falling back to default theme");
            Theme::default()
        }),
        None => Theme::default(),
    };

    Ok(theme)
}

/// Updates the `theme` key in place, keeping other keys and comments.
pub fn save_theme(path: &Path, theme: Theme) -> Result<(), AppError> {
    let raw = read_optional(path)?.unwrap_or_default();
    let mut document = parse_preferences(path, &raw)?;
    document[THEME_KEY] = toml_edit::value(theme.as_str());

    write_atomically(path, document.to_string().as_bytes())
}

/// Reads the last store snapshot, if any.
pub fn load_store(path: &Path) -> Result<Option<PersistedStore>, AppError> {
    let Some(raw) = read_optional(path)? else {
        return Ok(None);
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| AppError::StateParse {
            path: path.to_path_buf(),
            source,
        })
}

pub fn save_store(path: &Path, snapshot: &PersistedStore) -> Result<(), AppError> {
    let encoded = serde_json::to_vec_pretty(snapshot).map_err(AppError::StateEncode)?;
    write_atomically(path, &encoded)
}

fn parse_preferences(path: &Path, raw: &str) -> Result<DocumentMut, AppError> {
    raw.parse::<DocumentMut>()
        .map_err(|source| AppError::PreferencesParse {
            path: path.to_path_buf(),
            source,
        })
}

fn read_optional(path: &Path) -> Result<Option<String>, AppError> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(Some(raw)),
        Err(source) if source.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(AppError::StateRead {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    let tmp_path = path.with_extension("tmp");
    let to_error = |source| AppError::StateWrite {
        path: path.to_path_buf(),
        source,
    };

    fs::write(&tmp_path, bytes).map_err(to_error)?;
    fs::rename(&tmp_path, path).map_err(to_error)
}

/// [`StatePersistence`] backed by the files of a [`StorageLayout`].
#[derive(Debug, Clone)]
pub struct FileStatePersistence {
    store_file: PathBuf,
    preferences_file: PathBuf,
}

impl FileStatePersistence {
    pub fn new(layout: &StorageLayout) -> Self {
        Self {
            store_file: layout.store_file(),
            preferences_file: layout.preferences_file(),
        }
    }
}

impl StatePersistence for FileStatePersistence {
    fn save_store(&mut self, snapshot: &PersistedStore) -> Result<()> {
        Ok(save_store(&self.store_file, snapshot)?)
    }

    fn save_theme(&mut self, theme: Theme) -> Result<()> {
        Ok(save_theme(&self.preferences_file, theme)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        auth::{AuthState, UserProfile},
        chat::{Chat, ChatId},
        message::Message,
    };

    #[test]
    fn theme_defaults_when_preferences_are_missing() {
        let dir = tempfile::tempdir().expect("temp dir should be created");

        let theme = load_theme(&dir.path().join("preferences.toml")).expect("theme should load");

        assert_eq!(theme, Theme::Dark);
    }

    #[test]
    fn save_theme_keeps_unrelated_keys_and_comments() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let path = dir.path().join("preferences.toml");
        fs::write(&path, "# my prefs\ntheme = \"dark\"\nfont = \"mono\"\n")
            .expect("preferences should be written");

        save_theme(&path, Theme::Light).expect("theme should be saved");

        let raw = fs::read_to_string(&path).expect("preferences should be readable");
        assert!(raw.contains("# my prefs"));
        assert!(raw.contains("font = \"mono\""));
        assert_eq!(load_theme(&path).expect("theme should load"), Theme::Light);
    }

    #[test]
    fn unknown_theme_value_falls_back_to_default() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let path = dir.path().join("preferences.toml");
        fs::write(&path, "theme = \"sepia\"\n").expect("preferences should be written");

        assert_eq!(load_theme(&path).expect("theme should load"), Theme::Dark);
    }

    #[test]
    fn store_snapshot_survives_a_disk_round_trip() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let path = dir.path().join("store.json");
        let mut chat = Chat::new(ChatId::new("c1"), "Trip plans", 1_000);
        chat.messages.push(Message::user("hi", None, 1_000));
        let snapshot = PersistedStore {
            auth: AuthState::logged_in(UserProfile {
                phone: "+15551234567".to_owned(),
                name: "User".to_owned(),
            }),
            chats: vec![chat],
            active_chat_id: Some(ChatId::new("c1")),
        };

        save_store(&path, &snapshot).expect("snapshot should be saved");
        let loaded = load_store(&path).expect("snapshot should load");

        assert_eq!(loaded, Some(snapshot));
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn missing_store_file_means_first_run() {
        let dir = tempfile::tempdir().expect("temp dir should be created");

        assert_eq!(load_store(&dir.path().join("store.json")).expect("load"), None);
    }

    #[test]
    fn corrupt_store_file_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let path = dir.path().join("store.json");
        fs::write(&path, "{not json").expect("fixture should be written");

        assert!(matches!(
            load_store(&path),
            Err(AppError::StateParse { .. })
        ));
    }
}
