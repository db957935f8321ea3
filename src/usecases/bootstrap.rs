use std::path::Path;

use crate::{
    infra::{
        self, config::FileConfigAdapter, contracts::ConfigAdapter, error::AppError,
        storage_layout::StorageLayout,
    },
    usecases::context::AppContext,
};

/// Loads config, prepares the storage directories and starts file logging.
pub fn bootstrap(config_path: Option<&Path>) -> Result<AppContext, AppError> {
    let (config, layout) = build_parts(config_path)?;
    layout.ensure_dirs()?;

    let log_guard = infra::logging::init(&config.logging, &layout.logs_dir)?;
    tracing::info!(
        code = "APP_BOOTSTRAPPED",
        config_dir = %layout.config_dir.display(),
        "bootstrap complete"
    );

    Ok(AppContext::new(config, layout, Some(log_guard)))
}

fn build_parts(
    config_path: Option<&Path>,
) -> Result<(infra::config::AppConfig, StorageLayout), AppError> {
    let config = FileConfigAdapter::new(config_path)
        .load()
        .map_err(AppError::Other)?;
    let layout = StorageLayout::resolve()?;

    Ok((config, layout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{env_lock, ScopedEnv};

    #[test]
    fn builds_parts_with_default_config_when_file_is_missing() {
        let _guard = env_lock();
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let _xdg = ScopedEnv::set("XDG_CONFIG_HOME", dir.path());

        let (config, layout) = build_parts(Some(Path::new("./missing-config.toml")))
            .expect("parts should build from defaults");

        assert_eq!(config, crate::infra::config::AppConfig::default());
        assert_eq!(layout.config_dir, dir.path().join("gemclone"));
    }
}
