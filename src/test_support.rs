use std::{
    env,
    ffi::{OsStr, OsString},
    sync::{Mutex, MutexGuard, PoisonError},
};

static ENV_LOCK: Mutex<()> = Mutex::new(());

pub fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Sets an environment variable and restores the previous value on drop.
///
/// Callers must hold [`env_lock`].
pub struct ScopedEnv {
    key: &'static str,
    previous: Option<OsString>,
}

impl ScopedEnv {
    pub fn set(key: &'static str, value: impl AsRef<OsStr>) -> Self {
        let previous = env::var_os(key);
        // SAFETY: env is guarded by the process-wide test mutex.
        unsafe { env::set_var(key, value) };
        Self { key, previous }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        match self.previous.take() {
            // SAFETY: restoring env while the guard is held.
            Some(value) => unsafe { env::set_var(self.key, value) },
            // SAFETY: restoring env while the guard is held.
            None => unsafe { env::remove_var(self.key) },
        }
    }
}
