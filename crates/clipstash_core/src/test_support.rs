//! Shared test-only helpers for clipstash_core.

use crate::Database;
use std::sync::{Mutex, OnceLock};
use tempfile::TempDir;

/// Creates an isolated temporary database and returns it with the temp dir.
///
/// Keep the [`TempDir`] alive for the full test to preserve the backing files.
pub(crate) fn setup_temp_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let db_path = temp_dir.path().join("db");
    let db = Database::open(db_path.to_str().expect("db path")).expect("db");
    (db, temp_dir)
}

/// Process-wide lock serializing environment mutation across test threads.
pub(crate) fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

#[allow(unused_unsafe)]
fn write_env(key: &str, value: Option<&str>) {
    // SAFETY: callers hold `env_lock` while mutating the environment.
    unsafe {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }
}

/// Restores an environment variable value on drop.
pub(crate) struct EnvGuard {
    key: String,
    previous: Option<String>,
}

impl EnvGuard {
    pub(crate) fn set(key: &str, value: &str) -> Self {
        let previous = std::env::var(key).ok();
        write_env(key, Some(value));
        Self {
            key: key.to_string(),
            previous,
        }
    }

    pub(crate) fn remove(key: &str) -> Self {
        let previous = std::env::var(key).ok();
        write_env(key, None);
        Self {
            key: key.to_string(),
            previous,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        write_env(self.key.as_str(), self.previous.as_deref());
    }
}
