//! Persistent token storage
//!
//! The session keeps its token pair in a small synchronous key/value store so
//! a login survives process restarts. The absence of [`ACCESS_TOKEN_KEY`]
//! means "logged out".

use jobboard_core::{CoreError, CoreResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Storage key of the access token
pub const ACCESS_TOKEN_KEY: &str = "auth_token";

/// Storage key of the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Synchronous key/value storage for session tokens
pub trait TokenStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    ///
    /// Returns an error if the value cannot be persisted
    fn set(&self, key: &str, value: &str) -> CoreResult<()>;

    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be updated
    fn remove(&self, key: &str) -> CoreResult<()>;
}

/// Process-local store, forgotten on exit
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        self.values().remove(key);
        Ok(())
    }
}

/// Store backed by a JSON file, readable only by its owner on Unix
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store at `<data_dir>/session.json`
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join("session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> CoreResult<HashMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(HashMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, values: &HashMap<String, String>) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, permissions).map_err(|e| {
                CoreError::storage(format!(
                    "Failed to set permissions on {}: {e}",
                    self.path.display()
                ))
            })?;
        }

        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut HashMap<String, String>)) -> CoreResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut values = self.read()?;
        apply(&mut values);
        self.write(&values)
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        match self.read() {
            Ok(mut values) => values.remove(key),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "Failed to read token store");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        self.update(|values| {
            values.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        self.update(|values| {
            values.remove(key);
        })
    }
}
