//! Local key/value storage backing the session credential

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{AppError, AppResult};

/// Synchronous string key/value store, the local-storage equivalent
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> AppResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> AppResult<()>;
    fn remove(&self, key: &str) -> AppResult<()>;
}

/// Store kept in a single JSON document on disk.
///
/// Each write rewrites the whole document through a sibling temp file and a
/// rename, so readers never observe a half-written file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> AppResult<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                AppError::Internal(format!(
                    "Corrupt store document {}: {}",
                    self.path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_document(&self, doc: &BTreeMap<String, String>) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(doc)?)?;
        restrict_permissions(&tmp)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Document to modify; a corrupt one is replaced rather than repaired
    fn document_for_update(&self) -> AppResult<BTreeMap<String, String>> {
        match self.read_document() {
            Err(AppError::Internal(reason)) => {
                tracing::warn!("{}; starting a fresh document", reason);
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn guard(&self) -> AppResult<std::sync::MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|_| AppError::Internal("Store lock poisoned".to_string()))
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> AppResult<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> AppResult<()> {
    Ok(())
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let _guard = self.guard()?;
        Ok(self.read_document()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let _guard = self.guard()?;
        let mut doc = self.document_for_update()?;
        doc.insert(key.to_string(), value.to_string());
        self.write_document(&doc)
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        let _guard = self.guard()?;
        let mut doc = match self.read_document() {
            Ok(doc) => doc,
            Err(AppError::Internal(reason)) => {
                tracing::warn!("{}; clearing it", reason);
                return self.write_document(&BTreeMap::new());
            }
            Err(e) => return Err(e),
        };
        if doc.remove(key).is_some() {
            self.write_document(&doc)?;
        }
        Ok(())
    }
}

/// In-process store, used by tests and one-shot sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> AppResult<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| AppError::Internal("Store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}
