//! File-backed session store.
//!
//! The four session entries live in a single JSON document on disk so a
//! signed-in session survives restarts of the host shell. Some environments
//! hand us a location we cannot actually write (read-only installs, locked
//! down sandboxes, full disks); every failure here degrades to absent reads
//! and best-effort writes, and only the health probe reports it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde_json::{Map, Value};

use wellspring_core::{AccessToken, RefreshToken, UserId, UserProfile};

use super::{Session, SessionStore, StorageHealth, keys};

/// Session store backed by a JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes the read-modify-write cycle across clones of the handle.
    lock: Mutex<()>,
}

impl FileStore {
    /// Create a store persisting to the given file.
    ///
    /// The file and its parent directory are created lazily on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Default session file location under the platform data directory.
    ///
    /// Returns `None` when the platform reports no data directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("wellspring").join("session.json"))
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Map<String, Value> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Map::new(),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), "session file unreadable: {err}");
                return Map::new();
            }
        };

        match serde_json::from_str(&text) {
            Ok(Value::Object(doc)) => doc,
            Ok(_) => {
                tracing::warn!(path = %self.path.display(), "session file is not a JSON object");
                Map::new()
            }
            Err(err) => {
                tracing::warn!(path = %self.path.display(), "session file corrupt: {err}");
                Map::new()
            }
        }
    }

    fn persist(&self, doc: &Map<String, Value>) {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(err) = fs::create_dir_all(parent)
        {
            tracing::warn!(path = %self.path.display(), "failed to create session directory: {err}");
            return;
        }

        let json = match serde_json::to_string_pretty(&Value::Object(doc.clone())) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!("failed to serialize session document: {err}");
                return;
            }
        };

        // Write-then-rename so a crash mid-write never leaves a truncated
        // session file behind.
        let tmp = self.path.with_extension("tmp");
        if let Err(err) = fs::write(&tmp, json) {
            tracing::warn!(path = %tmp.display(), "failed to write session file: {err}");
            return;
        }
        if let Err(err) = fs::rename(&tmp, &self.path) {
            tracing::warn!(path = %self.path.display(), "failed to replace session file: {err}");
            let _ = fs::remove_file(&tmp);
        }
    }
}

impl SessionStore for FileStore {
    fn set_session(&self, access: &AccessToken, refresh: &RefreshToken, user: &UserProfile) {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut doc = self.load();
        doc.insert(
            keys::ACCESS_TOKEN.to_string(),
            Value::String(access.as_str().to_string()),
        );
        doc.insert(
            keys::REFRESH_TOKEN.to_string(),
            Value::String(refresh.as_str().to_string()),
        );
        doc.insert(
            keys::USER_ID.to_string(),
            Value::String(user.id.as_str().to_string()),
        );
        match serde_json::to_value(user) {
            Ok(profile) => {
                doc.insert(keys::USER_INFO.to_string(), profile);
            }
            Err(err) => {
                tracing::warn!("failed to serialize profile snapshot: {err}");
            }
        }
        self.persist(&doc);
    }

    fn get_session(&self) -> Session {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let doc = self.load();
        Session {
            access_token: doc
                .get(keys::ACCESS_TOKEN)
                .and_then(Value::as_str)
                .and_then(|raw| AccessToken::parse(raw).ok()),
            refresh_token: doc
                .get(keys::REFRESH_TOKEN)
                .and_then(Value::as_str)
                .and_then(|raw| RefreshToken::parse(raw).ok()),
            user_id: doc
                .get(keys::USER_ID)
                .and_then(Value::as_str)
                .filter(|raw| !raw.is_empty())
                .map(UserId::from),
            user_profile: doc
                .get(keys::USER_INFO)
                .cloned()
                .and_then(|value| serde_json::from_value(value).ok()),
        }
    }

    fn clear_session(&self) {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        // Nothing persisted yet - clearing must not create the file.
        if !self.path.exists() {
            return;
        }

        let mut doc = self.load();
        doc.remove(keys::ACCESS_TOKEN);
        doc.remove(keys::REFRESH_TOKEN);
        doc.remove(keys::USER_ID);
        doc.remove(keys::USER_INFO);
        self.persist(&doc);
    }

    fn check_storage_health(&self) -> StorageHealth {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(err) = fs::create_dir_all(parent)
        {
            return StorageHealth::failing(classify_io_error(&err));
        }

        let probe = self.path.with_extension("probe");
        if let Err(err) = fs::write(&probe, b"ok") {
            return StorageHealth::failing(classify_io_error(&err));
        }
        if let Err(err) = fs::remove_file(&probe) {
            tracing::warn!(path = %probe.display(), "failed to remove storage probe: {err}");
        }

        StorageHealth::ok()
    }
}

/// Map an I/O failure to a health-check reason.
fn classify_io_error(err: &io::Error) -> &'static str {
    match err.kind() {
        io::ErrorKind::PermissionDenied | io::ErrorKind::ReadOnlyFilesystem => "read-only-storage",
        _ => "unavailable",
    }
}
