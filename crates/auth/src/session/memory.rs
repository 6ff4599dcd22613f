//! In-memory session store.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use wellspring_core::{AccessToken, RefreshToken, UserId, UserProfile};

use super::{Session, SessionStore, StorageHealth, keys};

/// Key used by the health-check probe.
const PROBE_KEY: &str = "__storage_probe__";

/// Session store backed by a process-local map.
///
/// Used by tests and by hosts that opt out of persistence; sessions do not
/// survive a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemoryStore {
    fn set_session(&self, access: &AccessToken, refresh: &RefreshToken, user: &UserProfile) {
        let mut entries = self.entries();
        entries.insert(keys::ACCESS_TOKEN.to_string(), access.as_str().to_string());
        entries.insert(keys::REFRESH_TOKEN.to_string(), refresh.as_str().to_string());
        entries.insert(keys::USER_ID.to_string(), user.id.as_str().to_string());
        match serde_json::to_string(user) {
            Ok(json) => {
                entries.insert(keys::USER_INFO.to_string(), json);
            }
            Err(err) => {
                tracing::warn!("failed to serialize profile snapshot: {err}");
            }
        }
    }

    fn get_session(&self) -> Session {
        let entries = self.entries();
        Session {
            access_token: entries
                .get(keys::ACCESS_TOKEN)
                .and_then(|raw| AccessToken::parse(raw).ok()),
            refresh_token: entries
                .get(keys::REFRESH_TOKEN)
                .and_then(|raw| RefreshToken::parse(raw).ok()),
            user_id: entries
                .get(keys::USER_ID)
                .filter(|raw| !raw.is_empty())
                .map(|raw| UserId::from(raw.as_str())),
            user_profile: entries
                .get(keys::USER_INFO)
                .and_then(|json| serde_json::from_str(json).ok()),
        }
    }

    fn clear_session(&self) {
        let mut entries = self.entries();
        entries.remove(keys::ACCESS_TOKEN);
        entries.remove(keys::REFRESH_TOKEN);
        entries.remove(keys::USER_ID);
        entries.remove(keys::USER_INFO);
    }

    fn check_storage_health(&self) -> StorageHealth {
        let mut entries = self.entries();
        entries.insert(PROBE_KEY.to_string(), "ok".to_string());
        entries.remove(PROBE_KEY);
        StorageHealth::ok()
    }
}
