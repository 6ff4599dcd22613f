//! Session persistence.
//!
//! Credential material is written to a durable key-value layout of four
//! independent entries and read back on every authentication decision. The
//! store never propagates failures: reads degrade to absent values and
//! writes are best-effort, with [`SessionStore::check_storage_health`] as
//! the single place where a broken backing store becomes visible. Hosts
//! should surface an unhealthy store to the user up front, because it
//! otherwise manifests later as "logged out unexpectedly".

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use wellspring_core::{AccessToken, RefreshToken, UserId, UserProfile};

/// Keys of the persisted session entries.
pub mod keys {
    /// Key for the short-lived bearer credential.
    pub const ACCESS_TOKEN: &str = "accessToken";

    /// Key for the opaque refresh credential.
    pub const REFRESH_TOKEN: &str = "refreshToken";

    /// Key for the server-assigned user identifier.
    pub const USER_ID: &str = "userId";

    /// Key for the JSON-serialized profile snapshot.
    pub const USER_INFO: &str = "userInfo";
}

/// The persisted authenticated-identity state.
///
/// Every field is optional; a field is absent when it was never written,
/// was cleared, or could not be read back. Presence of the access token is
/// the one security-bearing signal - user id and profile are informational.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    /// Short-lived bearer credential.
    pub access_token: Option<AccessToken>,
    /// Opaque refresh credential.
    pub refresh_token: Option<RefreshToken>,
    /// Server-assigned user identifier.
    pub user_id: Option<UserId>,
    /// Last known profile snapshot.
    pub user_profile: Option<UserProfile>,
}

impl Session {
    /// Whether this session counts as authenticated for routing purposes.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

/// Result of probing the backing store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageHealth {
    /// Whether a write+delete probe succeeded.
    pub healthy: bool,
    /// Human-readable reason: `"ok"`, `"unavailable"`, or
    /// `"read-only-storage"`.
    pub reason: String,
}

impl StorageHealth {
    /// A healthy store.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            healthy: true,
            reason: "ok".to_string(),
        }
    }

    /// A store whose probe failed for the given reason.
    #[must_use]
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            healthy: false,
            reason: reason.into(),
        }
    }
}

/// Durable, synchronous key-value persistence of the session fields.
///
/// Implementations must not panic or return errors from any method other
/// than through the health check; a store that cannot read reports absent
/// values, and a store that cannot write logs and moves on.
pub trait SessionStore: Send + Sync {
    /// Write all four session entries from a successful verification.
    ///
    /// The user id is taken from the profile's identifier. If an individual
    /// write fails the store is left in whatever partial state the backing
    /// mechanism produced; the failure is logged, never raised.
    fn set_session(&self, access: &AccessToken, refresh: &RefreshToken, user: &UserProfile);

    /// Read the session, with absent fields for anything missing or
    /// unreadable.
    fn get_session(&self) -> Session;

    /// Remove all four session entries. Safe to call when already empty.
    fn clear_session(&self);

    /// Whether a non-empty access token is currently stored.
    fn is_authenticated(&self) -> bool {
        self.get_session().is_authenticated()
    }

    /// Probe the backing store with a no-op write+delete.
    fn check_storage_health(&self) -> StorageHealth;
}
