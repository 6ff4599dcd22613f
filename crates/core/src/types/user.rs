//! User identity and profile snapshot types.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Server-assigned user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create a new ID from a string value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the underlying string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the ID carries no value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

/// Profile snapshot returned by the backend at verification time.
///
/// Only the identifier is interpreted; everything else the backend sends
/// (name, date of birth, preferences, whatever the profile screens need) is
/// carried opaquely and must round-trip through storage structurally intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// The user's server-assigned identifier.
    #[serde(rename = "_id")]
    pub id: UserId,
    /// Remaining profile fields, carried as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserProfile {
    /// Create a profile carrying only an identifier.
    #[must_use]
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            extra: serde_json::Map::new(),
        }
    }

    /// Look up an opaque profile field by name.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&serde_json::Value> {
        self.extra.get(field)
    }
}
