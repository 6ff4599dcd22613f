//! Credential token types.
//!
//! Both tokens implement `Debug` by hand so that credential material never
//! leaks into logs or error reports.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`AccessToken`] or [`RefreshToken`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum TokenError {
    /// The input string is empty.
    #[error("token cannot be empty")]
    Empty,
    /// The access token does not have the three dot-separated segments of a
    /// signed token.
    #[error("access token must have three dot-separated segments")]
    MalformedStructure,
}

/// Short-lived bearer credential authorizing protected requests.
///
/// Structurally a signed token: three non-empty dot-separated segments. The
/// signature is never verified here - only the shape is checked, so that a
/// truncated or garbled server response is caught before it is persisted.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Parse an `AccessToken`, checking the three-segment structure.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or does not consist of three
    /// non-empty dot-separated segments.
    pub fn parse(s: &str) -> Result<Self, TokenError> {
        if s.is_empty() {
            return Err(TokenError::Empty);
        }

        let mut segments = s.split('.');
        let well_formed = segments.by_ref().take(3).filter(|seg| !seg.is_empty()).count() == 3
            && segments.next().is_none();
        if !well_formed {
            return Err(TokenError::MalformedStructure);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the token and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

/// Opaque credential for obtaining new access tokens.
///
/// Stored and cleared alongside the access token but never otherwise
/// exercised by this crate.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct RefreshToken(String);

impl RefreshToken {
    /// Parse a `RefreshToken`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty.
    pub fn parse(s: &str) -> Result<Self, TokenError> {
        if s.is_empty() {
            return Err(TokenError::Empty);
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the token and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RefreshToken").field(&"[REDACTED]").finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_valid() {
        let token = AccessToken::parse("a.b.c").unwrap();
        assert_eq!(token.as_str(), "a.b.c");
    }

    #[test]
    fn test_access_token_empty() {
        assert!(matches!(AccessToken::parse(""), Err(TokenError::Empty)));
    }

    #[test]
    fn test_access_token_wrong_segment_count() {
        assert!(matches!(
            AccessToken::parse("a.b"),
            Err(TokenError::MalformedStructure)
        ));
        assert!(matches!(
            AccessToken::parse("a.b.c.d"),
            Err(TokenError::MalformedStructure)
        ));
        assert!(matches!(
            AccessToken::parse("opaque-token"),
            Err(TokenError::MalformedStructure)
        ));
    }

    #[test]
    fn test_access_token_empty_segment() {
        assert!(matches!(
            AccessToken::parse("a..c"),
            Err(TokenError::MalformedStructure)
        ));
        assert!(matches!(
            AccessToken::parse(".b.c"),
            Err(TokenError::MalformedStructure)
        ));
    }

    #[test]
    fn test_refresh_token_opaque() {
        assert!(RefreshToken::parse("r").is_ok());
        assert!(RefreshToken::parse("anything goes here").is_ok());
        assert!(matches!(RefreshToken::parse(""), Err(TokenError::Empty)));
    }

    #[test]
    fn test_debug_redacts() {
        let access = AccessToken::parse("header.claims.sig").unwrap();
        let refresh = RefreshToken::parse("super-secret").unwrap();

        let debug = format!("{access:?} {refresh:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("claims"));
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_serde_roundtrip() {
        let token = AccessToken::parse("a.b.c").unwrap();
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(json, "\"a.b.c\"");

        let parsed: AccessToken = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, token);
    }
}
