//! One-time passcode type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`OtpCode`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum OtpError {
    /// The input string is empty.
    #[error("code cannot be empty")]
    Empty,
    /// The input has the wrong number of digits.
    #[error("code must be exactly {expected} digits")]
    WrongLength {
        /// Required number of digits.
        expected: usize,
    },
    /// The input contains a non-digit character.
    #[error("code must contain only digits")]
    NonNumeric,
}

/// A one-time passcode entered by the user during sign-in.
///
/// The backend emails a numeric code; this type checks the shape of what the
/// user typed before it is ever sent over the wire. Whether the code is
/// actually the one that was issued is the backend's decision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct OtpCode(String);

impl OtpCode {
    /// Number of digits in a valid code.
    pub const LENGTH: usize = 6;

    /// Parse an `OtpCode` from user input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, is not exactly
    /// [`Self::LENGTH`] characters, or contains a non-digit.
    pub fn parse(s: &str) -> Result<Self, OtpError> {
        if s.is_empty() {
            return Err(OtpError::Empty);
        }

        if !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(OtpError::NonNumeric);
        }

        if s.len() != Self::LENGTH {
            return Err(OtpError::WrongLength {
                expected: Self::LENGTH,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OtpCode {
    type Err = OtpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
