//! Authentication error types.

use thiserror::Error;

use wellspring_core::{EmailError, OtpError};

/// Errors that can occur during sign-in operations.
///
/// Every variant is recoverable by retrying the user action that produced
/// it; nothing here is fatal to the process.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email address failed the syntactic check; no request was sent.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// One-time code failed the syntactic check; no request was sent.
    #[error("invalid code: {0}")]
    InvalidOtp(#[from] OtpError),

    /// The request could not complete (connect failure, timeout, transfer
    /// interrupted).
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),

    /// The request completed and the server declined it.
    #[error("{message}")]
    Rejected {
        /// Server-supplied reason, or a generic fallback.
        message: String,
    },

    /// The server reported success but the response was missing required
    /// fields or carried them in an unusable shape.
    #[error("malformed server response: {0}")]
    MalformedResponse(&'static str),

    /// Another sign-in transition is already in flight.
    #[error("another sign-in request is in flight")]
    RequestInFlight,
}

impl AuthError {
    /// Whether this error was produced without any network call being made.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(
            self,
            Self::InvalidEmail(_) | Self::InvalidOtp(_) | Self::RequestInFlight
        )
    }
}
