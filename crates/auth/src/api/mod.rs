//! Wellspring backend REST client.
//!
//! The backend drives sign-in with two endpoints: one that emails a one-time
//! code to an address, and one that exchanges the address + code for tokens
//! and a profile snapshot.
//!
//! # Sign-in flow
//!
//! 1. `request_code()` - `POST /signup` with the address
//! 2. User reads the code from their inbox
//! 3. `verify_code()` - `POST /verify-otp` with address and code
//! 4. Persist the returned [`VerifiedSession`] via the session store
//!
//! The verify endpoint's success payload is decoded strictly: a "success"
//! response that does not carry a structurally valid access token, a refresh
//! token, and a user identifier is reported as
//! [`AuthError::MalformedResponse`] and never reaches the session store.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use wellspring_core::{AccessToken, Email, OtpCode, RefreshToken, UserProfile};

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Fallback shown when the send-code endpoint declines without a message.
const GENERIC_SEND_FAILURE: &str = "failed to send code";

/// Fallback shown when the verify endpoint declines without a message.
const GENERIC_VERIFY_FAILURE: &str = "failed to verify code";

// ─────────────────────────────────────────────────────────────────────────────
// Wire Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct SignupRequest<'a> {
    #[serde(rename = "Email")]
    email: &'a str,
}

#[derive(Debug, Deserialize)]
struct SignupResponse {
    success: bool,
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    #[serde(rename = "Email")]
    email: &'a str,
    #[serde(rename = "OTP")]
    otp: &'a str,
}

/// On success `message` is the token payload; on failure it is a
/// human-readable string.
#[derive(Debug, Deserialize)]
struct VerifyResponse {
    success: bool,
    #[serde(default)]
    message: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct VerifyPayload {
    #[serde(rename = "accessToken")]
    access_token: String,
    #[serde(rename = "refreshToken")]
    refresh_token: String,
    user: UserProfile,
}

/// Credential material produced by a successful verification.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedSession {
    /// Short-lived bearer credential.
    pub access_token: AccessToken,
    /// Opaque refresh credential.
    pub refresh_token: RefreshToken,
    /// Profile snapshot returned alongside the tokens.
    pub user: UserProfile,
}

// ─────────────────────────────────────────────────────────────────────────────
// Client Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Network client for the two sign-in transitions.
///
/// The flow controller holds this as a trait object so tests and alternative
/// hosts can substitute a scripted implementation for [`BackendClient`].
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Ask the backend to email a one-time code to the address.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Network`], [`AuthError::Rejected`], or
    /// [`AuthError::MalformedResponse`]. Never touches session state.
    async fn request_code(&self, email: &Email) -> Result<(), AuthError>;

    /// Exchange the address and code for tokens and a profile snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Network`], [`AuthError::Rejected`], or
    /// [`AuthError::MalformedResponse`].
    async fn verify_code(
        &self,
        email: &Email,
        code: &OtpCode,
    ) -> Result<VerifiedSession, AuthError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend Client
// ─────────────────────────────────────────────────────────────────────────────

/// REST client for the Wellspring backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

#[derive(Debug)]
struct BackendClientInner {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Create a new backend client.
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            inner: Arc::new(BackendClientInner {
                http: reqwest::Client::new(),
                base_url: config.api_base_url.as_str().trim_end_matches('/').to_string(),
            }),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.inner.base_url)
    }
}

#[async_trait]
impl AuthApi for BackendClient {
    async fn request_code(&self, email: &Email) -> Result<(), AuthError> {
        let response = self
            .inner
            .http
            .post(self.endpoint("signup"))
            .json(&SignupRequest {
                email: email.as_str(),
            })
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        let Ok(body) = serde_json::from_str::<SignupResponse>(&text) else {
            if status.is_success() {
                return Err(AuthError::MalformedResponse("signup response body"));
            }
            tracing::warn!(%status, "signup request declined without a readable body");
            return Err(AuthError::Rejected {
                message: GENERIC_SEND_FAILURE.to_string(),
            });
        };

        if body.success {
            Ok(())
        } else {
            Err(AuthError::Rejected {
                message: body
                    .message
                    .unwrap_or_else(|| GENERIC_SEND_FAILURE.to_string()),
            })
        }
    }

    async fn verify_code(
        &self,
        email: &Email,
        code: &OtpCode,
    ) -> Result<VerifiedSession, AuthError> {
        let response = self
            .inner
            .http
            .post(self.endpoint("verify-otp"))
            .json(&VerifyRequest {
                email: email.as_str(),
                otp: code.as_str(),
            })
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        let Ok(body) = serde_json::from_str::<VerifyResponse>(&text) else {
            if status.is_success() {
                return Err(AuthError::MalformedResponse("verify response body"));
            }
            tracing::warn!(%status, "verify request declined without a readable body");
            return Err(AuthError::Rejected {
                message: GENERIC_VERIFY_FAILURE.to_string(),
            });
        };

        if body.success {
            decode_verify_payload(body.message)
        } else {
            Err(AuthError::Rejected {
                message: rejection_message(body.message),
            })
        }
    }
}

/// Strictly decode the success payload of the verify endpoint.
fn decode_verify_payload(message: Option<Value>) -> Result<VerifiedSession, AuthError> {
    let Some(value) = message else {
        return Err(AuthError::MalformedResponse("missing token payload"));
    };

    let payload: VerifyPayload = serde_json::from_value(value)
        .map_err(|_| AuthError::MalformedResponse("token payload missing required fields"))?;

    let access_token = AccessToken::parse(&payload.access_token)
        .map_err(|_| AuthError::MalformedResponse("access token structure"))?;
    let refresh_token = RefreshToken::parse(&payload.refresh_token)
        .map_err(|_| AuthError::MalformedResponse("refresh token empty"))?;

    if payload.user.id.is_empty() {
        return Err(AuthError::MalformedResponse("user identifier empty"));
    }

    Ok(VerifiedSession {
        access_token,
        refresh_token,
        user: payload.user,
    })
}

/// Extract a human-readable reason from a failure `message`.
fn rejection_message(message: Option<Value>) -> String {
    match message {
        Some(Value::String(text)) if !text.is_empty() => text,
        _ => GENERIC_VERIFY_FAILURE.to_string(),
    }
}
