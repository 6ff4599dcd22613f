//! Integration tests for Wellspring.
//!
//! These tests exercise the auth core end-to-end through its public API: a
//! scripted network client stands in for the backend, and either the
//! in-memory store or a file store in a temp directory stands in for
//! durable storage. No live backend is required.
//!
//! # Test Categories
//!
//! - `sign_in_flow` - request-code / verify-code / logout journeys
//! - `session_storage` - persistence across restarts and degraded storage

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;

use wellspring_auth::api::{AuthApi, VerifiedSession};
use wellspring_auth::error::AuthError;
use wellspring_core::{AccessToken, Email, OtpCode, RefreshToken};

/// A verification payload matching what the backend hands out.
///
/// # Panics
///
/// Panics if the fixture constants stop being valid, which would be a bug
/// in the fixture itself.
#[must_use]
pub fn sample_verified() -> VerifiedSession {
    VerifiedSession {
        access_token: AccessToken::parse("a.b.c").expect("fixture access token"),
        refresh_token: RefreshToken::parse("r").expect("fixture refresh token"),
        user: serde_json::from_value(json!({ "_id": "u1", "name": "Ada" }))
            .expect("fixture profile"),
    }
}

/// Scripted stand-in for the backend network client.
///
/// Each endpoint succeeds unless an error has been queued for it; queued
/// errors are returned once, and every call is counted so tests can assert
/// that invalid input never reaches the network.
#[derive(Default)]
pub struct ScriptedApi {
    request_calls: AtomicUsize,
    verify_calls: AtomicUsize,
    request_error: Mutex<Option<AuthError>>,
    verify_error: Mutex<Option<AuthError>>,
}

impl ScriptedApi {
    /// A client on which both endpoints succeed.
    #[must_use]
    pub fn succeeding() -> Self {
        Self::default()
    }

    /// Queue an error for the next `request_code` call.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn fail_next_request(&self, error: AuthError) {
        *self.request_error.lock().expect("lock poisoned") = Some(error);
    }

    /// Queue an error for the next `verify_code` call.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn fail_next_verify(&self, error: AuthError) {
        *self.verify_error.lock().expect("lock poisoned") = Some(error);
    }

    /// Number of `request_code` calls observed.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.request_calls.load(Ordering::SeqCst)
    }

    /// Number of `verify_code` calls observed.
    #[must_use]
    pub fn verify_count(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthApi for ScriptedApi {
    async fn request_code(&self, _email: &Email) -> Result<(), AuthError> {
        self.request_calls.fetch_add(1, Ordering::SeqCst);
        match self.request_error.lock().expect("lock poisoned").take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn verify_code(
        &self,
        _email: &Email,
        _code: &OtpCode,
    ) -> Result<VerifiedSession, AuthError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        match self.verify_error.lock().expect("lock poisoned").take() {
            Some(err) => Err(err),
            None => Ok(sample_verified()),
        }
    }
}
