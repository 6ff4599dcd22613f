//! Sign-in flow orchestration.
//!
//! [`AuthFlow`] sequences the three transitions of the login state machine:
//!
//! ```text
//! Unauthenticated --request_code--> CodeRequested --verify_code--> Authenticated
//!        ^                                                              |
//!        +------------------------- logout -----------------------------+
//! ```
//!
//! Failed transitions leave the caller on the same step with a retryable
//! error. The controller does no business logic of its own beyond input
//! validation, sequencing the network calls, and writing the store.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use wellspring_core::{Email, OtpCode};

use crate::api::AuthApi;
use crate::error::AuthError;
use crate::guard::Navigation;
use crate::session::SessionStore;

/// Orchestrates request-code, verify-code, and logout.
pub struct AuthFlow {
    api: Arc<dyn AuthApi>,
    store: Arc<dyn SessionStore>,
    in_flight: AtomicBool,
}

impl AuthFlow {
    /// Create a flow over the given network client and session store.
    #[must_use]
    pub fn new(api: Arc<dyn AuthApi>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            api,
            store,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Whether a network transition is currently in flight.
    ///
    /// Hosts may use this to disable submit controls, but the flow rejects
    /// concurrent transitions on its own either way.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Ask the backend to email a one-time code to `email`.
    ///
    /// On success the returned instruction navigates to the code-entry page
    /// with the address carried in the URL; nothing is written to the store.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidEmail`] before any network call,
    /// [`AuthError::RequestInFlight`] while another transition is pending,
    /// or whatever the network client reports.
    pub async fn request_code(&self, email: &str) -> Result<Navigation, AuthError> {
        let email = Email::parse(email)?;
        let _guard = self.begin()?;

        self.api.request_code(&email).await?;

        tracing::debug!("verification code requested");
        Ok(Navigation::otp(&email))
    }

    /// Exchange the emailed code for a session.
    ///
    /// On success the tokens and profile are written to the store and the
    /// returned instruction navigates to `from` when present, else to the
    /// landing page. On any failure the store is left untouched and the
    /// caller stays on the code-entry step.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidEmail`] / [`AuthError::InvalidOtp`] before any
    /// network call, [`AuthError::RequestInFlight`] while another transition
    /// is pending, or whatever the network client reports.
    pub async fn verify_code(
        &self,
        email: &str,
        code: &str,
        from: Option<&str>,
    ) -> Result<Navigation, AuthError> {
        let email = Email::parse(email)?;
        let code = OtpCode::parse(code)?;
        let _guard = self.begin()?;

        let verified = self.api.verify_code(&email, &code).await?;
        self.store
            .set_session(&verified.access_token, &verified.refresh_token, &verified.user);

        tracing::info!(user = %verified.user.id, "sign-in verified");
        Ok(Navigation::after_login(from))
    }

    /// Clear the session and return to the login page.
    ///
    /// Always succeeds: no network call is made and storage failures are
    /// swallowed by the store.
    pub fn logout(&self) -> Navigation {
        self.store.clear_session();
        tracing::info!("signed out");
        Navigation::login()
    }

    fn begin(&self) -> Result<InFlightGuard<'_>, AuthError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Acquire)
            .is_err()
        {
            return Err(AuthError::RequestInFlight);
        }
        Ok(InFlightGuard {
            flag: &self.in_flight,
        })
    }
}

/// Releases the in-flight flag on every exit path, including errors.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::Notify;

    use wellspring_core::{AccessToken, RefreshToken, UserProfile};

    use crate::api::VerifiedSession;
    use crate::session::{MemoryStore, SessionStore};

    use super::*;

    fn verified() -> VerifiedSession {
        VerifiedSession {
            access_token: AccessToken::parse("a.b.c").unwrap(),
            refresh_token: RefreshToken::parse("r").unwrap(),
            user: serde_json::from_value(json!({ "_id": "u1", "name": "Ada" })).unwrap(),
        }
    }

    /// Scripted network client that counts calls.
    ///
    /// Each endpoint succeeds unless an error was queued for it; a queued
    /// error is returned once.
    struct ScriptedApi {
        request_calls: AtomicUsize,
        verify_calls: AtomicUsize,
        request_error: Mutex<Option<AuthError>>,
        verify_error: Mutex<Option<AuthError>>,
    }

    impl ScriptedApi {
        fn succeeding() -> Self {
            Self {
                request_calls: AtomicUsize::new(0),
                verify_calls: AtomicUsize::new(0),
                request_error: Mutex::new(None),
                verify_error: Mutex::new(None),
            }
        }

        fn with_request_error(error: AuthError) -> Self {
            let api = Self::succeeding();
            *api.request_error.lock().unwrap() = Some(error);
            api
        }

        fn with_verify_error(error: AuthError) -> Self {
            let api = Self::succeeding();
            *api.verify_error.lock().unwrap() = Some(error);
            api
        }

        fn request_count(&self) -> usize {
            self.request_calls.load(Ordering::SeqCst)
        }

        fn verify_count(&self) -> usize {
            self.verify_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AuthApi for ScriptedApi {
        async fn request_code(&self, _email: &Email) -> Result<(), AuthError> {
            self.request_calls.fetch_add(1, Ordering::SeqCst);
            match self.request_error.lock().unwrap().take() {
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
            match self.verify_error.lock().unwrap().take() {
                Some(err) => Err(err),
                None => Ok(verified()),
            }
        }
    }

    fn flow_with(api: Arc<ScriptedApi>, store: Arc<MemoryStore>) -> AuthFlow {
        AuthFlow::new(api, store)
    }

    #[tokio::test]
    async fn test_request_code_navigates_to_otp_with_email() {
        let api = Arc::new(ScriptedApi::succeeding());
        let flow = flow_with(Arc::clone(&api), Arc::new(MemoryStore::new()));

        let nav = flow.request_code("user@example.com").await.unwrap();
        assert_eq!(nav.target(), "/otp?email=user%40example.com");
        assert_eq!(api.request_count(), 1);
    }

    #[tokio::test]
    async fn test_request_code_invalid_email_makes_no_network_call() {
        let api = Arc::new(ScriptedApi::succeeding());
        let flow = flow_with(Arc::clone(&api), Arc::new(MemoryStore::new()));

        for bad in ["", "no-at-symbol", "user@localhost", "user@"] {
            let err = flow.request_code(bad).await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidEmail(_)), "input {bad:?}");
        }
        assert_eq!(api.request_count(), 0);
        assert!(!flow.is_busy());
    }

    #[tokio::test]
    async fn test_request_code_failure_leaves_store_untouched() {
        let api = Arc::new(ScriptedApi::with_request_error(AuthError::Rejected {
            message: "failed to send code".to_string(),
        }));
        let store = Arc::new(MemoryStore::new());
        let flow = flow_with(api, Arc::clone(&store));

        let err = flow.request_code("user@example.com").await.unwrap_err();
        assert!(matches!(err, AuthError::Rejected { .. }));
        assert!(!store.is_authenticated());
        assert!(!flow.is_busy());
    }

    #[tokio::test]
    async fn test_verify_code_writes_session_and_navigates_home() {
        let api = Arc::new(ScriptedApi::succeeding());
        let store = Arc::new(MemoryStore::new());
        let flow = flow_with(api, Arc::clone(&store));

        let nav = flow
            .verify_code("user@example.com", "123456", None)
            .await
            .unwrap();
        assert_eq!(nav.target(), "/home");

        let session = store.get_session();
        assert_eq!(
            session.access_token,
            Some(AccessToken::parse("a.b.c").unwrap())
        );
        assert!(store.is_authenticated());
    }

    #[tokio::test]
    async fn test_verify_code_honors_from_target() {
        let flow = flow_with(
            Arc::new(ScriptedApi::succeeding()),
            Arc::new(MemoryStore::new()),
        );

        let nav = flow
            .verify_code("user@example.com", "123456", Some("/records/42"))
            .await
            .unwrap();
        assert_eq!(nav.target(), "/records/42");
    }

    #[tokio::test]
    async fn test_verify_code_invalid_otp_makes_no_network_call() {
        let api = Arc::new(ScriptedApi::succeeding());
        let flow = flow_with(Arc::clone(&api), Arc::new(MemoryStore::new()));

        let err = flow
            .verify_code("user@example.com", "12ab56", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidOtp(_)));
        assert_eq!(api.verify_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_verify_response_leaves_prior_session_untouched() {
        let api = Arc::new(ScriptedApi::with_verify_error(AuthError::MalformedResponse(
            "refresh token empty",
        )));
        let store = Arc::new(MemoryStore::new());

        // An earlier sign-in is already persisted.
        let earlier = verified();
        store.set_session(&earlier.access_token, &earlier.refresh_token, &earlier.user);

        let flow = flow_with(api, Arc::clone(&store));
        let err = flow
            .verify_code("user@example.com", "123456", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::MalformedResponse(_)));

        let session = store.get_session();
        assert_eq!(session.access_token, Some(earlier.access_token));
        assert_eq!(session.refresh_token, Some(earlier.refresh_token));
    }

    #[tokio::test]
    async fn test_logout_clears_session_and_navigates_to_login() {
        let store = Arc::new(MemoryStore::new());
        let earlier = verified();
        store.set_session(&earlier.access_token, &earlier.refresh_token, &earlier.user);

        let flow = flow_with(Arc::new(ScriptedApi::succeeding()), Arc::clone(&store));
        let nav = flow.logout();
        assert_eq!(nav.target(), "/login");
        assert!(!store.is_authenticated());

        // Logging out twice is fine.
        let nav = flow.logout();
        assert_eq!(nav.target(), "/login");
    }

    /// Network client that parks inside the call until released.
    struct GatedApi {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl AuthApi for GatedApi {
        async fn request_code(&self, _email: &Email) -> Result<(), AuthError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(())
        }

        async fn verify_code(
            &self,
            _email: &Email,
            _code: &OtpCode,
        ) -> Result<VerifiedSession, AuthError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(verified())
        }
    }

    #[tokio::test]
    async fn test_second_transition_rejected_while_first_pending() {
        let api = Arc::new(GatedApi {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let flow = Arc::new(AuthFlow::new(
            Arc::clone(&api) as Arc<dyn AuthApi>,
            Arc::new(MemoryStore::new()),
        ));

        let pending = tokio::spawn({
            let flow = Arc::clone(&flow);
            async move { flow.request_code("user@example.com").await }
        });

        // Wait until the first call is parked inside the network client.
        api.entered.notified().await;
        assert!(flow.is_busy());

        let err = flow.request_code("user@example.com").await.unwrap_err();
        assert!(matches!(err, AuthError::RequestInFlight));
        let err = flow
            .verify_code("user@example.com", "123456", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::RequestInFlight));

        api.release.notify_one();
        let nav = pending.await.unwrap().unwrap();
        assert_eq!(nav.target(), "/otp?email=user%40example.com");
        assert!(!flow.is_busy());
    }
}
