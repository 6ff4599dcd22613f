//! Shared auth state for host shells.

use std::sync::Arc;

use crate::api::{AuthApi, BackendClient};
use crate::config::AuthConfig;
use crate::flow::AuthFlow;
use crate::guard::{self, GuardDecision};
use crate::session::{FileStore, MemoryStore, SessionStore, StorageHealth};

/// The wired-up auth core.
///
/// This struct is cheaply cloneable via `Arc` and provides host shells with
/// access to the flow controller, the session store, and the navigation
/// guard without them having to assemble the pieces themselves.
#[derive(Clone)]
pub struct Portal {
    inner: Arc<PortalInner>,
}

struct PortalInner {
    config: AuthConfig,
    store: Arc<dyn SessionStore>,
    flow: AuthFlow,
}

impl Portal {
    /// Wire the production pieces: a [`BackendClient`] over the configured
    /// base URL and a [`FileStore`] at the configured (or platform default)
    /// location.
    ///
    /// When no session file location can be determined at all, the session
    /// falls back to process memory and a warning is logged - sign-in still
    /// works, it just does not survive a restart.
    #[must_use]
    pub fn new(config: AuthConfig) -> Self {
        let api = Arc::new(BackendClient::new(&config));
        let store: Arc<dyn SessionStore> = match config
            .session_file
            .clone()
            .or_else(FileStore::default_path)
        {
            Some(path) => Arc::new(FileStore::new(path)),
            None => {
                tracing::warn!("no session file location available; session will not persist");
                Arc::new(MemoryStore::new())
            }
        };
        Self::with_parts(config, api, store)
    }

    /// Wire explicit parts. Used by tests and by hosts that bring their own
    /// network client or store.
    #[must_use]
    pub fn with_parts(
        config: AuthConfig,
        api: Arc<dyn AuthApi>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        let flow = AuthFlow::new(api, Arc::clone(&store));
        Self {
            inner: Arc::new(PortalInner {
                config,
                store,
                flow,
            }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.inner.config
    }

    /// Get a reference to the session store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.inner.store
    }

    /// Get a reference to the sign-in flow controller.
    #[must_use]
    pub fn flow(&self) -> &AuthFlow {
        &self.inner.flow
    }

    /// Evaluate the navigation guard for a path and query string.
    #[must_use]
    pub fn guard(&self, path: &str, query: &str) -> GuardDecision {
        guard::evaluate(path, query, self.inner.store.as_ref())
    }

    /// Probe the session store's backing storage.
    ///
    /// Hosts should call this once at startup and surface a non-healthy
    /// result to the user; a broken store otherwise shows up much later as
    /// an unexplained sign-out.
    #[must_use]
    pub fn storage_health(&self) -> StorageHealth {
        self.inner.store.check_storage_health()
    }
}
