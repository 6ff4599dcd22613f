//! Route classification and navigation guarding.
//!
//! On every navigation the host shell asks [`evaluate`] whether the target
//! path may render. The guard holds no state of its own - it is a pure
//! function of the path, the query string, and the session store - and it
//! classifies the path before touching session state, so an unauthenticated
//! visit to a public route never redirects.

use core::fmt;

use wellspring_core::Email;

use crate::session::SessionStore;

/// Route shown to signed-out users.
pub const LOGIN_ROUTE: &str = "/login";

/// Route signed-in users land on when no other destination is recorded.
pub const DEFAULT_LANDING_ROUTE: &str = "/home";

/// Query parameter carrying the path a redirect came from.
const FROM_PARAM: &str = "from";

/// Paths reachable without an authenticated session.
const PUBLIC_ROUTES: &[&str] = &[
    "/login",
    "/otp",
    "/register",
    "/forgot-password",
    "/privacy-policy",
    "/terms",
];

// ─────────────────────────────────────────────────────────────────────────────
// Navigation Instructions
// ─────────────────────────────────────────────────────────────────────────────

/// An instruction to the host shell to navigate somewhere.
///
/// This core never renders; it hands targets like `/otp?email=...` to
/// whatever is driving the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    target: String,
}

impl Navigation {
    /// Navigate to an arbitrary path.
    #[must_use]
    pub fn to(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// Navigate to the login page.
    #[must_use]
    pub fn login() -> Self {
        Self::to(LOGIN_ROUTE)
    }

    /// Navigate to the login page, recording where the visitor came from so
    /// the destination can be restored after sign-in.
    #[must_use]
    pub fn login_with_return(from: &str) -> Self {
        Self::to(format!(
            "{LOGIN_ROUTE}?{FROM_PARAM}={}",
            urlencoding::encode(from)
        ))
    }

    /// Navigate to the one-time-code entry page for the given address.
    #[must_use]
    pub fn otp(email: &Email) -> Self {
        Self::to(format!("/otp?email={}", urlencoding::encode(email.as_str())))
    }

    /// Navigate to the default signed-in landing page.
    #[must_use]
    pub fn landing() -> Self {
        Self::to(DEFAULT_LANDING_ROUTE)
    }

    /// Navigate to the recorded return target, or the landing page when
    /// there is none.
    #[must_use]
    pub fn after_login(from: Option<&str>) -> Self {
        match from {
            Some(target) if !target.is_empty() => Self::to(target),
            _ => Self::landing(),
        }
    }

    /// The path (and query) to navigate to.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }
}

impl fmt::Display for Navigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.target)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Classification
// ─────────────────────────────────────────────────────────────────────────────

/// Whether a path requires an authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Reachable without a session.
    Public,
    /// Requires a session.
    Protected,
}

/// Classify a path against the static public-route list.
///
/// Query strings, fragments, and trailing slashes are ignored.
#[must_use]
pub fn classify(path: &str) -> RouteClass {
    let normalized = normalize(path);
    if PUBLIC_ROUTES.contains(&normalized) {
        RouteClass::Public
    } else {
        RouteClass::Protected
    }
}

fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

// ─────────────────────────────────────────────────────────────────────────────
// Guard
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of evaluating a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render the requested path.
    Allow,
    /// Navigate elsewhere instead.
    Redirect(Navigation),
}

/// Decide whether a navigation to `path` (with `query`) may render.
///
/// A store that cannot be read reports an absent token and therefore counts
/// as unauthenticated - the guard fails closed toward the login page, never
/// open toward protected content.
#[must_use]
pub fn evaluate(path: &str, query: &str, store: &dyn SessionStore) -> GuardDecision {
    // Classification first; the session read must never matter for a
    // public route visited while signed out.
    let class = classify(path);
    let authenticated = store.is_authenticated();

    match (class, authenticated) {
        (RouteClass::Protected, false) => {
            GuardDecision::Redirect(Navigation::login_with_return(path))
        }
        (RouteClass::Public, true) => {
            let from = from_param(query);
            GuardDecision::Redirect(Navigation::after_login(from.as_deref()))
        }
        _ => GuardDecision::Allow,
    }
}

/// Extract a non-empty `from` value from a query string.
fn from_param(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .find(|(key, _)| key == FROM_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use wellspring_core::{AccessToken, RefreshToken, UserProfile};

    use crate::session::MemoryStore;

    use super::*;

    fn signed_in_store() -> MemoryStore {
        let store = MemoryStore::new();
        store.set_session(
            &AccessToken::parse("a.b.c").unwrap(),
            &RefreshToken::parse("r").unwrap(),
            &UserProfile::new("u1"),
        );
        store
    }

    #[test]
    fn test_classify_public_routes() {
        for path in PUBLIC_ROUTES {
            assert_eq!(classify(path), RouteClass::Public, "path {path}");
        }
        assert_eq!(classify("/login/"), RouteClass::Public);
        assert_eq!(classify("/otp?email=a%40b.com"), RouteClass::Public);
    }

    #[test]
    fn test_classify_protected_routes() {
        assert_eq!(classify("/home"), RouteClass::Protected);
        assert_eq!(classify("/"), RouteClass::Protected);
        assert_eq!(classify("/records/123"), RouteClass::Protected);
        // Prefixing a public name does not make a route public.
        assert_eq!(classify("/login-help"), RouteClass::Protected);
    }

    #[test]
    fn test_unauthenticated_protected_redirects_to_login_with_from() {
        let store = MemoryStore::new();
        let decision = evaluate("/home", "", &store);
        assert_eq!(
            decision,
            GuardDecision::Redirect(Navigation::to("/login?from=%2Fhome"))
        );
    }

    #[test]
    fn test_unauthenticated_public_renders_directly() {
        let store = MemoryStore::new();
        assert_eq!(evaluate("/login", "", &store), GuardDecision::Allow);
        assert_eq!(evaluate("/terms", "", &store), GuardDecision::Allow);
    }

    #[test]
    fn test_authenticated_public_redirects_to_landing() {
        let store = signed_in_store();
        assert_eq!(
            evaluate("/login", "", &store),
            GuardDecision::Redirect(Navigation::to(DEFAULT_LANDING_ROUTE))
        );
    }

    #[test]
    fn test_authenticated_public_honors_from_param() {
        let store = signed_in_store();
        assert_eq!(
            evaluate("/login", "from=%2Frecords%2F42", &store),
            GuardDecision::Redirect(Navigation::to("/records/42"))
        );
        // Leading '?' and unrelated parameters are tolerated.
        assert_eq!(
            evaluate("/login", "?tab=1&from=%2Fhome", &store),
            GuardDecision::Redirect(Navigation::to("/home"))
        );
    }

    #[test]
    fn test_authenticated_public_ignores_empty_from() {
        let store = signed_in_store();
        assert_eq!(
            evaluate("/login", "from=", &store),
            GuardDecision::Redirect(Navigation::to(DEFAULT_LANDING_ROUTE))
        );
    }

    #[test]
    fn test_authenticated_protected_renders() {
        let store = signed_in_store();
        assert_eq!(evaluate("/home", "", &store), GuardDecision::Allow);
    }

    #[test]
    fn test_otp_navigation_encodes_email() {
        let email = Email::parse("user@example.com").unwrap();
        assert_eq!(
            Navigation::otp(&email).target(),
            "/otp?email=user%40example.com"
        );
    }

    #[test]
    fn test_after_login_falls_back_to_landing() {
        assert_eq!(Navigation::after_login(None).target(), "/home");
        assert_eq!(Navigation::after_login(Some("")).target(), "/home");
        assert_eq!(
            Navigation::after_login(Some("/records")).target(),
            "/records"
        );
    }
}
