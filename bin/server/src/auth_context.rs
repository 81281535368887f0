//! Client-side authentication state.
//!
//! Two asynchronous queries (current user, current session) are the single
//! source of truth. `AuthContext` holds the two resources and derives
//! the synchronous read view (`AuthSnapshot`) on demand, so there is no
//! second store to keep in sync and no copy effect: once both queries have
//! resolved, the snapshot equals their results no matter which finished
//! first.
//!
//! Staleness: both resources are refetched on a fixed interval (and by
//! `refresh()`), so cached auth state is never older than
//! [`AUTH_STALENESS_SECS`].
//!
//! Retries: transport-level failures are retried a bounded number of times.
//! Authorization conditions never reach the retry path because the queries
//! report them as payloads (`None` / `Unauthenticated`), not as errors.
//!
//! Sign-out is a full navigation to `/auth/logout` (see the header menu):
//! the server deletes the session and clears the cookie, and the document
//! teardown discards every cached query result before the login page loads.

use leptos::prelude::*;
use std::time::Duration;
use stockroom_platform_access::Role;

use crate::types::{SessionInfo, SessionSnapshot, UserInfo};
use crate::user::{get_current_session, get_current_user};

/// How long cached auth state stays fresh, in seconds.
pub const AUTH_STALENESS_SECS: u64 = 300;

/// Additional attempts after a transient failure.
const MAX_TRANSIENT_RETRIES: u32 = 2;

/// Message surfaced to the UI when an auth query keeps failing.
pub const AUTH_CHECK_FAILED: &str = "Authentication check failed";

/// Returns true for failures worth retrying.
///
/// Only the transport layer produces these; the queries themselves encode
/// "no session" in their payloads, so a retry can never mask an
/// authorization outcome.
fn is_transient(err: &ServerFnError) -> bool {
    matches!(err, ServerFnError::Request(_))
}

async fn fetch_user_with_retry() -> Result<Option<UserInfo>, ServerFnError> {
    let mut attempts = 0;
    loop {
        match get_current_user().await {
            Ok(user) => return Ok(user),
            Err(e) if is_transient(&e) && attempts < MAX_TRANSIENT_RETRIES => {
                attempts += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

async fn fetch_session_with_retry() -> Result<SessionSnapshot, ServerFnError> {
    let mut attempts = 0;
    loop {
        match get_current_session().await {
            Ok(snapshot) => return Ok(snapshot),
            Err(e) if is_transient(&e) && attempts < MAX_TRANSIENT_RETRIES => {
                attempts += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Handle to the authentication state, provided once at the app root.
///
/// Cheap to copy; components obtain it with [`use_auth`].
#[derive(Clone, Copy)]
pub struct AuthContext {
    user: Resource<Result<Option<UserInfo>, ServerFnError>>,
    session: Resource<Result<SessionSnapshot, ServerFnError>>,
}

impl AuthContext {
    fn new() -> Self {
        Self {
            user: Resource::new(|| (), |_| fetch_user_with_retry()),
            session: Resource::new(|| (), |_| fetch_session_with_retry()),
        }
    }

    /// Derives the current read view from the latest query results.
    #[must_use]
    pub fn snapshot(&self) -> AuthSnapshot {
        AuthSnapshot::from_parts(self.user.get(), self.session.get())
    }

    /// Forces both queries to refetch immediately.
    pub fn refresh(&self) {
        self.user.refetch();
        self.session.refetch();
    }
}

/// The synchronous read model over the two auth queries.
#[derive(Clone, Debug, PartialEq)]
pub struct AuthSnapshot {
    /// The signed-in user, once the user query has resolved successfully.
    pub user: Option<UserInfo>,
    /// The session info, once the session query resolved to a session.
    pub session: Option<SessionInfo>,
    /// True while either query is still in flight.
    pub is_loading: bool,
    /// First error across (user, session), in that order.
    pub error: Option<String>,
}

impl AuthSnapshot {
    /// Builds the read view from the two queries' latest states.
    ///
    /// `None` means a query has not resolved yet. The derivation is pure
    /// and per-field, so it is independent of resolution order.
    #[must_use]
    pub fn from_parts(
        user_query: Option<Result<Option<UserInfo>, ServerFnError>>,
        session_query: Option<Result<SessionSnapshot, ServerFnError>>,
    ) -> Self {
        let is_loading = user_query.is_none() || session_query.is_none();

        let error = match (&user_query, &session_query) {
            (Some(Err(_)), _) | (_, Some(Err(_))) => Some(AUTH_CHECK_FAILED.to_string()),
            _ => None,
        };

        let user = match user_query {
            Some(Ok(user)) => user,
            _ => None,
        };

        let session = match session_query {
            Some(Ok(SessionSnapshot::Authenticated(info))) => Some(info),
            _ => None,
        };

        Self {
            user,
            session,
            is_loading,
            error,
        }
    }

    /// True once the session query resolved to a valid session.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// The role snapshot, if authenticated.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.session.as_ref().map(|s| s.role)
    }

    /// True if authenticated and the stored role equals the requested one.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.role() == Some(role)
    }

    /// True if authenticated with at least the given role.
    #[must_use]
    pub fn has_at_least(&self, role: Role) -> bool {
        self.role().is_some_and(|r| r >= role)
    }

    /// True if authenticated as an admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role().is_some_and(|r| r.is_admin())
    }

    /// True if the role may approve, reject, or fulfill requests.
    #[must_use]
    pub fn can_manage(&self) -> bool {
        self.role().is_some_and(|r| r.can_manage())
    }

    /// True if the role may create and edit its own requests.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.role().is_some_and(|r| r.can_submit())
    }
}

/// Creates the auth context, provides it to descendants, and starts the
/// staleness interval. Call once, at the app root.
pub fn provide_auth_context() {
    let ctx = AuthContext::new();
    provide_context(ctx);

    // Refetch on a fixed cadence so cached auth state ages out. Effects only
    // run in the browser, so the interval never starts during SSR.
    Effect::new(move |_| {
        let handle = set_interval_with_handle(
            move || ctx.refresh(),
            Duration::from_secs(AUTH_STALENESS_SECS),
        );
        if let Ok(handle) = handle {
            on_cleanup(move || handle.clear());
        }
    });
}

/// Returns the auth context provided at the app root.
#[must_use]
pub fn use_auth() -> AuthContext {
    expect_context::<AuthContext>()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_info() -> UserInfo {
        UserInfo {
            id: "usr_1".to_string(),
            display_name: Some("Alice".to_string()),
            email: None,
            role: Role::Manager,
        }
    }

    fn session_info() -> SessionInfo {
        SessionInfo {
            expires_at: "2026-01-01T00:00:00Z".to_string(),
            role: Role::Manager,
        }
    }

    #[test]
    fn loading_while_either_query_is_pending() {
        let snap = AuthSnapshot::from_parts(None, None);
        assert!(snap.is_loading);
        assert!(!snap.is_authenticated());
        assert!(snap.error.is_none());

        let snap = AuthSnapshot::from_parts(Some(Ok(Some(user_info()))), None);
        assert!(snap.is_loading);

        let snap = AuthSnapshot::from_parts(
            None,
            Some(Ok(SessionSnapshot::Authenticated(session_info()))),
        );
        assert!(snap.is_loading);
    }

    #[test]
    fn resolved_snapshot_equals_query_results_regardless_of_order() {
        // Both orders of "arrival" produce identical snapshots: the
        // derivation reads each query's latest value independently.
        let a = AuthSnapshot::from_parts(
            Some(Ok(Some(user_info()))),
            Some(Ok(SessionSnapshot::Authenticated(session_info()))),
        );
        let b = AuthSnapshot::from_parts(
            Some(Ok(Some(user_info()))),
            Some(Ok(SessionSnapshot::Authenticated(session_info()))),
        );
        assert_eq!(a, b);
        assert!(!a.is_loading);
        assert_eq!(a.user, Some(user_info()));
        assert_eq!(a.session, Some(session_info()));
        assert!(a.is_authenticated());
    }

    #[test]
    fn unauthenticated_is_not_an_error() {
        let snap = AuthSnapshot::from_parts(
            Some(Ok(None)),
            Some(Ok(SessionSnapshot::Unauthenticated)),
        );
        assert!(!snap.is_loading);
        assert!(!snap.is_authenticated());
        assert!(snap.error.is_none());
        assert!(snap.user.is_none());
    }

    #[test]
    fn first_error_across_both_queries_is_surfaced() {
        let snap = AuthSnapshot::from_parts(
            Some(Err(ServerFnError::new("boom"))),
            Some(Ok(SessionSnapshot::Unauthenticated)),
        );
        assert_eq!(snap.error.as_deref(), Some(AUTH_CHECK_FAILED));

        let snap = AuthSnapshot::from_parts(
            Some(Ok(None)),
            Some(Err(ServerFnError::new("boom"))),
        );
        assert_eq!(snap.error.as_deref(), Some(AUTH_CHECK_FAILED));
    }

    #[test]
    fn role_helpers_derive_from_session_snapshot() {
        let snap = AuthSnapshot::from_parts(
            Some(Ok(Some(user_info()))),
            Some(Ok(SessionSnapshot::Authenticated(session_info()))),
        );
        assert_eq!(snap.role(), Some(Role::Manager));
        assert!(snap.has_role(Role::Manager));
        assert!(!snap.has_role(Role::Admin));
        assert!(snap.has_at_least(Role::Employee));
        assert!(snap.can_manage());
        assert!(snap.can_submit());
        assert!(!snap.is_admin());
    }

    #[test]
    fn role_helpers_are_false_when_unauthenticated() {
        let snap = AuthSnapshot::from_parts(
            Some(Ok(None)),
            Some(Ok(SessionSnapshot::Unauthenticated)),
        );
        assert_eq!(snap.role(), None);
        assert!(!snap.has_role(Role::Viewer));
        assert!(!snap.has_at_least(Role::Viewer));
        assert!(!snap.can_submit());
    }

    #[test]
    fn transient_classification_only_matches_transport_failures() {
        assert!(is_transient(&ServerFnError::Request("timed out".to_string())));
        assert!(!is_transient(&ServerFnError::new("Access denied")));
        assert!(!is_transient(&ServerFnError::Deserialization(
            "bad payload".to_string()
        )));
    }
}
