//! Route-guard middleware for Axum.
//!
//! Every incoming request is classified against a static path partition and,
//! where the class demands it, the caller's session is resolved from the
//! session cookie. Unauthenticated requests to protected prefixes are
//! redirected to the login page with the original path carried in a
//! `redirect` query parameter; authenticated requests to the login page are
//! bounced to the default landing page.
//!
//! Resolution failures are fail-closed: a storage error during a
//! protected-path check redirects to login and is logged, never passed
//! through silently.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use sqlx::PgPool;
use std::sync::Arc;
use stockroom_platform_access::{SessionId, SessionState};

use super::{AppState, db::SessionRepository};

/// Session cookie name.
pub const SESSION_COOKIE: &str = "session";

/// The login page.
pub const LOGIN_PATH: &str = "/auth/login";

/// Where authenticated users land by default.
pub const DEFAULT_LANDING: &str = "/dashboard";

/// Paths that pass through unconditionally, matched exactly.
const PUBLIC_EXACT: &[&str] = &["/"];

/// Path prefixes that pass through unconditionally.
const PUBLIC_PREFIXES: &[&str] = &["/auth/callback"];

/// Path prefixes that require an authenticated session.
const PROTECTED_PREFIXES: &[&str] = &["/dashboard", "/requests", "/admin"];

/// Classification of a request path against the static partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Public set: never resolves the session, never redirects.
    Public,
    /// Requires an authenticated session.
    Protected,
    /// The login page: resolved so signed-in users can be bounced away.
    Login,
    /// Everything else (assets, auth endpoints): passes through untouched.
    Open,
}

/// What the guard does with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Hand the request to the inner service.
    PassThrough,
    /// Send the caller to the login page, remembering where they were going.
    RedirectToLogin { return_to: String },
    /// Send an already-authenticated caller to the landing page.
    RedirectToLanding,
}

/// Matches `path` against `prefix` on whole path segments, so `/requests`
/// and `/requests/new` match the `/requests` prefix but `/requestsx` does not.
fn prefix_matches(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Classifies a request path. Every path belongs to exactly one class.
#[must_use]
pub fn classify(path: &str) -> RouteClass {
    if PUBLIC_EXACT.contains(&path)
        || PUBLIC_PREFIXES.iter().any(|p| prefix_matches(path, p))
    {
        return RouteClass::Public;
    }

    if prefix_matches(path, LOGIN_PATH) {
        return RouteClass::Login;
    }

    if PROTECTED_PREFIXES.iter().any(|p| prefix_matches(path, p)) {
        return RouteClass::Protected;
    }

    RouteClass::Open
}

/// Decides the outcome for a classified request.
///
/// Pure over (class, session state) so the whole decision table is unit
/// testable. `ProviderError` on a protected path fails closed into the
/// login redirect; on the login page itself it passes through, since
/// redirecting there again would loop.
#[must_use]
pub fn decide(class: RouteClass, state: &SessionState, path: &str) -> GuardDecision {
    match class {
        RouteClass::Public | RouteClass::Open => GuardDecision::PassThrough,
        RouteClass::Protected => match state {
            SessionState::Authenticated(_) => GuardDecision::PassThrough,
            SessionState::Unauthenticated | SessionState::ProviderError { .. } => {
                GuardDecision::RedirectToLogin {
                    return_to: path.to_string(),
                }
            }
        },
        RouteClass::Login => match state {
            SessionState::Authenticated(_) => GuardDecision::RedirectToLanding,
            SessionState::Unauthenticated | SessionState::ProviderError { .. } => {
                GuardDecision::PassThrough
            }
        },
    }
}

/// Builds the login redirect URL carrying the original path.
#[must_use]
pub fn login_redirect_url(return_to: &str) -> String {
    format!("{LOGIN_PATH}?redirect={}", urlencoding::encode(return_to))
}

/// Resolves the caller's session from the cookie jar.
///
/// Missing cookie, unknown id, and expired session are all
/// `Unauthenticated`; only a failed lookup is `ProviderError`. Expired
/// sessions are deleted on sight.
pub async fn resolve_session(jar: &CookieJar, pool: &PgPool) -> SessionState {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return SessionState::Unauthenticated;
    };

    let session_id = SessionId::new(cookie.value().to_string());
    let session_repo = SessionRepository::new(pool.clone());

    let session = match session_repo.find_by_id(&session_id).await {
        Ok(Some(session)) => session,
        Ok(None) => return SessionState::Unauthenticated,
        Err(e) => {
            return SessionState::ProviderError {
                reason: e.to_string(),
            };
        }
    };

    if session.is_expired() {
        let _ = session_repo.delete(&session_id).await;
        return SessionState::Unauthenticated;
    }

    SessionState::Authenticated(Box::new(session))
}

/// The route-guard middleware, applied to the whole router.
///
/// # Usage
/// ```ignore
/// let app = Router::new()
///     // ...routes...
///     .layer(middleware::from_fn_with_state(app_state, route_guard));
/// ```
pub async fn route_guard(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let class = classify(&path);

    // The public and open sets never pay for a session lookup.
    let session_state = match class {
        RouteClass::Public | RouteClass::Open => SessionState::Unauthenticated,
        RouteClass::Protected | RouteClass::Login => {
            resolve_session(&jar, &state.db_pool).await
        }
    };

    if let SessionState::ProviderError { reason } = &session_state {
        tracing::error!(path = %path, error = %reason, "session resolution failed in route guard");
    }

    match decide(class, &session_state, &path) {
        GuardDecision::PassThrough => next.run(request).await,
        GuardDecision::RedirectToLogin { return_to } => {
            tracing::debug!(path = %path, "redirecting unauthenticated request to login");
            Redirect::to(&login_redirect_url(&return_to)).into_response()
        }
        GuardDecision::RedirectToLanding => {
            Redirect::to(DEFAULT_LANDING).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use stockroom_core::UserId;
    use stockroom_platform_access::{Role, Session};

    fn authenticated() -> SessionState {
        SessionState::Authenticated(Box::new(Session::new(
            SessionId::new("sess_test".to_string()),
            UserId::new(),
            Role::Employee,
            Duration::minutes(5),
        )))
    }

    fn provider_error() -> SessionState {
        SessionState::ProviderError {
            reason: "connection refused".to_string(),
        }
    }

    #[test]
    fn classify_public_paths() {
        assert_eq!(classify("/"), RouteClass::Public);
        assert_eq!(classify("/auth/callback"), RouteClass::Public);
    }

    #[test]
    fn classify_login_path() {
        assert_eq!(classify(LOGIN_PATH), RouteClass::Login);
    }

    #[test]
    fn classify_protected_prefixes() {
        assert_eq!(classify("/dashboard"), RouteClass::Protected);
        assert_eq!(classify("/requests"), RouteClass::Protected);
        assert_eq!(classify("/requests/new"), RouteClass::Protected);
        assert_eq!(classify("/requests/req_01H4"), RouteClass::Protected);
        assert_eq!(classify("/admin"), RouteClass::Protected);
    }

    #[test]
    fn classify_prefix_requires_segment_boundary() {
        assert_eq!(classify("/requestsx"), RouteClass::Open);
        assert_eq!(classify("/dashboards"), RouteClass::Open);
    }

    #[test]
    fn classify_everything_else_is_open() {
        assert_eq!(classify("/pkg/stockroom.js"), RouteClass::Open);
        assert_eq!(classify("/auth/oauth"), RouteClass::Open);
        assert_eq!(classify("/auth/logout"), RouteClass::Open);
        assert_eq!(classify("/unauthorized"), RouteClass::Open);
    }

    #[test]
    fn public_paths_pass_through_regardless_of_session_state() {
        for state in [authenticated(), SessionState::Unauthenticated, provider_error()] {
            assert_eq!(
                decide(RouteClass::Public, &state, "/"),
                GuardDecision::PassThrough
            );
        }
    }

    #[test]
    fn protected_path_without_session_redirects_to_login_with_return_path() {
        let decision = decide(RouteClass::Protected, &SessionState::Unauthenticated, "/requests");
        assert_eq!(
            decision,
            GuardDecision::RedirectToLogin {
                return_to: "/requests".to_string()
            }
        );
    }

    #[test]
    fn protected_path_with_session_passes_through() {
        let decision = decide(RouteClass::Protected, &authenticated(), "/dashboard");
        assert_eq!(decision, GuardDecision::PassThrough);
    }

    #[test]
    fn protected_path_fails_closed_on_provider_error() {
        let decision = decide(RouteClass::Protected, &provider_error(), "/admin");
        assert_eq!(
            decision,
            GuardDecision::RedirectToLogin {
                return_to: "/admin".to_string()
            }
        );
    }

    #[test]
    fn authenticated_login_request_redirects_to_landing() {
        let decision = decide(RouteClass::Login, &authenticated(), LOGIN_PATH);
        assert_eq!(decision, GuardDecision::RedirectToLanding);
    }

    #[test]
    fn unauthenticated_login_request_passes_through() {
        let decision = decide(RouteClass::Login, &SessionState::Unauthenticated, LOGIN_PATH);
        assert_eq!(decision, GuardDecision::PassThrough);

        // A broken lookup on the login page must not redirect back to itself.
        let decision = decide(RouteClass::Login, &provider_error(), LOGIN_PATH);
        assert_eq!(decision, GuardDecision::PassThrough);
    }

    #[test]
    fn login_redirect_url_percent_encodes_the_path() {
        assert_eq!(
            login_redirect_url("/requests"),
            "/auth/login?redirect=%2Frequests"
        );
        assert_eq!(
            login_redirect_url("/requests/req_01H4"),
            "/auth/login?redirect=%2Frequests%2Freq_01H4"
        );
    }

    #[test]
    fn open_paths_pass_through_for_any_state() {
        for state in [authenticated(), SessionState::Unauthenticated, provider_error()] {
            assert_eq!(
                decide(RouteClass::Open, &state, "/pkg/app.js"),
                GuardDecision::PassThrough
            );
        }
    }
}
