//! Identity server functions: the two queries behind the auth context.
//!
//! Both queries treat "no session" as data (`Ok(None)` /
//! `Ok(Unauthenticated)`), never as an error, so the client can tell an
//! anonymous visitor apart from a failed check and only retries the latter.

use crate::types::{SessionInfo, SessionSnapshot, UserInfo};
use leptos::prelude::*;

/// Server function to get the current user info.
#[server]
pub async fn get_current_user() -> Result<Option<UserInfo>, ServerFnError> {
    use crate::auth::db::UserRepository;
    use crate::auth::middleware::resolve_session;
    use crate::server_helpers::get_db_pool;
    use axum_extra::extract::CookieJar;
    use stockroom_platform_access::SessionState;

    let jar: CookieJar = leptos_axum::extract().await?;
    let pool = get_db_pool();

    let session = match resolve_session(&jar, &pool).await {
        SessionState::Authenticated(session) => session,
        SessionState::Unauthenticated => return Ok(None),
        SessionState::ProviderError { reason } => {
            tracing::error!(error = %reason, "Session resolution failed in get_current_user");
            return Err(ServerFnError::new("Authentication check failed"));
        }
    };

    let user_repo = UserRepository::new(pool);
    let user = match user_repo.find_by_id(session.user_id()).await {
        Ok(Some(user)) => user,
        Ok(None) => return Ok(None),
        Err(e) => {
            tracing::error!(error = %e, user_id = %session.user_id(), "Failed to load current user");
            return Err(ServerFnError::new("Authentication check failed"));
        }
    };

    Ok(Some(UserInfo {
        id: user.id().to_string(),
        display_name: user.display_name().map(|s| s.to_string()),
        email: user.email().map(|s| s.to_string()),
        role: session.role(),
    }))
}

/// Server function to get the current session snapshot.
#[server]
pub async fn get_current_session() -> Result<SessionSnapshot, ServerFnError> {
    use crate::auth::middleware::resolve_session;
    use crate::server_helpers::get_db_pool;
    use axum_extra::extract::CookieJar;
    use stockroom_platform_access::SessionState;

    let jar: CookieJar = leptos_axum::extract().await?;
    let pool = get_db_pool();

    match resolve_session(&jar, &pool).await {
        SessionState::Authenticated(session) => Ok(SessionSnapshot::Authenticated(SessionInfo {
            expires_at: session.expires_at().to_rfc3339(),
            role: session.role(),
        })),
        SessionState::Unauthenticated => Ok(SessionSnapshot::Unauthenticated),
        SessionState::ProviderError { reason } => {
            tracing::error!(error = %reason, "Session resolution failed in get_current_session");
            Err(ServerFnError::new("Authentication check failed"))
        }
    }
}
