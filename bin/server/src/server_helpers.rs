//! Helper functions for server functions with proper error handling and logging.
//!
//! These wrap the shared session-resolution path so each server function
//! states its requirement in one line: any session, manager, or admin.

use crate::auth::middleware::resolve_session;
use crate::error::SessionError;
use leptos::prelude::*;
use sqlx::PgPool;
use stockroom_core::UserId;
use stockroom_platform_access::{Role, Session, SessionState};

/// Authenticated session information.
pub struct AuthenticatedSession {
    pub session: Session,
    pub user_id: UserId,
    pub role: Role,
}

/// Extracts and validates the current session from the request.
///
/// Resolution goes through the same three-valued path as the route guard;
/// only `Authenticated` becomes a usable session here, and a provider error
/// maps to the database variant so the client can tell it from a plain
/// "not signed in".
pub async fn get_authenticated_session() -> Result<AuthenticatedSession, SessionError> {
    let jar = leptos_axum::extract::<axum_extra::extract::CookieJar>()
        .await
        .map_err(|e| {
            tracing::debug!(error = %e, "Failed to extract cookie jar");
            SessionError::NotAuthenticated
        })?;

    let pool = get_db_pool();

    match resolve_session(&jar, &pool).await {
        SessionState::Authenticated(session) => {
            let user_id = session.user_id();
            let role = session.role();
            Ok(AuthenticatedSession {
                session: *session,
                user_id,
                role,
            })
        }
        SessionState::Unauthenticated => Err(SessionError::NotAuthenticated),
        SessionState::ProviderError { reason } => {
            tracing::error!(error = %reason, "Session resolution failed in server function");
            Err(SessionError::DatabaseError { details: reason })
        }
    }
}

/// Extracts a session whose role may approve, reject, or fulfill requests.
pub async fn get_manager_session() -> Result<AuthenticatedSession, SessionError> {
    let auth = get_authenticated_session().await?;

    if !auth.role.can_manage() {
        tracing::warn!(
            user_id = %auth.user_id,
            role = %auth.role,
            "Non-manager attempted a manager operation"
        );
        return Err(SessionError::RoleRequired { required: "manager" });
    }

    Ok(auth)
}

/// Extracts a session with admin access.
pub async fn get_admin_session() -> Result<AuthenticatedSession, SessionError> {
    let auth = get_authenticated_session().await?;

    if !auth.role.is_admin() {
        tracing::warn!(
            user_id = %auth.user_id,
            role = %auth.role,
            "Non-admin attempted an admin operation"
        );
        return Err(SessionError::RoleRequired { required: "admin" });
    }

    Ok(auth)
}

/// Gets the database pool from the request context.
pub fn get_db_pool() -> PgPool {
    expect_context::<PgPool>()
}
