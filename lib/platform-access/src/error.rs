//! Error types for the platform-access crate.
//!
//! Two families of failures:
//! - `AuthenticationError`: failures verifying identity (OIDC, session)
//! - `AuthorizationError`: failures of permission checks
//!
//! "No session" is deliberately absent: it is an expected condition carried
//! by `SessionState::Unauthenticated`, never an error.

use crate::role::Role;
use std::fmt;
use stockroom_core::UserId;

/// Errors from authentication operations.
///
/// These errors represent failures in verifying user identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationError {
    /// OIDC token validation failed.
    InvalidToken { reason: String },
    /// Session lookup failed at the storage layer.
    SessionLookupFailed { reason: String },
    /// OIDC provider error.
    ProviderError { provider: String, reason: String },
    /// Missing required claim in token.
    MissingClaim { claim: String },
    /// User not found after authentication.
    UserNotFound { subject: String },
}

impl fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidToken { reason } => {
                write!(f, "invalid token: {reason}")
            }
            Self::SessionLookupFailed { reason } => {
                write!(f, "session lookup failed: {reason}")
            }
            Self::ProviderError { provider, reason } => {
                write!(f, "OIDC provider '{provider}' error: {reason}")
            }
            Self::MissingClaim { claim } => {
                write!(f, "missing required claim: {claim}")
            }
            Self::UserNotFound { subject } => {
                write!(f, "user not found for subject: {subject}")
            }
        }
    }
}

impl std::error::Error for AuthenticationError {}

/// Errors from authorization operations.
///
/// These errors represent failures in permission checks. They are never
/// retried by the client; a role mismatch routes to the unauthorized page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    /// User is not authenticated.
    NotAuthenticated,
    /// User's role does not meet the requirement.
    RoleRequired { required: Role, actual: Role },
    /// The account has been deactivated.
    AccountInactive { user_id: UserId },
}

impl fmt::Display for AuthorizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAuthenticated => {
                write!(f, "user is not authenticated")
            }
            Self::RoleRequired { required, actual } => {
                write!(f, "requires role '{required}', user has '{actual}'")
            }
            Self::AccountInactive { user_id } => {
                write!(f, "account {user_id} is inactive")
            }
        }
    }
}

impl std::error::Error for AuthorizationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_error_invalid_token_display() {
        let err = AuthenticationError::InvalidToken {
            reason: "signature mismatch".to_string(),
        };
        assert!(err.to_string().contains("invalid token"));
        assert!(err.to_string().contains("signature mismatch"));
    }

    #[test]
    fn authentication_error_session_lookup_display() {
        let err = AuthenticationError::SessionLookupFailed {
            reason: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("session lookup failed"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn authentication_error_provider_error_display() {
        let err = AuthenticationError::ProviderError {
            provider: "keycloak".to_string(),
            reason: "connection timeout".to_string(),
        };
        assert!(err.to_string().contains("keycloak"));
        assert!(err.to_string().contains("connection timeout"));
    }

    #[test]
    fn authorization_error_not_authenticated_display() {
        let err = AuthorizationError::NotAuthenticated;
        assert!(err.to_string().contains("not authenticated"));
    }

    #[test]
    fn authorization_error_role_required_display() {
        let err = AuthorizationError::RoleRequired {
            required: Role::Manager,
            actual: Role::Viewer,
        };
        assert!(err.to_string().contains("manager"));
        assert!(err.to_string().contains("viewer"));
    }

    #[test]
    fn authorization_error_inactive_display() {
        let err = AuthorizationError::AccountInactive {
            user_id: UserId::new(),
        };
        assert!(err.to_string().contains("inactive"));
    }
}
