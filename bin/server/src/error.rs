//! Domain error types for server operations.
//!
//! Each enum carries enough detail for structured logging; the
//! `into_server_error` conversions strip that down to user-safe messages
//! before anything crosses to the client.

use leptos::server_fn::error::ServerFnError;
use std::fmt;

/// Session-related errors.
#[derive(Debug)]
pub enum SessionError {
    /// User is not authenticated (no session cookie or unknown session).
    NotAuthenticated,
    /// The caller's role does not meet the operation's requirement.
    RoleRequired { required: &'static str },
    /// Database error while resolving the session.
    DatabaseError { details: String },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAuthenticated => write!(f, "not authenticated"),
            Self::RoleRequired { required } => {
                write!(f, "requires role '{}'", required)
            }
            Self::DatabaseError { details } => {
                write!(f, "session database error: {}", details)
            }
        }
    }
}

impl SessionError {
    /// Convert to a user-safe ServerFnError.
    pub fn into_server_error(self) -> ServerFnError {
        match &self {
            SessionError::NotAuthenticated => ServerFnError::new("Not authenticated"),
            SessionError::RoleRequired { .. } => ServerFnError::new("Access denied"),
            SessionError::DatabaseError { .. } => ServerFnError::new("Authentication check failed"),
        }
    }
}

/// Supply-request errors.
#[derive(Debug)]
pub enum RequestError {
    /// Request was not found.
    NotFound { id: String },
    /// Invalid request ID format.
    InvalidId { id: String, reason: String },
    /// The caller may not act on this request.
    AccessDenied { id: String },
    /// Field validation failed.
    Validation { details: String },
    /// The request is in the wrong state for the operation.
    InvalidState { id: String, status: String },
    /// Database error while accessing the request.
    DatabaseError { details: String },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { id } => write!(f, "supply request '{}' not found", id),
            Self::InvalidId { id, reason } => {
                write!(f, "invalid request id '{}': {}", id, reason)
            }
            Self::AccessDenied { id } => {
                write!(f, "access denied to supply request '{}'", id)
            }
            Self::Validation { details } => {
                write!(f, "validation failed: {}", details)
            }
            Self::InvalidState { id, status } => {
                write!(f, "supply request '{}' is '{}' and can no longer be edited", id, status)
            }
            Self::DatabaseError { details } => {
                write!(f, "supply request database error: {}", details)
            }
        }
    }
}

impl RequestError {
    /// Convert to a user-safe ServerFnError.
    pub fn into_server_error(self) -> ServerFnError {
        match self {
            RequestError::NotFound { .. } => ServerFnError::new("Request not found"),
            RequestError::InvalidId { .. } => ServerFnError::new("Invalid request ID"),
            RequestError::AccessDenied { .. } => ServerFnError::new("Access denied"),
            RequestError::Validation { details } => {
                ServerFnError::new(format!("Validation failed: {}", details))
            }
            RequestError::InvalidState { .. } => {
                ServerFnError::new("Request can no longer be edited")
            }
            RequestError::DatabaseError { .. } => ServerFnError::new("Database error"),
        }
    }
}

/// User-administration errors.
#[derive(Debug)]
pub enum UserAdminError {
    /// User was not found.
    NotFound { id: String },
    /// Invalid user ID format.
    InvalidId { id: String, reason: String },
    /// Unknown role name.
    InvalidRole { role: String },
    /// Database error while accessing the user.
    DatabaseError { details: String },
}

impl fmt::Display for UserAdminError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { id } => write!(f, "user '{}' not found", id),
            Self::InvalidId { id, reason } => {
                write!(f, "invalid user id '{}': {}", id, reason)
            }
            Self::InvalidRole { role } => write!(f, "unknown role '{}'", role),
            Self::DatabaseError { details } => {
                write!(f, "user database error: {}", details)
            }
        }
    }
}

impl UserAdminError {
    /// Convert to a user-safe ServerFnError.
    pub fn into_server_error(self) -> ServerFnError {
        match &self {
            UserAdminError::NotFound { .. } => ServerFnError::new("User not found"),
            UserAdminError::InvalidId { .. } => ServerFnError::new("Invalid user ID"),
            UserAdminError::InvalidRole { .. } => ServerFnError::new("Unknown role"),
            UserAdminError::DatabaseError { .. } => ServerFnError::new("Database error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_errors_are_user_safe() {
        let err = SessionError::DatabaseError {
            details: "connection refused to 10.0.0.5".to_string(),
        };
        let server_err = err.into_server_error();
        assert!(!server_err.to_string().contains("10.0.0.5"));
    }

    #[test]
    fn validation_error_keeps_field_details() {
        let err = RequestError::Validation {
            details: "Item name is required".to_string(),
        };
        assert!(err.into_server_error().to_string().contains("Item name is required"));
    }

    #[test]
    fn request_errors_display() {
        let err = RequestError::InvalidState {
            id: "req_1".to_string(),
            status: "approved".to_string(),
        };
        assert!(err.to_string().contains("req_1"));
        assert!(err.to_string().contains("approved"));
    }
}
