//! Authentication primitives shared by the web layer.
//!
//! This module provides:
//! - `SessionState`: the three-valued outcome of session resolution
//! - `AuthenticatedUser`: session plus user record for request handling
//! - `OidcClaims`: identity attributes extracted from an ID token

use crate::role::Role;
use crate::session::Session;
use crate::user::User;
use stockroom_core::UserId;

/// Outcome of resolving the caller's session.
///
/// "No session" is an expected condition, not an error; only a storage or
/// transport failure during the lookup produces `ProviderError`. Callers are
/// forced to handle all three cases explicitly, which keeps the route guard
/// from ever mistaking a broken lookup for an anonymous visitor silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// A valid, unexpired session was found.
    Authenticated(Box<Session>),
    /// No cookie, unknown session id, or expired session.
    Unauthenticated,
    /// The lookup itself failed.
    ProviderError {
        /// What went wrong, for logging.
        reason: String,
    },
}

impl SessionState {
    /// Returns true if a valid session was found.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Returns the session, if authenticated.
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(session) => Some(session),
            _ => None,
        }
    }
}

/// Represents an authenticated user context extracted from the request.
///
/// Available in handlers after successful authentication. Wraps the session
/// (source of the role snapshot) together with the user record.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// The current session.
    session: Session,
    /// The user record.
    user: User,
}

impl AuthenticatedUser {
    /// Creates a new authenticated user context.
    #[must_use]
    pub fn new(session: Session, user: User) -> Self {
        Self { session, user }
    }

    /// Returns the authenticated user's ID.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.session.user_id()
    }

    /// Returns the current session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the user record.
    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Returns the role snapshot from the session.
    #[must_use]
    pub fn role(&self) -> Role {
        self.session.role()
    }

    /// Returns true if the user has admin access.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.session.is_admin()
    }
}

/// Claims extracted from an OIDC ID token.
///
/// These are used to create/update user records and determine the role.
#[derive(Debug, Clone)]
pub struct OidcClaims {
    /// The subject claim (unique user identifier from the provider).
    pub subject: String,
    /// The issuer URL.
    pub issuer: String,
    /// Email address (optional).
    pub email: Option<String>,
    /// Display name (optional, from name or preferred_username).
    pub display_name: Option<String>,
    /// Phone number (optional, from the phone_number claim).
    pub phone: Option<String>,
    /// Group memberships (from the configured groups claim).
    pub groups: Vec<String>,
}

impl OidcClaims {
    /// Creates a new set of OIDC claims.
    #[must_use]
    pub fn new(subject: String, issuer: String) -> Self {
        Self {
            subject,
            issuer,
            email: None,
            display_name: None,
            phone: None,
            groups: Vec::new(),
        }
    }

    /// Sets the email claim.
    #[must_use]
    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, name: Option<String>) -> Self {
        self.display_name = name;
        self
    }

    /// Sets the phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: Option<String>) -> Self {
        self.phone = phone;
        self
    }

    /// Sets the groups.
    #[must_use]
    pub fn with_groups(mut self, groups: Vec<String>) -> Self {
        self.groups = groups;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionId;
    use chrono::Duration;

    #[test]
    fn session_state_accessors() {
        let user = User::new(
            "sub_123".to_string(),
            "https://auth.example.com".to_string(),
            Role::Employee,
        );
        let session = Session::new(
            SessionId::new("sess_abc".to_string()),
            user.id(),
            Role::Employee,
            Duration::minutes(5),
        );

        let state = SessionState::Authenticated(Box::new(session.clone()));
        assert!(state.is_authenticated());
        assert_eq!(state.session().map(Session::user_id), Some(user.id()));

        assert!(!SessionState::Unauthenticated.is_authenticated());
        assert!(SessionState::Unauthenticated.session().is_none());

        let err = SessionState::ProviderError {
            reason: "connection refused".to_string(),
        };
        assert!(!err.is_authenticated());
        assert!(err.session().is_none());
    }

    #[test]
    fn authenticated_user_has_user_info() {
        let user = User::new(
            "sub_123".to_string(),
            "https://auth.example.com".to_string(),
            Role::Employee,
        );
        let session = Session::new(
            SessionId::new("sess_abc".to_string()),
            user.id(),
            Role::Employee,
            Duration::minutes(5),
        );

        let auth_user = AuthenticatedUser::new(session, user.clone());

        assert_eq!(auth_user.user_id(), user.id());
        assert_eq!(auth_user.user().subject(), "sub_123");
        assert_eq!(auth_user.role(), Role::Employee);
        assert!(!auth_user.is_admin());
    }

    #[test]
    fn authenticated_user_with_admin() {
        let user = User::new(
            "sub_admin".to_string(),
            "https://auth.example.com".to_string(),
            Role::Admin,
        );
        let session = Session::new(
            SessionId::new("sess_admin".to_string()),
            user.id(),
            Role::Admin,
            Duration::minutes(5),
        );

        let auth_user = AuthenticatedUser::new(session, user);

        assert!(auth_user.is_admin());
    }

    #[test]
    fn oidc_claims_builder() {
        let claims = OidcClaims::new(
            "sub_123".to_string(),
            "https://auth.example.com".to_string(),
        )
        .with_email(Some("user@example.com".to_string()))
        .with_display_name(Some("Test User".to_string()))
        .with_phone(Some("+1-555-0100".to_string()))
        .with_groups(vec!["stockroom-employees".to_string()]);

        assert_eq!(claims.subject, "sub_123");
        assert_eq!(claims.issuer, "https://auth.example.com");
        assert_eq!(claims.email, Some("user@example.com".to_string()));
        assert_eq!(claims.display_name, Some("Test User".to_string()));
        assert_eq!(claims.phone, Some("+1-555-0100".to_string()));
        assert_eq!(claims.groups, vec!["stockroom-employees"]);
    }
}
