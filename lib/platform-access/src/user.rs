//! User domain type and profile details.
//!
//! The User is the application-side mirror of an identity-provider account.
//! Users are identified by their OIDC subject claim and have a corresponding
//! internal UserId. Profile details (phone, employee code, department) are
//! kept separately and synchronized best-effort after each sign-in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stockroom_core::{DepartmentId, UserId};

use crate::role::Role;

/// Represents an authenticated user of the portal.
///
/// Users are created after their first successful OIDC authentication.
/// Email, display name, and role are refreshed from claims on each sign-in.
/// The active flag is the admin-side refusal lever: inactive users are
/// denied at sign-in, and existing sessions lapse within the session
/// duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Internal portal user ID.
    id: UserId,
    /// OIDC subject claim - unique identifier from the identity provider.
    subject: String,
    /// OIDC issuer URL - identifies which identity provider authenticated the user.
    issuer: String,
    /// User's email address (from OIDC email claim, if available).
    email: Option<String>,
    /// User's display name (from OIDC name or preferred_username claim).
    display_name: Option<String>,
    /// Role derived from OIDC groups at last sign-in.
    role: Role,
    /// Whether the account may sign in.
    active: bool,
    /// When the user record was created.
    created_at: DateTime<Utc>,
    /// When the user record was last updated.
    updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user with the given OIDC identity and role.
    ///
    /// The user ID is generated automatically and the account starts
    /// active. Use this when creating a user after first authentication.
    #[must_use]
    pub fn new(subject: String, issuer: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            subject,
            issuer,
            email: None,
            display_name: None,
            role,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a user with all fields specified.
    ///
    /// Use this when reconstituting a user from storage.
    #[must_use]
    #[expect(clippy::too_many_arguments)]
    pub fn with_all_fields(
        id: UserId,
        subject: String,
        issuer: String,
        email: Option<String>,
        display_name: Option<String>,
        role: Role,
        active: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            subject,
            issuer,
            email,
            display_name,
            role,
            active,
            created_at,
            updated_at,
        }
    }

    /// Returns the user's internal portal ID.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the OIDC subject claim.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the OIDC issuer URL.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Returns the user's email address, if available.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the user's display name, if available.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Returns the user's role as of last sign-in.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns true if the account may sign in.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns when the user was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the user was last updated.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Sets the user's email address.
    pub fn set_email(&mut self, email: Option<String>) {
        self.email = email;
        self.updated_at = Utc::now();
    }

    /// Sets the user's display name.
    pub fn set_display_name(&mut self, display_name: Option<String>) {
        self.display_name = display_name;
        self.updated_at = Utc::now();
    }

    /// Sets the user's role.
    pub fn set_role(&mut self, role: Role) {
        self.role = role;
        self.updated_at = Utc::now();
    }

    /// Sets whether the account may sign in.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        self.updated_at = Utc::now();
    }
}

/// Profile details mirrored from the identity provider and HR systems.
///
/// Synchronized by an idempotent upsert keyed by user id after each
/// successful sign-in. Sync failure never blocks the sign-in itself.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProfileDetails {
    /// Phone number, if known.
    pub phone: Option<String>,
    /// Employee code, if known.
    pub employee_code: Option<String>,
    /// Department, if known.
    pub department_id: Option<DepartmentId>,
}

impl ProfileDetails {
    /// Returns true if every field is unset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phone.is_none() && self.employee_code.is_none() && self.department_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User::new(
            "sub_123".to_string(),
            "https://auth.example.com".to_string(),
            Role::Employee,
        )
    }

    #[test]
    fn new_user_has_generated_id() {
        let user = test_user();
        assert!(user.id().to_string().starts_with("usr_"));
    }

    #[test]
    fn new_user_has_identity_and_role() {
        let user = test_user();
        assert_eq!(user.subject(), "sub_123");
        assert_eq!(user.issuer(), "https://auth.example.com");
        assert_eq!(user.role(), Role::Employee);
        assert!(user.is_active());
    }

    #[test]
    fn new_user_has_no_optional_fields() {
        let user = test_user();
        assert!(user.email().is_none());
        assert!(user.display_name().is_none());
    }

    #[test]
    fn new_user_has_timestamps() {
        let before = Utc::now();
        let user = test_user();
        let after = Utc::now();

        assert!(user.created_at() >= before);
        assert!(user.created_at() <= after);
        assert_eq!(user.created_at(), user.updated_at());
    }

    #[test]
    fn set_email_updates_timestamp() {
        let mut user = test_user();
        let original_updated_at = user.updated_at();

        std::thread::sleep(std::time::Duration::from_millis(1));
        user.set_email(Some("user@example.com".to_string()));

        assert_eq!(user.email(), Some("user@example.com"));
        assert!(user.updated_at() > original_updated_at);
    }

    #[test]
    fn set_role_updates_timestamp() {
        let mut user = test_user();
        let original_updated_at = user.updated_at();

        std::thread::sleep(std::time::Duration::from_millis(1));
        user.set_role(Role::Manager);

        assert_eq!(user.role(), Role::Manager);
        assert!(user.updated_at() > original_updated_at);
    }

    #[test]
    fn deactivate_account() {
        let mut user = test_user();
        user.set_active(false);
        assert!(!user.is_active());
    }

    #[test]
    fn with_all_fields_preserves_values() {
        let id = UserId::new();
        let created = Utc::now() - chrono::Duration::days(30);
        let updated = Utc::now() - chrono::Duration::days(1);

        let user = User::with_all_fields(
            id,
            "sub_456".to_string(),
            "https://auth.example.com".to_string(),
            Some("alice@example.com".to_string()),
            Some("Alice".to_string()),
            Role::Manager,
            false,
            created,
            updated,
        );

        assert_eq!(user.id(), id);
        assert_eq!(user.subject(), "sub_456");
        assert_eq!(user.email(), Some("alice@example.com"));
        assert_eq!(user.display_name(), Some("Alice"));
        assert_eq!(user.role(), Role::Manager);
        assert!(!user.is_active());
        assert_eq!(user.created_at(), created);
        assert_eq!(user.updated_at(), updated);
    }

    #[test]
    fn profile_details_emptiness() {
        assert!(ProfileDetails::default().is_empty());

        let details = ProfileDetails {
            employee_code: Some("E-1042".to_string()),
            ..ProfileDetails::default()
        };
        assert!(!details.is_empty());
    }

    #[test]
    fn user_serialization_roundtrip() {
        let mut user = test_user();
        user.set_email(Some("test@example.com".to_string()));

        let json = serde_json::to_string(&user).expect("serialize");
        let parsed: User = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(user, parsed);
    }
}
