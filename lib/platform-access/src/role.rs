//! Role types for platform access control.
//!
//! Each user carries exactly one role from a small fixed set. The role is
//! derived from OIDC group membership at sign-in and snapshotted into the
//! session. Variants are ordered by ascending privilege so that capability
//! checks reduce to comparisons.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Platform role derived from OIDC group membership.
///
/// Ordered by ascending privilege: `Viewer < Employee < Manager < Admin`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Read-only access to dashboards and request lists.
    #[default]
    Viewer,
    /// May create and edit their own pending supply requests.
    Employee,
    /// May additionally approve, reject, and fulfill any request.
    Manager,
    /// May additionally manage users (roles, active flag).
    Admin,
}

/// OIDC group names that map to each role.
///
/// A user holding several mapped groups receives the highest-privilege
/// matching role. A user with no mapped group falls back to `Viewer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGroupMapping {
    /// Group granting admin access.
    pub admin: String,
    /// Group granting manager access.
    pub manager: String,
    /// Group granting employee access.
    pub employee: String,
    /// Group granting viewer access.
    pub viewer: String,
}

impl Default for RoleGroupMapping {
    fn default() -> Self {
        Self {
            admin: "stockroom-admins".to_string(),
            manager: "stockroom-managers".to_string(),
            employee: "stockroom-employees".to_string(),
            viewer: "stockroom-viewers".to_string(),
        }
    }
}

impl Role {
    /// Derives a role from a list of OIDC group names.
    ///
    /// The highest-privilege matching group wins. No matching group yields
    /// `Viewer`: a fresh OAuth user always gets read-only access, and
    /// refusal is handled through the account's active flag instead.
    #[must_use]
    pub fn from_groups(groups: &[String], mapping: &RoleGroupMapping) -> Self {
        let has = |name: &str| groups.iter().any(|g| g == name);

        if has(&mapping.admin) {
            Self::Admin
        } else if has(&mapping.manager) {
            Self::Manager
        } else if has(&mapping.employee) {
            Self::Employee
        } else {
            Self::Viewer
        }
    }

    /// Returns true if this role has admin privileges.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Returns true if this role may approve, reject, or fulfill requests.
    #[must_use]
    pub fn can_manage(&self) -> bool {
        *self >= Self::Manager
    }

    /// Returns true if this role may create and edit its own requests.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        *self >= Self::Employee
    }

    /// Returns the canonical lowercase name, matching the stored form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Employee => "employee",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }

    /// All roles in ascending privilege order, for admin UI selectors.
    #[must_use]
    pub fn all() -> [Role; 4] {
        [Self::Viewer, Self::Employee, Self::Manager, Self::Admin]
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a role name fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError {
    /// The rejected input.
    pub input: String,
}

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: '{}'", self.input)
    }
}

impl std::error::Error for ParseRoleError {}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "viewer" => Ok(Self::Viewer),
            "employee" => Ok(Self::Employee),
            "manager" => Ok(Self::Manager),
            "admin" => Ok(Self::Admin),
            other => Err(ParseRoleError {
                input: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn privilege_ordering() {
        assert!(Role::Viewer < Role::Employee);
        assert!(Role::Employee < Role::Manager);
        assert!(Role::Manager < Role::Admin);
    }

    #[test]
    fn capability_checks() {
        assert!(!Role::Viewer.can_submit());
        assert!(Role::Employee.can_submit());
        assert!(!Role::Employee.can_manage());
        assert!(Role::Manager.can_manage());
        assert!(!Role::Manager.is_admin());
        assert!(Role::Admin.is_admin());
        assert!(Role::Admin.can_manage());
        assert!(Role::Admin.can_submit());
    }

    #[test]
    fn from_groups_no_matching_groups_falls_back_to_viewer() {
        let groups = vec!["other-group".to_string(), "unrelated".to_string()];
        let role = Role::from_groups(&groups, &RoleGroupMapping::default());
        assert_eq!(role, Role::Viewer);
    }

    #[test]
    fn from_groups_empty_falls_back_to_viewer() {
        let role = Role::from_groups(&[], &RoleGroupMapping::default());
        assert_eq!(role, Role::Viewer);
    }

    #[test]
    fn from_groups_single_match() {
        let groups = vec!["stockroom-employees".to_string(), "other".to_string()];
        let role = Role::from_groups(&groups, &RoleGroupMapping::default());
        assert_eq!(role, Role::Employee);
    }

    #[test]
    fn from_groups_highest_privilege_wins() {
        let groups = vec![
            "stockroom-viewers".to_string(),
            "stockroom-admins".to_string(),
            "stockroom-employees".to_string(),
        ];
        let role = Role::from_groups(&groups, &RoleGroupMapping::default());
        assert_eq!(role, Role::Admin);
    }

    #[test]
    fn from_groups_custom_mapping() {
        let mapping = RoleGroupMapping {
            admin: "ops".to_string(),
            manager: "leads".to_string(),
            employee: "staff".to_string(),
            viewer: "guests".to_string(),
        };
        let groups = vec!["leads".to_string()];
        assert_eq!(Role::from_groups(&groups, &mapping), Role::Manager);
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in Role::all() {
            let parsed: Role = role.as_str().parse().expect("should parse");
            assert_eq!(parsed, role);
        }
    }

    #[test]
    fn parse_unknown_role_fails() {
        let err = "root".parse::<Role>().unwrap_err();
        assert_eq!(err.input, "root");
    }

    #[test]
    fn role_serialization_format() {
        let json = serde_json::to_string(&Role::Manager).expect("serialize");
        assert_eq!(json, "\"manager\"");

        let parsed: Role = serde_json::from_str("\"admin\"").expect("deserialize");
        assert_eq!(parsed, Role::Admin);
    }
}
