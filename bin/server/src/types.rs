//! Shared types used across server functions and UI components.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use stockroom_platform_access::Role;

/// User info for display in the UI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub role: Role,
}

impl UserInfo {
    /// Best label for the header menu: display name, then email, then a stub.
    #[must_use]
    pub fn label(&self) -> String {
        self.display_name
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| "User".to_string())
    }
}

/// Session info exposed to the UI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// When the session expires (RFC 3339).
    pub expires_at: String,
    /// Role snapshot taken at sign-in.
    pub role: Role,
}

/// Outcome of the current-session query.
///
/// "No session" is data, not an error, so the client never retries it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionSnapshot {
    /// A valid session exists.
    Authenticated(SessionInfo),
    /// No valid session.
    Unauthenticated,
}

impl SessionSnapshot {
    /// Returns the session info, if authenticated.
    #[must_use]
    pub fn info(&self) -> Option<&SessionInfo> {
        match self {
            Self::Authenticated(info) => Some(info),
            Self::Unauthenticated => None,
        }
    }
}

/// Lifecycle state of a supply request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Fulfilled,
}

impl RequestStatus {
    /// Returns the canonical lowercase name, matching the stored form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Fulfilled => "fulfilled",
        }
    }

    /// Human-readable label for badges.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Fulfilled => "Fulfilled",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a status name fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError {
    pub input: String,
}

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown request status: '{}'", self.input)
    }
}

impl std::error::Error for ParseStatusError {}

impl FromStr for RequestStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "fulfilled" => Ok(Self::Fulfilled),
            other => Err(ParseStatusError {
                input: other.to_string(),
            }),
        }
    }
}

/// Supply request summary for list views.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSummary {
    pub id: String,
    pub item_name: String,
    pub quantity: i32,
    pub status: RequestStatus,
    pub requester_id: String,
    pub requester_name: String,
    pub department_name: Option<String>,
    pub created_at: String,
}

/// Supply request detail for the edit form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDetail {
    pub id: String,
    pub item_name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub department_id: Option<String>,
    pub status: RequestStatus,
    pub requester_id: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Counts by status for the dashboard shell.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestStats {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub fulfilled: i64,
}

impl RequestStats {
    /// Total number of requests across all statuses.
    #[must_use]
    pub fn total(&self) -> i64 {
        self.pending + self.approved + self.rejected + self.fulfilled
    }
}

/// A single page of results.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    /// 1-based page number.
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

impl<T> Paginated<T> {
    /// Number of pages needed for `total` items; at least 1.
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        if self.total <= 0 || self.per_page == 0 {
            return 1;
        }
        let pages = (self.total as u64).div_ceil(u64::from(self.per_page));
        u32::try_from(pages).unwrap_or(u32::MAX).max(1)
    }

    /// Returns true if a page follows this one.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Returns true if a page precedes this one.
    #[must_use]
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// Department info for the request form dropdown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentInfo {
    pub id: String,
    pub name: String,
}

/// User row for the admin page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUserInfo {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub role: Role,
    pub active: bool,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_info_label_preference() {
        let mut info = UserInfo {
            id: "usr_1".to_string(),
            display_name: Some("Alice".to_string()),
            email: Some("alice@example.com".to_string()),
            role: Role::Employee,
        };
        assert_eq!(info.label(), "Alice");

        info.display_name = None;
        assert_eq!(info.label(), "alice@example.com");

        info.email = None;
        assert_eq!(info.label(), "User");
    }

    #[test]
    fn session_snapshot_info() {
        let snapshot = SessionSnapshot::Authenticated(SessionInfo {
            expires_at: "2026-01-01T00:00:00Z".to_string(),
            role: Role::Manager,
        });
        assert_eq!(snapshot.info().map(|i| i.role), Some(Role::Manager));
        assert!(SessionSnapshot::Unauthenticated.info().is_none());
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::Approved,
            RequestStatus::Rejected,
            RequestStatus::Fulfilled,
        ] {
            let parsed: RequestStatus = status.as_str().parse().expect("should parse");
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn parse_unknown_status_fails() {
        let err = "shipped".parse::<RequestStatus>().unwrap_err();
        assert_eq!(err.input, "shipped");
    }

    #[test]
    fn status_serialization_format() {
        let json = serde_json::to_string(&RequestStatus::Pending).expect("serialize");
        assert_eq!(json, "\"pending\"");
    }

    #[test]
    fn pagination_math() {
        let page: Paginated<i32> = Paginated {
            items: vec![],
            page: 1,
            per_page: 20,
            total: 0,
        };
        assert_eq!(page.total_pages(), 1);
        assert!(!page.has_next());
        assert!(!page.has_prev());

        let page: Paginated<i32> = Paginated {
            items: vec![],
            page: 2,
            per_page: 20,
            total: 41,
        };
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());
        assert!(page.has_prev());

        let page: Paginated<i32> = Paginated {
            items: vec![],
            page: 3,
            per_page: 20,
            total: 60,
        };
        assert_eq!(page.total_pages(), 3);
        assert!(!page.has_next());
    }

    #[test]
    fn request_stats_total() {
        let stats = RequestStats {
            pending: 3,
            approved: 2,
            rejected: 1,
            fulfilled: 4,
        };
        assert_eq!(stats.total(), 10);
        assert_eq!(RequestStats::default().total(), 0);
    }
}
