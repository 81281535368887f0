//! Platform access, authentication, and authorization for stockroom.
//!
//! This crate provides:
//! - User management (`User` type with OIDC identity mirroring)
//! - Role-based access control (`Role`)
//! - Session management (`Session`, `SessionId`, `SessionState`)
//! - Authentication error types
//!
//! # Access Control Model
//!
//! Every signed-in user carries exactly one role, derived from OIDC group
//! membership at sign-in time and snapshotted into the session:
//! - `Viewer`: read-only access to dashboards and request lists
//! - `Employee`: may create and edit their own pending supply requests
//! - `Manager`: may additionally approve, reject, and fulfill any request
//! - `Admin`: may additionally manage users (roles, active flag)
//!
//! Role changes take effect on next sign-in (or session expiry). Short
//! session durations bound the revocation latency.
//!
//! This crate is free of server-only dependencies so the WASM UI can share
//! the same `Role` and snapshot types as the server.
//!
//! # Example
//!
//! ```
//! use stockroom_platform_access::{Role, RoleGroupMapping, Session, SessionId, User};
//! use chrono::Duration;
//!
//! // Create a user after OIDC authentication
//! let mapping = RoleGroupMapping::default();
//! let groups = vec!["stockroom-managers".to_string()];
//! let role = Role::from_groups(&groups, &mapping);
//! assert_eq!(role, Role::Manager);
//!
//! let mut user = User::new(
//!     "auth0|123456".to_string(),
//!     "https://example.auth0.com/".to_string(),
//!     role,
//! );
//! user.set_email(Some("alice@example.com".to_string()));
//!
//! // Create a session with the role snapshot
//! let session = Session::new(
//!     SessionId::new("sess_abc123".to_string()),
//!     user.id(),
//!     role,
//!     Duration::minutes(5),
//! );
//!
//! assert!(session.is_valid());
//! assert!(session.role().can_manage());
//! ```

pub mod auth;
pub mod error;
pub mod oidc;
pub mod role;
pub mod session;
pub mod user;

// Re-export main types at crate root
pub use auth::{AuthenticatedUser, OidcClaims, SessionState};
pub use error::{AuthenticationError, AuthorizationError};
pub use oidc::{OidcConfig, OidcConfigBuilder};
pub use role::{Role, RoleGroupMapping};
pub use session::{Session, SessionId};
pub use user::{ProfileDetails, User};
