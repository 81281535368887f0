//! Authentication module for the stockroom server.
//!
//! This module provides:
//! - OIDC authentication against an external identity provider
//! - Database-backed session management
//! - The route-guard middleware that partitions paths into public and
//!   protected sets
//!
//! # Authorization Model
//!
//! The role carried by a session is a snapshot of OIDC group membership
//! taken at sign-in. Role and active-flag changes take effect on next login
//! (or session expiry); the short default session duration (5 minutes)
//! bounds the revocation latency. Resolution of the session itself is
//! three-valued (`SessionState`): authenticated, unauthenticated, or a
//! provider error, and the guard fails closed on the last.

pub mod db;
pub mod middleware;
pub mod oidc;
pub mod routes;

use crate::config::SessionConfig;
use sqlx::PgPool;

pub use middleware::{route_guard, SESSION_COOKIE};
pub use oidc::OidcClient;
pub use routes::{callback, logout, oauth_start};

/// Shared application state.
pub struct AppState {
    /// Database connection pool.
    pub db_pool: PgPool,
    /// OIDC client for authentication.
    pub oidc_client: OidcClient,
    /// Session configuration.
    pub session_config: SessionConfig,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(db_pool: PgPool, oidc_client: OidcClient, session_config: SessionConfig) -> Self {
        Self {
            db_pool,
            oidc_client,
            session_config,
        }
    }
}
