//! Database repositories for the stockroom domain.
//!
//! This module provides data access for:
//! - Supply requests and their status lifecycle
//! - Departments referenced by requests and profiles
//!
//! User, session, and profile repositories live in [`crate::auth::db`].

pub mod department;
pub mod supply_request;

pub use department::{DepartmentRecord, DepartmentRepository};
pub use supply_request::{ListedRequest, SupplyRequestRecord, SupplyRequestRepository};
