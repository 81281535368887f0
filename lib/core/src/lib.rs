//! Core domain types for the stockroom supply-requisition portal.
//!
//! This crate provides the strongly-typed identifiers shared by every other
//! crate in the workspace. It is deliberately small and free of server-side
//! dependencies so it compiles for both native and WASM targets.

pub mod id;

pub use id::{DepartmentId, ParseIdError, SupplyRequestId, UserId};
