//! stockroom web server and UI.
//!
//! This crate provides the Leptos-based web interface for the stockroom
//! supply-requisition portal, along with the axum server that hosts it:
//! the route-guard middleware, the OIDC sign-in flow, and the Postgres
//! repositories behind the server functions.

#![allow(non_snake_case)]

pub mod app;
pub mod auth_context;
pub mod pages;
pub mod requests;
pub mod types;
pub mod user;
pub mod validate;

#[cfg(feature = "ssr")]
pub mod auth;
#[cfg(feature = "ssr")]
pub mod config;
#[cfg(feature = "ssr")]
pub mod db;
#[cfg(feature = "ssr")]
pub mod error;
#[cfg(feature = "ssr")]
pub mod server_helpers;

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    use crate::app::App;
    console_error_panic_hook::set_once();
    leptos::mount::hydrate_body(App);
}
