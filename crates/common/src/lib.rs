//! Shared building blocks for the notes service crates.
//!
//! Logging setup, startup environment checks, wire types shared by the
//! HTTP layers, and the optional admin listener.

pub mod types;
pub mod utils;
pub mod env;
pub mod admin_http;
