//! Storage abstractions for service layer
//!
//! File-backed stores that keep the file as the only source of truth.

pub mod json_list_store;
