// Rust guideline compliant 2026-03-01

//! Adapters (secondary ports) for the live-feed binary.
//!
//! Each sub-module implements one or more hexagonal port traits defined in
//! the `domain` crate. Adapters are intentionally isolated from feed and
//! component logic.

pub mod sqlite_storage;
pub mod static_auth;
