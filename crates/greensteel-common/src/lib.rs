//! # greensteel-common
//!
//! Shared types, configuration, error handling, and utilities used by the dbcheck crates.
//! This is the foundation layer — no database access, just primitives and contracts.

pub mod config;
pub mod credentials;
pub mod error;
pub mod models;
pub mod permissions;
pub mod validation;
