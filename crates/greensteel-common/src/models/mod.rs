//! Entity models for the auth service's registration tables.
//!
//! These mirror the `companies` and `users` tables: the row types are what queries return,
//! the `New*` types are what inserts accept.

pub mod company;
pub mod user;

pub use company::*;
pub use user::*;
