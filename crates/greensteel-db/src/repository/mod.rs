//! Repository layer — query functions organized by entity.
//!
//! Every function takes `&mut PgConnection` so the caller decides the transaction scope:
//! pass a session directly or `&mut *tx` from an open transaction.

pub mod companies;
pub mod users;
