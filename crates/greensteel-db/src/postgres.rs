//! PostgreSQL connection helpers.

use sqlx::PgConnection;

/// Health check — verify the database answers a trivial query.
pub async fn health_check(conn: &mut PgConnection) -> bool {
    sqlx::query("SELECT 1").execute(conn).await.is_ok()
}

/// Quote an identifier for interpolation into SQL (`"` doubled, whole name wrapped).
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
