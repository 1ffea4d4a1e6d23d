//! Schema introspection via `information_schema`.
//!
//! Read-only. `information_schema` columns use domain types (`sql_identifier`,
//! `yes_or_no`), so every text column is cast to `text` before decoding.

use sqlx::PgConnection;

use crate::postgres::quote_ident;

/// One column as reported by the database.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub column_default: Option<String>,
}

/// A table with its columns and current row count.
#[derive(Debug, Clone)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
    pub row_count: i64,
}

/// Does a base table exist in the `public` schema?
pub async fn table_exists(conn: &mut PgConnection, table: &str) -> Result<bool, sqlx::Error> {
    let (exists,): (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM information_schema.tables
            WHERE table_schema = 'public' AND table_name = $1
        )
        "#,
    )
    .bind(table)
    .fetch_one(conn)
    .await?;
    Ok(exists)
}

/// Base tables in the `public` schema, sorted by name.
pub async fn list_tables(conn: &mut PgConnection) -> Result<Vec<String>, sqlx::Error> {
    let rows: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT table_name::text
        FROM information_schema.tables
        WHERE table_schema = 'public' AND table_type = 'BASE TABLE'
        ORDER BY table_name
        "#,
    )
    .fetch_all(conn)
    .await?;
    Ok(rows.into_iter().map(|(name,)| name).collect())
}

/// Columns of a `public` table in ordinal order.
pub async fn list_columns(
    conn: &mut PgConnection,
    table: &str,
) -> Result<Vec<ColumnInfo>, sqlx::Error> {
    sqlx::query_as::<_, ColumnInfo>(
        r#"
        SELECT
            column_name::text       AS name,
            data_type::text         AS data_type,
            (is_nullable = 'YES')   AS nullable,
            column_default::text    AS column_default
        FROM information_schema.columns
        WHERE table_schema = 'public' AND table_name = $1
        ORDER BY ordinal_position
        "#,
    )
    .bind(table)
    .fetch_all(conn)
    .await
}

/// Exact row count of a `public` table.
pub async fn count_rows(conn: &mut PgConnection, table: &str) -> Result<i64, sqlx::Error> {
    let sql = format!("SELECT COUNT(*) FROM public.{}", quote_ident(table));
    let (count,): (i64,) = sqlx::query_as(&sql).fetch_one(conn).await?;
    Ok(count)
}

/// Every `public` table with its columns and row count.
pub async fn describe(conn: &mut PgConnection) -> Result<Vec<TableInfo>, sqlx::Error> {
    let tables = list_tables(&mut *conn).await?;
    let mut out = Vec::with_capacity(tables.len());
    for name in tables {
        let columns = list_columns(&mut *conn, &name).await?;
        let row_count = count_rows(&mut *conn, &name).await?;
        out.push(TableInfo {
            name,
            columns,
            row_count,
        });
    }
    Ok(out)
}
