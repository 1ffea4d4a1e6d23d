//! User repository.

use greensteel_common::models::user::{NewUser, User};
use greensteel_common::permissions::PermissionFlags;
use sqlx::PgConnection;

/// Insert a user, returning the stored row with generated fields.
///
/// The permission set is written both as the `can_*` columns and as the JSON document.
pub async fn create_user(conn: &mut PgConnection, user: &NewUser) -> Result<User, sqlx::Error> {
    let document = user
        .permissions
        .to_document()
        .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
    let flags = PermissionFlags::from(user.permissions);

    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (
            uuid, username, hashed_password, full_name, company_id,
            role, permissions, is_company_admin,
            can_manage_users, can_view_reports, can_edit_data, can_export_data,
            is_active, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, NOW(), NOW())
        RETURNING *
        "#,
    )
    .bind(user.uuid.to_string())
    .bind(&user.username)
    .bind(&user.hashed_password)
    .bind(&user.full_name)
    .bind(user.company_id)
    .bind(user.role.as_str())
    .bind(document)
    .bind(user.is_company_admin)
    .bind(flags.can_manage_users)
    .bind(flags.can_view_reports)
    .bind(flags.can_edit_data)
    .bind(flags.can_export_data)
    .bind(user.is_active)
    .fetch_one(conn)
    .await
}

/// Find a user by generated ID.
pub async fn find_by_id(conn: &mut PgConnection, id: i32) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await
}

/// Find a user by login name.
pub async fn find_by_username(
    conn: &mut PgConnection,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(conn)
        .await
}

/// Delete a user by login name.
pub async fn delete_by_username(conn: &mut PgConnection, username: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE username = $1")
        .bind(username)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

/// Delete every user of the company with the given business identifier.
pub async fn delete_by_company_key(
    conn: &mut PgConnection,
    company_id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM users
        WHERE company_id IN (SELECT id FROM companies WHERE company_id = $1)
        "#,
    )
    .bind(company_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

/// Count all users.
pub async fn count_users(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(conn)
        .await?;
    Ok(row.0)
}
