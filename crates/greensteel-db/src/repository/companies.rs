//! Company repository.

use greensteel_common::models::company::{Company, NewCompany};
use sqlx::PgConnection;

/// Insert a company registration, returning the stored row with generated fields.
pub async fn create_company(
    conn: &mut PgConnection,
    company: &NewCompany,
) -> Result<Company, sqlx::Error> {
    sqlx::query_as::<_, Company>(
        r#"
        INSERT INTO companies (
            uuid, company_id, hashed_password,
            "Installation", "Installation_en", economic_activity, economic_activity_en,
            representative, representative_en, email, telephone,
            street, street_en, number, number_en, postcode,
            city, city_en, country, country_en, unlocode,
            sourcelatitude, sourcelongitude,
            created_at, updated_at
        )
        VALUES (
            $1, $2, $3,
            $4, $5, $6, $7,
            $8, $9, $10, $11,
            $12, $13, $14, $15, $16,
            $17, $18, $19, $20, $21,
            $22, $23,
            NOW(), NOW()
        )
        RETURNING *
        "#,
    )
    .bind(company.uuid.to_string())
    .bind(&company.company_id)
    .bind(&company.hashed_password)
    .bind(&company.installation)
    .bind(&company.installation_en)
    .bind(&company.economic_activity)
    .bind(&company.economic_activity_en)
    .bind(&company.representative)
    .bind(&company.representative_en)
    .bind(&company.email)
    .bind(&company.telephone)
    .bind(&company.street)
    .bind(&company.street_en)
    .bind(&company.number)
    .bind(&company.number_en)
    .bind(&company.postcode)
    .bind(&company.city)
    .bind(&company.city_en)
    .bind(&company.country)
    .bind(&company.country_en)
    .bind(&company.unlocode)
    .bind(company.source_latitude)
    .bind(company.source_longitude)
    .fetch_one(conn)
    .await
}

/// Find a company by its generated ID.
pub async fn find_by_id(conn: &mut PgConnection, id: i32) -> Result<Option<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await
}

/// Find a company by its business identifier.
pub async fn find_by_company_id(
    conn: &mut PgConnection,
    company_id: &str,
) -> Result<Option<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE company_id = $1")
        .bind(company_id)
        .fetch_optional(conn)
        .await
}

/// Resolve the company a user belongs to.
pub async fn find_for_user(
    conn: &mut PgConnection,
    user_id: i32,
) -> Result<Option<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>(
        r#"
        SELECT c.* FROM companies c
        INNER JOIN users u ON u.company_id = c.id
        WHERE u.id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(conn)
    .await
}

/// Delete a company by business identifier. Its users must already be gone.
pub async fn delete_by_company_id(
    conn: &mut PgConnection,
    company_id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM companies WHERE company_id = $1")
        .bind(company_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

/// Count all companies.
pub async fn count_companies(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM companies")
        .fetch_one(conn)
        .await?;
    Ok(row.0)
}
