//! Declarative schema for the registration tables and its materialization.
//!
//! Tables are listed in dependency order (referenced tables first). Every statement is
//! idempotent, so materializing an up-to-date database changes nothing.

use greensteel_common::error::DbCheckError;
use sqlx::{Connection, PgConnection};

use crate::introspect::{self, ColumnInfo};

/// One table of the declarative schema.
#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
    pub name: &'static str,
    pub create: &'static str,
    pub indexes: &'static [&'static str],
    /// Columns the repositories read and write.
    pub columns: &'static [&'static str],
}

/// Result of materializing one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedTable {
    pub name: &'static str,
    /// False when the table already existed.
    pub created: bool,
}

/// Table label for errors raised while committing the whole schema.
pub const COMMIT: &str = "(commit)";

// Column names follow the auth service's tables, including the quoted mixed-case
// "Installation" columns. Timestamps are stored without time zone.
pub const COMPANIES: TableSchema = TableSchema {
    name: "companies",
    create: r#"
        CREATE TABLE IF NOT EXISTS companies (
            id                   SERIAL PRIMARY KEY,
            uuid                 VARCHAR(36) NOT NULL UNIQUE,
            company_id           VARCHAR(100) NOT NULL UNIQUE,
            hashed_password      VARCHAR(255) NOT NULL,
            "Installation"       VARCHAR(200) NOT NULL,
            "Installation_en"    VARCHAR(200),
            economic_activity    VARCHAR(200),
            economic_activity_en VARCHAR(200),
            representative       VARCHAR(100),
            representative_en    VARCHAR(100),
            email                VARCHAR(100),
            telephone            VARCHAR(50),
            street               VARCHAR(200),
            street_en            VARCHAR(200),
            number               VARCHAR(50),
            number_en            VARCHAR(50),
            postcode             VARCHAR(20),
            city                 VARCHAR(100),
            city_en              VARCHAR(100),
            country              VARCHAR(100),
            country_en           VARCHAR(100),
            unlocode             VARCHAR(10),
            sourcelatitude       DOUBLE PRECISION,
            sourcelongitude      DOUBLE PRECISION,
            created_at           TIMESTAMP NOT NULL DEFAULT NOW(),
            updated_at           TIMESTAMP NOT NULL DEFAULT NOW()
        )
    "#,
    indexes: &[
        "CREATE INDEX IF NOT EXISTS idx_company_id ON companies (company_id)",
        "CREATE INDEX IF NOT EXISTS idx_company_email ON companies (email)",
        r#"CREATE INDEX IF NOT EXISTS idx_company_installation ON companies ("Installation")"#,
        "CREATE INDEX IF NOT EXISTS idx_company_created_at ON companies (created_at)",
    ],
    columns: &[
        "id",
        "uuid",
        "company_id",
        "hashed_password",
        "Installation",
        "Installation_en",
        "economic_activity",
        "economic_activity_en",
        "representative",
        "representative_en",
        "email",
        "telephone",
        "street",
        "street_en",
        "number",
        "number_en",
        "postcode",
        "city",
        "city_en",
        "country",
        "country_en",
        "unlocode",
        "sourcelatitude",
        "sourcelongitude",
        "created_at",
        "updated_at",
    ],
};

pub const USERS: TableSchema = TableSchema {
    name: "users",
    create: r#"
        CREATE TABLE IF NOT EXISTS users (
            id               SERIAL PRIMARY KEY,
            uuid             VARCHAR(36) NOT NULL UNIQUE,
            username         VARCHAR(100) NOT NULL UNIQUE,
            hashed_password  VARCHAR(255) NOT NULL,
            full_name        VARCHAR(100) NOT NULL,
            company_id       INTEGER NOT NULL REFERENCES companies (id),
            role             VARCHAR(50) NOT NULL DEFAULT 'user',
            permissions      TEXT NOT NULL DEFAULT '{}',
            is_company_admin BOOLEAN NOT NULL DEFAULT FALSE,
            can_manage_users BOOLEAN NOT NULL DEFAULT FALSE,
            can_view_reports BOOLEAN NOT NULL DEFAULT TRUE,
            can_edit_data    BOOLEAN NOT NULL DEFAULT TRUE,
            can_export_data  BOOLEAN NOT NULL DEFAULT TRUE,
            is_active        BOOLEAN NOT NULL DEFAULT TRUE,
            created_at       TIMESTAMP NOT NULL DEFAULT NOW(),
            updated_at       TIMESTAMP NOT NULL DEFAULT NOW()
        )
    "#,
    indexes: &[
        "CREATE INDEX IF NOT EXISTS idx_user_username ON users (username)",
        "CREATE INDEX IF NOT EXISTS idx_user_company_id ON users (company_id)",
        "CREATE INDEX IF NOT EXISTS idx_user_role ON users (role)",
        "CREATE INDEX IF NOT EXISTS idx_user_created_at ON users (created_at)",
    ],
    columns: &[
        "id",
        "uuid",
        "username",
        "hashed_password",
        "full_name",
        "company_id",
        "role",
        "permissions",
        "is_company_admin",
        "can_manage_users",
        "can_view_reports",
        "can_edit_data",
        "can_export_data",
        "is_active",
        "created_at",
        "updated_at",
    ],
};

/// The full schema, in creation order.
pub const SCHEMA: &[TableSchema] = &[COMPANIES, USERS];

impl TableSchema {
    /// Expected columns absent from `actual`, in declaration order.
    pub fn missing_columns(&self, actual: &[ColumnInfo]) -> Vec<&'static str> {
        self.columns
            .iter()
            .copied()
            .filter(|col| !actual.iter().any(|c| c.name == *col))
            .collect()
    }
}

fn schema_error(table: &str, source: sqlx::Error) -> DbCheckError {
    DbCheckError::Schema {
        table: table.to_string(),
        source,
    }
}

/// Create any missing tables and indexes in a single transaction.
///
/// Errors are not converted: a privilege problem or a conflicting existing definition
/// must stop the check.
pub async fn materialize(conn: &mut PgConnection) -> Result<Vec<MaterializedTable>, DbCheckError> {
    let mut tx = conn.begin().await?;
    let mut outcome = Vec::with_capacity(SCHEMA.len());

    for table in SCHEMA {
        let schema_err = |source| schema_error(table.name, source);

        let existed = introspect::table_exists(&mut *tx, table.name)
            .await
            .map_err(schema_err)?;

        sqlx::query(table.create)
            .execute(&mut *tx)
            .await
            .map_err(schema_err)?;

        for index in table.indexes {
            sqlx::query(index)
                .execute(&mut *tx)
                .await
                .map_err(schema_err)?;
        }

        if existed {
            tracing::debug!(table = table.name, "Table already present");
        } else {
            tracing::info!(table = table.name, "Created table");
        }
        outcome.push(MaterializedTable {
            name: table.name,
            created: !existed,
        });
    }

    tx.commit().await.map_err(|e| schema_error(COMMIT, e))?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referenced_tables_come_first() {
        let names: Vec<_> = SCHEMA.iter().map(|t| t.name).collect();
        assert_eq!(names, ["companies", "users"]);
        assert!(USERS.create.contains("REFERENCES companies (id)"));
    }

    #[test]
    fn test_every_statement_is_idempotent() {
        for table in SCHEMA {
            assert!(table.create.contains("CREATE TABLE IF NOT EXISTS"));
            for index in table.indexes {
                assert!(index.starts_with("CREATE INDEX IF NOT EXISTS"));
                assert!(index.contains(&format!(" ON {} (", table.name)));
            }
        }
    }

    #[test]
    fn test_column_lists_match_ddl() {
        for table in SCHEMA {
            for col in table.columns {
                let quoted = format!("\"{col}\"");
                let declared = if col.chars().any(|c| c.is_ascii_uppercase()) {
                    table.create.contains(&quoted)
                } else {
                    table
                        .create
                        .lines()
                        .any(|line| line.trim_start().starts_with(&format!("{col} ")))
                };
                assert!(declared, "{}.{col} not declared", table.name);
            }
        }
    }

    #[test]
    fn test_uses_auth_service_column_names() {
        assert!(COMPANIES.create.contains(r#""Installation"       VARCHAR(200) NOT NULL"#));
        assert!(COMPANIES.create.contains("sourcelatitude"));
        assert!(!COMPANIES.create.contains("source_latitude"));
        assert!(USERS.create.contains("uuid             VARCHAR(36) NOT NULL UNIQUE"));
        assert!(USERS.create.contains("permissions      TEXT NOT NULL DEFAULT '{}'"));
    }

    fn column(name: &str) -> ColumnInfo {
        ColumnInfo {
            name: name.to_string(),
            data_type: "text".to_string(),
            nullable: true,
            column_default: None,
        }
    }

    #[test]
    fn test_missing_columns_reported_in_order() {
        let actual: Vec<_> = USERS
            .columns
            .iter()
            .filter(|c| !c.starts_with("can_"))
            .map(|c| column(c))
            .collect();
        assert_eq!(
            USERS.missing_columns(&actual),
            ["can_manage_users", "can_view_reports", "can_edit_data", "can_export_data"]
        );

        let full: Vec<_> = USERS.columns.iter().map(|c| column(c)).collect();
        assert!(USERS.missing_columns(&full).is_empty());
    }

    #[test]
    fn test_lowercase_column_does_not_satisfy_quoted_name() {
        let actual = vec![column("installation")];
        assert!(COMPANIES.missing_columns(&actual).contains(&"Installation"));
    }

    #[test]
    fn test_commit_failure_is_a_schema_error() {
        let err = schema_error(COMMIT, sqlx::Error::PoolClosed);
        assert_eq!(err.error_code(), "SCHEMA_ERROR");
        assert!(err.to_string().starts_with("Failed to materialize table '(commit)'"));
    }
}
