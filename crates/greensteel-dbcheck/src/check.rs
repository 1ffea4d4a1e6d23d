//! The check run: environment → probe → schema → introspection → seed → report.

use std::io::Write;

use greensteel_common::config::AppConfig;
use greensteel_common::error::DbCheckError;
use greensteel_db::introspect::TableInfo;
use greensteel_db::{introspect, schema, Database};
use sqlx::{Connection, PgConnection};

use crate::console::Console;
use crate::fixtures::{FixtureSet, RegistrationKeys};
use crate::stage::{CheckOutcome, Stage};
use crate::workflow::{self, SeedSummary};

/// Run every stage in order against the configured database.
///
/// Configuration, connectivity, introspection and seed failures end the run with
/// [`CheckOutcome::Aborted`]. Schema materialization errors are returned as `Err`.
pub async fn run<W: Write>(
    config: &AppConfig,
    console: &mut Console<W>,
) -> Result<CheckOutcome, DbCheckError> {
    let title = format!("🔧 {} database check", config.service_name);
    console.banner(&title);

    // === Environment ===
    section(console, Stage::CheckingEnv);
    console.info("Environment:");
    console.detail(&format!(
        "DATABASE_URL: {}",
        if config.has_database_url() { "set" } else { "not set" }
    ));
    console.detail(&format!("DATABASE_SSL_MODE: {}", config.ssl_mode_label()));
    console.detail(&format!("SERVICE_NAME: {}", config.service_name));

    let db = match config.database().and_then(|s| Database::new(&s)) {
        Ok(db) => db,
        Err(e) => {
            tracing::error!(code = e.error_code(), "{e}");
            console.fail(&e.to_string());
            console.detail("Check the PostgreSQL connection settings of the deployment.");
            return Ok(CheckOutcome::aborted(Stage::CheckingEnv, e.to_string()));
        }
    };

    // === Connectivity ===
    section(console, Stage::ProbingConnection);
    if !db.probe().await {
        console.fail(&format!("Could not connect to {}", db.target()));
        return Ok(CheckOutcome::aborted(
            Stage::ProbingConnection,
            format!("connection to {} failed", db.target()),
        ));
    }
    console.ok(&format!("Connected to {}", db.target()));

    // === One session for everything else ===
    let mut conn = match db.session().await {
        Ok(conn) => conn,
        Err(e) => {
            console.fail(&e.to_string());
            return Ok(CheckOutcome::aborted(Stage::MaterializingSchema, e.to_string()));
        }
    };

    let result = run_in_session(&mut conn, config, console).await;

    if let Err(e) = conn.close().await {
        tracing::warn!("Error closing session: {e}");
    }

    let outcome = result?;
    match &outcome {
        CheckOutcome::Passed(_) => {
            console.line_break();
            console.ok("Database check completed");
            console.rule();
        }
        CheckOutcome::Aborted { stage, reason } => {
            tracing::error!(stage = %stage, "Check aborted: {reason}");
        }
    }
    Ok(outcome)
}

async fn run_in_session<W: Write>(
    conn: &mut PgConnection,
    config: &AppConfig,
    console: &mut Console<W>,
) -> Result<CheckOutcome, DbCheckError> {
    // === Schema ===
    section(console, Stage::MaterializingSchema);
    for table in schema::materialize(&mut *conn).await? {
        if table.created {
            console.ok(&format!("Created table {}", table.name));
        } else {
            console.ok(&format!("Table {} already exists", table.name));
        }
    }

    // === Introspection ===
    section(console, Stage::Introspecting);
    let tables = match introspect::describe(&mut *conn).await {
        Ok(tables) => tables,
        Err(e) => {
            console.fail(&format!("Could not read table metadata: {e}"));
            return Ok(CheckOutcome::aborted(Stage::Introspecting, e.to_string()));
        }
    };
    let names: Vec<_> = tables.iter().map(|t| t.name.as_str()).collect();
    console.info(&format!("Tables: {}", names.join(", ")));
    for table in &tables {
        console.info(&format!("{} ({} rows)", table.name, table.row_count));
        for column in &table.columns {
            let default = column
                .column_default
                .as_deref()
                .map(|d| format!(" default {d}"))
                .unwrap_or_default();
            console.detail(&format!(
                "{}: {} (nullable: {}){default}",
                column.name, column.data_type, column.nullable
            ));
        }
    }
    let missing: Vec<_> = schema::SCHEMA
        .iter()
        .map(|t| t.name)
        .filter(|name| !names.contains(name))
        .collect();
    if !missing.is_empty() {
        let reason = format!("expected tables missing: {}", missing.join(", "));
        console.fail(&reason);
        return Ok(CheckOutcome::aborted(Stage::Introspecting, reason));
    }
    if let Some(reason) = column_drift(&tables) {
        console.fail(&reason);
        console.detail("The existing tables do not match the auth service's column layout.");
        return Ok(CheckOutcome::aborted(Stage::Introspecting, reason));
    }

    // === Seed and verify ===
    section(console, Stage::SeedingAndVerifying);
    let fixtures = match FixtureSet::build(RegistrationKeys::new(config.seed_isolate_registration))
    {
        Ok(fixtures) => fixtures,
        Err(e) => {
            console.fail(&e.to_string());
            return Ok(CheckOutcome::aborted(Stage::SeedingAndVerifying, e.to_string()));
        }
    };
    if let RegistrationKeys::PerRun(token) = &fixtures.keys {
        console.info(&format!("Registration fixtures use run token {token}"));
    }

    let summary = match workflow::seed_and_verify(conn, &fixtures, console).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!(code = e.error_code(), "Seed workflow failed: {e}");
            console.fail(&format!("Error while processing test data: {e}"));
            return Ok(CheckOutcome::aborted(Stage::SeedingAndVerifying, e.to_string()));
        }
    };

    // === Report ===
    section(console, Stage::Reporting);
    report(&summary, console);

    Ok(CheckOutcome::Passed(summary))
}

/// Describe every expected column missing from an existing table, if any.
fn column_drift(tables: &[TableInfo]) -> Option<String> {
    let drift: Vec<_> = schema::SCHEMA
        .iter()
        .filter_map(|expected| {
            let actual = tables.iter().find(|t| t.name == expected.name)?;
            let missing = expected.missing_columns(&actual.columns);
            (!missing.is_empty())
                .then(|| format!("{} is missing columns {}", expected.name, missing.join(", ")))
        })
        .collect();
    (!drift.is_empty()).then(|| drift.join("; "))
}

fn section<W: Write>(console: &mut Console<W>, stage: Stage) {
    tracing::debug!(stage = %stage, "Entering stage");
    console.section(stage.number(), stage.title());
}

/// Final counts.
pub fn report<W: Write>(summary: &SeedSummary, console: &mut Console<W>) {
    console.info(&format!("Total companies: {}", summary.total_companies));
    console.info(&format!("Total users: {}", summary.total_users));
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run_with(vars: &[(&str, &str)]) -> (CheckOutcome, String) {
        let config = AppConfig::from_vars(vars.iter().copied()).unwrap();
        let mut console = Console::new(Vec::new());
        let outcome = run(&config, &mut console).await.unwrap();
        (outcome, String::from_utf8(console.into_inner()).unwrap())
    }

    fn table(name: &str, columns: &[&str]) -> TableInfo {
        TableInfo {
            name: name.to_string(),
            columns: columns
                .iter()
                .map(|c| introspect::ColumnInfo {
                    name: c.to_string(),
                    data_type: "text".to_string(),
                    nullable: true,
                    column_default: None,
                })
                .collect(),
            row_count: 0,
        }
    }

    #[test]
    fn test_column_drift_names_table_and_columns() {
        let companies = table("companies", schema::COMPANIES.columns);
        let users: Vec<_> = schema::USERS
            .columns
            .iter()
            .copied()
            .filter(|c| *c != "permissions")
            .collect();
        let tables = [companies, table("users", &users)];
        assert_eq!(
            column_drift(&tables).as_deref(),
            Some("users is missing columns permissions")
        );

        let complete = [
            table("companies", schema::COMPANIES.columns),
            table("users", schema::USERS.columns),
            table("countries", &["id"]),
        ];
        assert_eq!(column_drift(&complete), None);
    }

    #[tokio::test]
    async fn test_missing_database_url_aborts_before_connecting() {
        let (outcome, out) = run_with(&[("SERVICE_NAME", "auth-test")]).await;
        match outcome {
            CheckOutcome::Aborted { stage, .. } => assert_eq!(stage, Stage::CheckingEnv),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(out.contains("DATABASE_URL: not set"));
        assert!(out.contains("❌ DATABASE_URL is not set"));
        assert!(!out.contains(Stage::ProbingConnection.title()));
    }

    #[tokio::test]
    async fn test_invalid_ssl_mode_aborts_in_env_check() {
        let (outcome, _) = run_with(&[
            ("DATABASE_URL", "postgres://app:pw@127.0.0.1:1/auth"),
            ("DATABASE_SSL_MODE", "bogus"),
        ])
        .await;
        assert!(matches!(
            outcome,
            CheckOutcome::Aborted { stage: Stage::CheckingEnv, .. }
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host_reports_failure() {
        let (outcome, out) = run_with(&[
            ("DATABASE_URL", "postgres://app:pw@127.0.0.1:1/auth"),
            ("DATABASE_SSL_MODE", "disable"),
        ])
        .await;
        match outcome {
            CheckOutcome::Aborted { stage, reason } => {
                assert_eq!(stage, Stage::ProbingConnection);
                assert!(reason.contains("127.0.0.1:1/auth"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(out.contains("❌ Could not connect to 127.0.0.1:1/auth"));
        assert!(!out.contains("pw@"));
    }
}
