//! Seed-and-verify workflow.
//!
//! Exercises one sign-up scenario end to end on a single session. Each step runs in its
//! own transaction and commits immediately, so a crash can leave partial fixture data;
//! the cleanup step removes it on the next run. A failing step's transaction is rolled
//! back when it is dropped.

use std::io::Write;

use greensteel_common::error::{DbCheckError, DbCheckResult};
use greensteel_common::models::company::{Company, NewCompany};
use greensteel_common::models::user::{NewUser, User};
use greensteel_common::permissions::PermissionFlags;
use greensteel_common::validation::validate_record;
use greensteel_db::repository::{companies, users};
use sqlx::{Connection, PgConnection};

use crate::console::Console;
use crate::fixtures::{FixtureSet, Registration};

const STEP_CLEANUP: &str = "cleanup";
const STEP_INSERT_COMPANY: &str = "insert_company";
const STEP_INSERT_USER: &str = "insert_user";
const STEP_LOOKUP: &str = "verify_lookup";
const STEP_RELATIONSHIP: &str = "verify_relationship";
const STEP_REGISTER: &str = "register";
const STEP_COUNT: &str = "count";

/// What a successful workflow produced.
#[derive(Debug, Clone)]
pub struct SeedSummary {
    pub primary_company: Company,
    pub primary_user: User,
    pub registered_company: Company,
    pub registered_user: User,
    pub total_companies: i64,
    pub total_users: i64,
}

/// Rows removed by the cleanup step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cleanup {
    pub users: u64,
    pub companies: u64,
}

/// Run the whole workflow on `conn`.
pub async fn seed_and_verify<W: Write>(
    conn: &mut PgConnection,
    fixtures: &FixtureSet,
    console: &mut Console<W>,
) -> DbCheckResult<SeedSummary> {
    let primary = &fixtures.primary;

    // 1. Idempotency guard for the primary pair.
    let removed = cleanup(conn, primary).await.map_err(at(STEP_CLEANUP))?;
    if removed != Cleanup::default() {
        console.info(&format!(
            "Removed previous test data ({} users, {} companies)",
            removed.users, removed.companies
        ));
    }

    // 2. Company.
    let company = insert_company(conn, &primary.company)
        .await
        .map_err(at(STEP_INSERT_COMPANY))?;
    console.ok(&format!("Company inserted: {}", company.company_id));

    // 3. User bound to the generated company id.
    let user = insert_user(conn, &primary.user_for(&company))
        .await
        .map_err(at(STEP_INSERT_USER))?;
    console.ok(&format!("User inserted: {}", user.username));

    // 4. Read both back by natural key.
    let (company, user) = verify_lookup(conn, &company, &user, console)
        .await
        .map_err(at(STEP_LOOKUP))?;

    // 5. user -> company.
    verify_relationship(conn, &user, &company, console)
        .await
        .map_err(at(STEP_RELATIONSHIP))?;

    // 6. A fresh registration, no cleanup beforehand.
    let (registered_company, registered_user) = register(conn, &fixtures.registration, console)
        .await
        .map_err(at(STEP_REGISTER))?;

    // 7. Totals.
    let total_companies = companies::count_companies(conn)
        .await
        .map_err(|e| at(STEP_COUNT)(e.into()))?;
    let total_users = users::count_users(conn)
        .await
        .map_err(|e| at(STEP_COUNT)(e.into()))?;

    Ok(SeedSummary {
        primary_company: company,
        primary_user: user,
        registered_company,
        registered_user,
        total_companies,
        total_users,
    })
}

/// Attribute an error to a workflow step. Step errors keep their message.
fn at(step: &'static str) -> impl Fn(DbCheckError) -> DbCheckError {
    move |e| match e {
        e @ DbCheckError::Workflow { .. } => e,
        other => {
            tracing::warn!(step, "Step failed, transaction rolled back: {other}");
            DbCheckError::workflow(step, other.to_string())
        }
    }
}

/// Delete the primary pair by natural key, including any user still attached to the
/// fixture company.
pub async fn cleanup(conn: &mut PgConnection, reg: &Registration) -> DbCheckResult<Cleanup> {
    let mut tx = conn.begin().await?;
    let mut removed = Cleanup {
        users: users::delete_by_username(&mut *tx, &reg.user.username).await?,
        companies: 0,
    };
    removed.users += users::delete_by_company_key(&mut *tx, &reg.company.company_id).await?;
    removed.companies = companies::delete_by_company_id(&mut *tx, &reg.company.company_id).await?;
    tx.commit().await?;

    tracing::debug!(users = removed.users, companies = removed.companies, "Cleanup committed");
    Ok(removed)
}

/// Validate and insert a company in its own transaction.
pub async fn insert_company(conn: &mut PgConnection, company: &NewCompany) -> DbCheckResult<Company> {
    validate_record(company)?;
    let mut tx = conn.begin().await?;
    let stored = companies::create_company(&mut *tx, company).await?;
    tx.commit().await?;
    tracing::info!(company_id = %stored.company_id, id = stored.id, "Company committed");
    Ok(stored)
}

/// Validate and insert a user in its own transaction.
pub async fn insert_user(conn: &mut PgConnection, user: &NewUser) -> DbCheckResult<User> {
    validate_record(user)?;
    let mut tx = conn.begin().await?;
    let stored = users::create_user(&mut *tx, user).await?;
    tx.commit().await?;
    tracing::info!(username = %stored.username, id = stored.id, "User committed");
    Ok(stored)
}

async fn verify_lookup<W: Write>(
    conn: &mut PgConnection,
    inserted_company: &Company,
    inserted_user: &User,
    console: &mut Console<W>,
) -> DbCheckResult<(Company, User)> {
    let company = companies::find_by_company_id(&mut *conn, &inserted_company.company_id)
        .await?
        .ok_or_else(|| {
            DbCheckError::workflow(
                STEP_LOOKUP,
                format!("company '{}' not found", inserted_company.company_id),
            )
        })?;
    if company.id != inserted_company.id {
        return Err(DbCheckError::workflow(
            STEP_LOOKUP,
            format!(
                "company '{}' resolved to id {} instead of {}",
                company.company_id, company.id, inserted_company.id
            ),
        ));
    }
    console.ok(&format!("Company found: {}", company.installation));
    console.detail(&format!(
        "email: {}",
        company.email.as_deref().unwrap_or("-")
    ));
    console.detail(&format!("address: {}", company.locality()));

    let user = users::find_by_username(&mut *conn, &inserted_user.username)
        .await?
        .ok_or_else(|| {
            DbCheckError::workflow(
                STEP_LOOKUP,
                format!("user '{}' not found", inserted_user.username),
            )
        })?;
    console.ok(&format!("User found: {}", user.full_name));
    console.detail(&format!("role: {}", user.role));
    console.detail(&format!("company admin: {}", user.is_company_admin));
    let flags = user.permission_flags();
    check_permission_document(&user, flags)?;
    console.detail(&format!("permissions: {}", user.permissions));

    Ok((company, user))
}

/// The JSON document must describe the same flags as the `can_*` columns.
fn check_permission_document(user: &User, flags: PermissionFlags) -> DbCheckResult<()> {
    let stored: PermissionFlags = serde_json::from_str(&user.permissions).map_err(|e| {
        DbCheckError::workflow(
            STEP_LOOKUP,
            format!("user '{}' has an unreadable permission document: {e}", user.username),
        )
    })?;
    if stored != flags {
        return Err(DbCheckError::workflow(
            STEP_LOOKUP,
            format!(
                "user '{}' permission document disagrees with its permission columns",
                user.username
            ),
        ));
    }
    Ok(())
}

async fn verify_relationship<W: Write>(
    conn: &mut PgConnection,
    user: &User,
    company: &Company,
    console: &mut Console<W>,
) -> DbCheckResult<()> {
    let resolved = companies::find_for_user(conn, user.id).await?.ok_or_else(|| {
        DbCheckError::workflow(
            STEP_RELATIONSHIP,
            format!("user '{}' has no company", user.username),
        )
    })?;

    if resolved.id != company.id {
        return Err(DbCheckError::workflow(
            STEP_RELATIONSHIP,
            format!(
                "user '{}' resolved to company id {} instead of {}",
                user.username, resolved.id, company.id
            ),
        ));
    }

    console.ok(&format!(
        "Relationship resolved: {} → {}",
        user.username, resolved.installation
    ));
    Ok(())
}

async fn register<W: Write>(
    conn: &mut PgConnection,
    reg: &Registration,
    console: &mut Console<W>,
) -> DbCheckResult<(Company, User)> {
    let company = insert_company(conn, &reg.company).await?;
    console.ok(&format!(
        "New company registered: {} ({})",
        company.installation, company.company_id
    ));

    let user = insert_user(conn, &reg.user_for(&company)).await?;
    console.ok(&format!(
        "New user registered: {} ({})",
        user.full_name, user.username
    ));

    Ok((company, user))
}
