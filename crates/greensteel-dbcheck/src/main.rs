//! # dbcheck
//!
//! Verifies the auth service database end to end: connection, table creation, schema
//! readback, and a seeded sign-up. Exits non-zero if any stage fails.

use std::process::ExitCode;

use clap::Parser;
use greensteel_common::config::AppConfig;
use greensteel_dbcheck::{check, console::Console};

#[derive(Parser)]
#[command(name = "dbcheck", version, about = "Verify the auth database before deploying")]
struct Cli {
    /// Config file to read instead of ./dbcheck.toml
    #[arg(long, env = "DBCHECK_CONFIG")]
    config: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load(cli.config.as_deref())?;

    greensteel_dbcheck::init_tracing();
    tracing::info!("🚀 dbcheck v{} for {}", env!("CARGO_PKG_VERSION"), config.service_name);

    let mut console = Console::stdout();
    let outcome = check::run(&config, &mut console).await?;

    if outcome.is_success() {
        console.line_break();
        console.ok("All checks passed.");
        console.info("The auth service can be deployed against this database.");
        Ok(ExitCode::SUCCESS)
    } else {
        console.line_break();
        console.fail("The database check failed.");
        console.info("Check the environment variables and the database connection.");
        Ok(ExitCode::FAILURE)
    }
}
