//! # dbcheck-runner
//!
//! Runs `dbcheck` in a child process, relays its output, and exits 0 only if it passed.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use greensteel_common::config::AppConfig;
use greensteel_dbcheck::{console::Console, runner};

#[derive(Parser)]
#[command(name = "dbcheck-runner", version, about = "Run dbcheck isolated and report pass/fail")]
struct Cli {
    /// dbcheck executable to run (default: the one next to this binary)
    #[arg(long)]
    program: Option<PathBuf>,

    /// Config file passed through to dbcheck
    #[arg(long, env = "DBCHECK_CONFIG")]
    config: Option<String>,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    greensteel_dbcheck::init_tracing();

    let mut console = Console::stdout();
    let passed = run(&cli, &config, &mut console);

    console.line_break();
    if passed {
        console.ok("Database check passed.");
        console.ok("PostgreSQL is ready for the registration flow.");
        Ok(ExitCode::SUCCESS)
    } else {
        console.fail("Database check failed.");
        console.info("Check the environment variables and the database connection.");
        Ok(ExitCode::FAILURE)
    }
}

fn run(cli: &Cli, config: &AppConfig, console: &mut Console) -> bool {
    console.banner("🚀 Running database check");

    let settings = match config.database() {
        Ok(settings) => settings,
        Err(e) => {
            console.fail(&e.to_string());
            console.info("Set DATABASE_URL to the PostgreSQL connection string.");
            return false;
        }
    };
    console.ok(&format!("DATABASE_URL: {}", settings.redacted()));

    let program = match &cli.program {
        Some(program) => program.clone(),
        None => match runner::default_program() {
            Ok(program) => program,
            Err(e) => {
                console.fail(&format!("Cannot locate dbcheck: {e}"));
                return false;
            }
        },
    };

    let mut args = Vec::new();
    if let Some(path) = &cli.config {
        // The child runs in its own directory.
        let path = std::fs::canonicalize(path).unwrap_or_else(|_| PathBuf::from(path));
        args.push("--config".to_string());
        args.push(path.display().to_string());
    }

    runner::run_and_relay(&program, &args, console)
}
