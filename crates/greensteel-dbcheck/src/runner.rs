//! Subprocess runner for the check.
//!
//! Runs the `dbcheck` binary as a child process so a crash or a changed working directory
//! stays contained, then relays its output and reduces the result to pass/fail.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use greensteel_common::error::DbCheckError;

use crate::console::Console;

/// Captured result of one child run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Exit code, `None` if the child was killed by a signal.
    pub code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// The `dbcheck` executable installed next to the current one.
pub fn default_program() -> std::io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    Ok(exe.with_file_name(format!("dbcheck{}", std::env::consts::EXE_SUFFIX)))
}

/// Run `program` to completion with captured stdout/stderr.
///
/// A program given as a path runs inside its own directory; a bare name is looked up on
/// `PATH` and inherits the current directory.
pub fn run_isolated(program: &Path, args: &[String]) -> Result<RunOutput, DbCheckError> {
    let launch_err = |source| DbCheckError::Launch {
        program: program.display().to_string(),
        source,
    };

    let mut command = match program.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            let program = std::fs::canonicalize(program).map_err(launch_err)?;
            let mut command = Command::new(&program);
            if let Some(dir) = program.parent() {
                command.current_dir(dir);
            }
            command
        }
        _ => Command::new(program),
    };

    tracing::info!(program = %program.display(), ?args, "Launching check");
    let output = command.args(args).output().map_err(launch_err)?;

    Ok(RunOutput {
        code: output.status.code(),
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Relay captured output to the console and return whether the child passed.
pub fn relay<W: Write>(output: &RunOutput, console: &mut Console<W>) -> bool {
    console.raw(&output.stdout);
    if !output.stderr.trim().is_empty() {
        console.warn("Warnings/errors:");
        console.raw(&output.stderr);
    }
    if !output.success {
        match output.code {
            Some(code) => tracing::error!(code, "Check exited with failure"),
            None => tracing::error!("Check terminated by signal"),
        }
    }
    output.success
}

/// Launch, relay, reduce. Launch failures are reported and count as failure.
pub fn run_and_relay<W: Write>(program: &Path, args: &[String], console: &mut Console<W>) -> bool {
    match run_isolated(program, args) {
        Ok(output) => relay(&output, console),
        Err(e) => {
            tracing::error!(code = e.error_code(), "{e}");
            console.fail(&format!("Error while running the check: {e}"));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[test]
    fn test_zero_exit_is_success() {
        let out = run_isolated(Path::new("sh"), &sh("echo checked; echo note >&2")).unwrap();
        assert!(out.success);
        assert_eq!(out.code, Some(0));
        assert_eq!(out.stdout, "checked\n");
        assert_eq!(out.stderr, "note\n");
    }

    #[test]
    fn test_nonzero_exit_is_failure() {
        let out = run_isolated(Path::new("sh"), &sh("exit 3")).unwrap();
        assert!(!out.success);
        assert_eq!(out.code, Some(3));
    }

    #[test]
    fn test_missing_program_is_launch_error() {
        let err = run_isolated(Path::new("/nonexistent/dir/dbcheck"), &[]).unwrap_err();
        assert_eq!(err.error_code(), "LAUNCH_ERROR");
    }

    #[test]
    fn test_relay_prints_both_streams() {
        let out = RunOutput {
            code: Some(1),
            success: false,
            stdout: "❌ Could not connect\n".into(),
            stderr: "ERROR connection refused\n".into(),
        };
        let mut console = Console::new(Vec::new());
        assert!(!relay(&out, &mut console));
        let text = String::from_utf8(console.into_inner()).unwrap();
        assert_eq!(
            text,
            "❌ Could not connect\n⚠️  Warnings/errors:\nERROR connection refused\n"
        );
    }

    #[test]
    fn test_run_and_relay_reports_launch_failure() {
        let mut console = Console::new(Vec::new());
        assert!(!run_and_relay(
            Path::new("/nonexistent/dir/dbcheck"),
            &[],
            &mut console
        ));
        let text = String::from_utf8(console.into_inner()).unwrap();
        assert!(text.starts_with("❌ Error while running the check"));
    }

    #[test]
    fn test_path_program_runs_in_its_directory() {
        let program = Path::new("/bin/sh");
        let out = run_isolated(program, &sh("pwd -P")).unwrap();
        let canonical = std::fs::canonicalize(program).unwrap();
        let expected = canonical.parent().unwrap();
        assert_eq!(out.stdout.trim(), expected.display().to_string());
    }
}
