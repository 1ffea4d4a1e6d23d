//! # greensteel-dbcheck
//!
//! Deployment smoke test for the GreenSteel auth database. The `dbcheck` binary runs
//! the check itself; `dbcheck-runner` runs `dbcheck` as a child process and reduces its
//! result to pass/fail for a pipeline.

pub mod check;
pub mod console;
pub mod fixtures;
pub mod runner;
pub mod stage;
pub mod workflow;

use std::io::IsTerminal;

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_LOG_FILTER: &str =
    "greensteel_dbcheck=info,greensteel_db=info,dbcheck=info,dbcheck_runner=info,sqlx=warn";

/// Initialize tracing (structured logging) on stderr. stdout carries the report.
///
/// Colours are only used when stderr is a terminal, so captured child output stays plain.
pub fn init_tracing() {
    subscriber(std::io::stderr, std::io::stderr().is_terminal()).init();
}

fn subscriber<W>(writer: W, ansi: bool) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn emit(ansi: bool) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let sub = subscriber(move || writer.clone(), ansi);
        tracing::subscriber::with_default(sub, || {
            tracing::error!(target: "greensteel_dbcheck", "schema check failed");
        });
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_plain_output_has_no_escape_codes() {
        let out = emit(false);
        assert!(out.contains("schema check failed"));
        assert!(!out.contains('\x1b'));
    }

    #[test]
    fn test_terminal_output_is_coloured() {
        assert!(emit(true).contains('\x1b'));
    }
}
