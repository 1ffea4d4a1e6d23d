//! Human-readable progress output.
//!
//! The check's console output is its product: it is what an operator reads during a
//! deployment and what the runner relays. Diagnostics go to `tracing` on stderr instead.

use std::io::{self, Write};

const RULE_WIDTH: usize = 60;

/// Line-oriented writer for check progress. Every line is written immediately.
pub struct Console<W: Write = io::Stdout> {
    out: W,
}

impl Console<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn line(&mut self, text: &str) {
        // Write errors are ignored: a closed stdout is not a check failure.
        let _ = writeln!(self.out, "{text}");
        let _ = self.out.flush();
    }

    pub fn line_break(&mut self) {
        self.line("");
    }

    pub fn rule(&mut self) {
        self.line(&"=".repeat(RULE_WIDTH));
    }

    /// Title followed by a rule.
    pub fn banner(&mut self, title: &str) {
        self.line(title);
        self.rule();
    }

    /// Numbered section header, preceded by a blank line.
    pub fn section(&mut self, number: usize, title: &str) {
        self.line_break();
        self.line(&format!("[{number}] {title}"));
    }

    pub fn ok(&mut self, msg: &str) {
        self.line(&format!("✅ {msg}"));
    }

    pub fn fail(&mut self, msg: &str) {
        self.line(&format!("❌ {msg}"));
    }

    pub fn warn(&mut self, msg: &str) {
        self.line(&format!("⚠️  {msg}"));
    }

    pub fn info(&mut self, msg: &str) {
        self.line(&format!("📋 {msg}"));
    }

    pub fn detail(&mut self, msg: &str) {
        self.line(&format!("   - {msg}"));
    }

    /// Write a block of text verbatim (used to relay child output).
    pub fn raw(&mut self, text: &str) {
        let _ = self.out.write_all(text.as_bytes());
        if !text.is_empty() && !text.ends_with('\n') {
            let _ = self.out.write_all(b"\n");
        }
        let _ = self.out.flush();
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut Console<Vec<u8>>)) -> String {
        let mut console = Console::new(Vec::new());
        f(&mut console);
        String::from_utf8(console.into_inner()).unwrap()
    }

    #[test]
    fn test_banner_and_markers() {
        let out = render(|c| {
            c.banner("dbcheck");
            c.ok("connected");
            c.fail("no tables");
            c.detail("email: ops@example.com");
        });
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "dbcheck");
        assert_eq!(lines[1].len(), RULE_WIDTH);
        assert_eq!(lines[2], "✅ connected");
        assert_eq!(lines[3], "❌ no tables");
        assert_eq!(lines[4], "   - email: ops@example.com");
    }

    #[test]
    fn test_section_starts_with_blank_line() {
        let out = render(|c| c.section(3, "Inspecting tables"));
        assert_eq!(out, "\n[3] Inspecting tables\n");
    }

    #[test]
    fn test_raw_terminates_last_line() {
        assert_eq!(render(|c| c.raw("a\nb")), "a\nb\n");
        assert_eq!(render(|c| c.raw("a\n")), "a\n");
        assert_eq!(render(|c| c.raw("")), "");
    }
}
