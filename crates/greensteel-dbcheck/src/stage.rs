//! Stages of a check run and how a run ends.
//!
//! A run walks the stages strictly in order. Any stage may abort the run; nothing ever
//! moves back to an earlier stage.

use std::fmt;

use crate::workflow::SeedSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CheckingEnv,
    ProbingConnection,
    MaterializingSchema,
    Introspecting,
    SeedingAndVerifying,
    Reporting,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::CheckingEnv,
        Stage::ProbingConnection,
        Stage::MaterializingSchema,
        Stage::Introspecting,
        Stage::SeedingAndVerifying,
        Stage::Reporting,
    ];

    /// The stage that follows on success, `None` after reporting.
    pub fn next(self) -> Option<Stage> {
        let idx = Self::ALL.iter().position(|s| *s == self)?;
        Self::ALL.get(idx + 1).copied()
    }

    /// 1-based position, used for console section numbers.
    pub fn number(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).map_or(0, |i| i + 1)
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::CheckingEnv => "Checking environment",
            Self::ProbingConnection => "Testing database connection",
            Self::MaterializingSchema => "Creating tables",
            Self::Introspecting => "Inspecting tables",
            Self::SeedingAndVerifying => "Seeding and verifying test data",
            Self::Reporting => "Final data check",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// How a check run ended.
#[derive(Debug)]
pub enum CheckOutcome {
    Passed(SeedSummary),
    Aborted { stage: Stage, reason: String },
}

impl CheckOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Passed(_))
    }

    pub fn aborted(stage: Stage, reason: impl Into<String>) -> Self {
        Self::Aborted {
            stage,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stages_run_forward_only() {
        let mut stage = Stage::CheckingEnv;
        let mut seen = vec![stage];
        while let Some(next) = stage.next() {
            assert!(next.number() > stage.number());
            seen.push(next);
            stage = next;
        }
        assert_eq!(seen, Stage::ALL);
        assert_eq!(Stage::Reporting.next(), None);
    }

    #[test]
    fn test_numbers_are_one_based() {
        assert_eq!(Stage::CheckingEnv.number(), 1);
        assert_eq!(Stage::Reporting.number(), 6);
    }

    #[test]
    fn test_aborted_is_failure() {
        let outcome = CheckOutcome::aborted(Stage::ProbingConnection, "refused");
        assert!(!outcome.is_success());
    }
}
