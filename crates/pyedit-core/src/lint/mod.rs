//! File-based linting.
//!
//! The linter reads the file from disk, not the in-memory buffer, so callers must
//! flush the buffer first. A run spawns a process and can take seconds; it is only
//! ever triggered through the change debouncer.

mod pylint;
mod summary;

pub use pylint::{parse_report, Pylint};
pub use summary::{summarize, summary_line};

use crate::Diagnostic;
use std::path::Path;

/// Raw outcome of one linter invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintRun {
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
}

/// The black-box linter service
pub trait Linter: Send + Sync {
    fn run(&self, path: &Path) -> anyhow::Result<LintRun>;
}

/// What a linter exit status means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitClass {
    Clean,
    FindingsPresent,
    ToolFailure,
}

impl ExitClass {
    /// Pylint encodes message categories as bits 1..=16 of the exit status; bit 32
    /// is a usage error and anything outside the mask is a crash.
    #[must_use]
    pub const fn classify(exit_code: Option<i32>) -> Self {
        match exit_code {
            Some(0) => Self::Clean,
            Some(1..=31) => Self::FindingsPresent,
            _ => Self::ToolFailure,
        }
    }
}

/// Runs the linter and turns its report into [`Diagnostic`]s, never failing
pub struct DiagnosticsClient<L> {
    linter: L,
}

impl<L: Linter> DiagnosticsClient<L> {
    #[must_use]
    pub const fn new(linter: L) -> Self {
        Self { linter }
    }

    #[must_use]
    pub const fn linter(&self) -> &L {
        &self.linter
    }

    /// Lint the file at `file_path` as currently saved.
    ///
    /// Tool failures are logged and whatever could be parsed is returned.
    #[must_use]
    pub fn check(&self, file_path: &Path) -> Vec<Diagnostic> {
        tracing::debug!("Linting {}", file_path.display());

        let run = match self.linter.run(file_path) {
            Ok(run) => run,
            Err(e) => {
                tracing::warn!("Linter could not run on {}: {e:#}", file_path.display());
                return Vec::new();
            }
        };

        if ExitClass::classify(run.exit_code) == ExitClass::ToolFailure {
            tracing::warn!(
                "Linter exited abnormally ({:?}) on {}",
                run.exit_code,
                file_path.display()
            );
        }

        match parse_report(&run.stdout) {
            Ok(diagnostics) => {
                tracing::info!(
                    "Lint of {} finished with {} finding(s)",
                    file_path.display(),
                    diagnostics.len()
                );
                diagnostics
            }
            Err(e) => {
                tracing::warn!("Could not read linter report for {}: {e:#}", file_path.display());
                Vec::new()
            }
        }
    }
}
