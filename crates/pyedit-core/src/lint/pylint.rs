use super::{LintRun, Linter};
use crate::{Diagnostic, Position, Range, Severity};
use anyhow::Context;
use pyedit_config::IdeConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;

/// [`Linter`] that runs `pylint` as a module of the configured interpreter
#[derive(Debug, Clone)]
pub struct Pylint {
    interpreter: PathBuf,
    rcfile: Option<PathBuf>,
    extra_args: Vec<String>,
}

impl Pylint {
    #[must_use]
    pub fn new(interpreter: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            rcfile: None,
            extra_args: Vec::new(),
        }
    }

    #[must_use]
    pub fn from_config(config: &IdeConfig) -> Self {
        Self {
            interpreter: config.interpreter.clone(),
            rcfile: config.lint.rcfile.clone(),
            extra_args: config.lint.extra_args.clone(),
        }
    }

    #[must_use]
    pub fn with_rcfile(mut self, rcfile: impl Into<PathBuf>) -> Self {
        self.rcfile = Some(rcfile.into());
        self
    }

    fn command(&self, path: &Path) -> Command {
        let mut command = Command::new(&self.interpreter);
        command.args(["-m", "pylint", "--output-format=json"]);
        if let Some(rcfile) = &self.rcfile {
            command.arg(format!("--rcfile={}", rcfile.display()));
        }
        command.args(&self.extra_args).arg(path);
        command
    }
}

impl Linter for Pylint {
    fn run(&self, path: &Path) -> anyhow::Result<LintRun> {
        let output = self
            .command(path)
            .output()
            .with_context(|| format!("failed to start {}", self.interpreter.display()))?;

        Ok(LintRun {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}

/// One record of pylint's JSON reporter
#[derive(Debug, Deserialize)]
struct PylintMessage {
    #[serde(rename = "type")]
    kind: String,
    line: usize,
    column: usize,
    #[serde(rename = "endLine", default)]
    end_line: Option<usize>,
    #[serde(rename = "endColumn", default)]
    end_column: Option<usize>,
    #[serde(rename = "message-id")]
    message_id: String,
    message: String,
    #[serde(default)]
    symbol: Option<String>,
}

impl PylintMessage {
    fn severity(&self) -> Severity {
        match self.kind.as_str() {
            "convention" | "info" | "information" => Severity::Convention,
            "refactor" => Severity::Refactor,
            "warning" => Severity::Warning,
            "error" => Severity::Error,
            "fatal" => Severity::Fatal,
            _ => Severity::from_code(&self.message_id).unwrap_or(Severity::Warning),
        }
    }

    fn into_diagnostic(self) -> Diagnostic {
        let start = Position::new(self.line, self.column);
        let range = match self.end_column {
            Some(end_column) => Range::new(
                start,
                Position::new(self.end_line.unwrap_or(self.line), end_column),
            ),
            None => Range::point(start),
        };

        Diagnostic {
            severity: self.severity(),
            range,
            code: self.message_id,
            message: self.message,
            symbol: self.symbol,
        }
    }
}

/// Parse pylint's JSON report.
///
/// Malformed records are skipped so one odd entry doesn't hide the rest; only a
/// report that isn't a JSON array at all is an error. Empty output means no findings.
pub fn parse_report(output: &str) -> anyhow::Result<Vec<Diagnostic>> {
    if output.trim().is_empty() {
        return Ok(Vec::new());
    }

    let records: Vec<serde_json::Value> =
        serde_json::from_str(output).context("linter output is not a JSON array")?;

    Ok(records
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<PylintMessage>(record) {
            Ok(message) => Some(message.into_diagnostic()),
            Err(e) => {
                tracing::warn!("Skipping malformed linter record: {e}");
                None
            }
        })
        .collect())
}
