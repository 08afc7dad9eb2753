use crate::{Position, Range};
use serde::{Deserialize, Serialize};

/// Diagnostic severity levels, in the linter's own vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Convention,
    Refactor,
    Warning,
    Error,
    Fatal,
}

impl Severity {
    /// Map a linter message id (`C0301`, `E0602`, ...) to a severity by its category letter.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.chars().next()? {
            'C' | 'I' => Some(Self::Convention),
            'R' => Some(Self::Refactor),
            'W' => Some(Self::Warning),
            'E' => Some(Self::Error),
            'F' => Some(Self::Fatal),
            _ => None,
        }
    }
}

/// How a diagnostic is drawn in the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndicatorStyle {
    /// Red squiggle
    Hard,
    /// Amber squiggle
    Soft,
}

impl IndicatorStyle {
    /// Colour hosts paint the squiggle with
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Hard => "red",
            Self::Soft => "#ffcc00",
        }
    }
}

/// A single linter finding
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,

    /// Range where the diagnostic applies
    pub range: Range,

    /// Linter message id, e.g. `E0602`
    pub code: String,

    pub message: String,

    /// Symbolic name of the message, e.g. `undefined-variable`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

impl Diagnostic {
    #[must_use]
    pub fn new(
        severity: Severity,
        range: Range,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            range,
            code: code.into(),
            message: message.into(),
            symbol: None,
        }
    }

    /// Point diagnostic with the severity derived from the code's category letter
    #[must_use]
    pub fn at(line: usize, column: usize, code: &str, message: impl Into<String>) -> Self {
        Self::new(
            Severity::from_code(code).unwrap_or(Severity::Warning),
            Range::point(Position::new(line, column)),
            code,
            message,
        )
    }

    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    #[must_use]
    pub fn with_end(mut self, end: Position) -> Self {
        self.range.end = Some(end);
        self
    }

    /// Whether the finding is drawn at all. Convention findings are too noisy to
    /// underline but still appear in the textual summary.
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        self.severity != Severity::Convention
    }

    /// Underline style for a rendered finding.
    ///
    /// This keys on the message id prefix rather than on `severity`: `E`/`F` codes are
    /// hard, everything else (refactor included) is soft. The two only disagree for
    /// engines whose codes don't follow pylint's category letters.
    #[must_use]
    pub fn indicator_style(&self) -> IndicatorStyle {
        if self.code.starts_with('E') || self.code.starts_with('F') {
            IndicatorStyle::Hard
        } else {
            IndicatorStyle::Soft
        }
    }
}
