use crate::{Diagnostic, IndicatorStyle};
use std::fmt::Write;

/// One report line: marker, right-aligned code, message, symbol and location.
///
/// ```text
/// ❗️ E0602: Undefined variable 'value',undefined-variable(3:4~3:9)
/// ⚠️ C0114: Missing module docstring,missing-module-docstring(1)
/// ```
#[must_use]
pub fn summary_line(diagnostic: &Diagnostic) -> String {
    let marker = match diagnostic.indicator_style() {
        IndicatorStyle::Hard => "❗️",
        IndicatorStyle::Soft => "⚠️",
    };
    let start = diagnostic.range.start;
    let symbol = diagnostic.symbol.as_deref().unwrap_or("");

    let location = match diagnostic.range.end {
        Some(end) => format!("{}:{}~{}:{}", start.line, start.column, end.line, end.column),
        None => start.line.to_string(),
    };

    format!(
        "{marker}{:>6}: {},{symbol}({location})",
        diagnostic.code, diagnostic.message
    )
}

/// Full textual report for the diagnostics panel.
///
/// Unlike the underline layer, convention findings are listed here.
#[must_use]
pub fn summarize(diagnostics: &[Diagnostic]) -> String {
    diagnostics.iter().fold(String::new(), |mut out, diagnostic| {
        let _ = writeln!(out, "{}", summary_line(diagnostic));
        out
    })
}
