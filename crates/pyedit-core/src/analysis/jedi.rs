use super::{AnalysisEngine, CompletionItem, EngineLocation, EngineSignature, Query};
use crate::position::{byte_to_char_column, char_to_byte_column, LineIndex};
use anyhow::{anyhow, bail, Context};
use pyedit_config::IdeConfig;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

const HELPER: &str = include_str!("jedi_helper.py");

/// [`AnalysisEngine`] backed by the `jedi` library.
///
/// Each query runs a small helper script under the configured interpreter, so the
/// engine sees the same packages the user's code does. The request goes in as JSON on
/// stdin and a single JSON answer comes back on stdout.
///
/// jedi counts columns in characters. Columns are converted on the way in and out so
/// callers keep working with byte columns.
#[derive(Debug, Clone)]
pub struct JediEngine {
    interpreter: PathBuf,
    timeout: Duration,
}

#[derive(Serialize)]
struct HelperRequest<'a> {
    op: &'static str,
    source: &'a str,
    path: &'a Path,
    line: usize,
    column: usize,
}

#[derive(Deserialize)]
struct HelperResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    error: Option<String>,
}

impl<'a> HelperRequest<'a> {
    fn new(op: &'static str, query: &Query<'a>) -> Self {
        let line = query.position.line;
        let column = LineIndex::new(query.source)
            .line_text(query.source, line)
            .map_or(query.position.column, |text| {
                byte_to_char_column(text, query.position.column)
            });

        Self {
            op,
            source: query.source,
            path: query.path,
            line,
            column,
        }
    }
}

/// Rewrite character columns from the engine as byte columns.
///
/// The reported line's own text is used when the engine sent it; hits in the query
/// file fall back to the query source.
fn to_byte_columns(query: &Query<'_>, mut locations: Vec<EngineLocation>) -> Vec<EngineLocation> {
    let index = LineIndex::new(query.source);
    for location in &mut locations {
        let from_query = || match (location.line, location.module_path.as_deref()) {
            (Some(line), Some(path)) if path == query.path => index.line_text(query.source, line),
            _ => None,
        };
        let text = location
            .code
            .as_deref()
            .map(|code| code.trim_end_matches(['\r', '\n']))
            .or_else(from_query);
        if let Some(text) = text {
            location.column = char_to_byte_column(text, location.column);
        }
    }
    locations
}

impl JediEngine {
    #[must_use]
    pub fn new(interpreter: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            interpreter: interpreter.into(),
            timeout,
        }
    }

    #[must_use]
    pub fn from_config(config: &IdeConfig) -> Self {
        Self::new(config.interpreter.clone(), config.analysis.timeout())
    }

    fn call<T: DeserializeOwned>(&self, op: &'static str, query: &Query<'_>) -> anyhow::Result<T> {
        let request = serde_json::to_vec(&HelperRequest::new(op, query))?;

        let mut child = Command::new(&self.interpreter)
            .arg("-c")
            .arg(HELPER)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("failed to start {}", self.interpreter.display()))?;

        {
            let mut stdin = child.stdin.take().context("helper stdin unavailable")?;
            stdin.write_all(&request)?;
        }

        let mut stdout = child.stdout.take().context("helper stdout unavailable")?;
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut output = String::new();
            let result = stdout.read_to_string(&mut output).map(|_| output);
            let _ = tx.send(result);
        });

        let Ok(output) = rx.recv_timeout(self.timeout) else {
            let _ = child.kill();
            let _ = child.wait();
            bail!("analysis helper timed out after {:?}", self.timeout);
        };
        let output = output.context("failed to read helper output")?;
        let status = child.wait()?;

        let response: HelperResponse<T> = serde_json::from_str(&output)
            .with_context(|| format!("unreadable helper output (exit status {status})"))?;

        if response.ok {
            response
                .result
                .ok_or_else(|| anyhow!("helper answered without a result"))
        } else {
            Err(anyhow!(response
                .error
                .unwrap_or_else(|| "unknown helper error".to_string())))
        }
    }
}

impl AnalysisEngine for JediEngine {
    fn goto(&self, query: &Query<'_>) -> anyhow::Result<Vec<EngineLocation>> {
        Ok(to_byte_columns(query, self.call("goto", query)?))
    }

    fn references(&self, query: &Query<'_>) -> anyhow::Result<Vec<EngineLocation>> {
        Ok(to_byte_columns(query, self.call("references", query)?))
    }

    fn signatures(&self, query: &Query<'_>) -> anyhow::Result<Vec<EngineSignature>> {
        self.call("signatures", query)
    }

    fn help(&self, query: &Query<'_>) -> anyhow::Result<Vec<String>> {
        self.call("help", query)
    }

    fn completions(&self, query: &Query<'_>) -> anyhow::Result<Vec<CompletionItem>> {
        self.call("complete", query)
    }
}
