use crate::{Location, OutputFormat};
use anyhow::{Context, Result};
use colored::Colorize;
use pyedit_config::IdeConfig;
use pyedit_core::{
    AnalysisBuffer, AnalysisCache, AnalysisClient, Host, JediEngine, NavigationController,
    NavigationError, NavigationIntent, Position,
};
use std::path::{Path, PathBuf};
use std::process;

fn client(config: &IdeConfig) -> AnalysisClient<JediEngine> {
    let client = AnalysisClient::new(JediEngine::from_config(config));
    if config.analysis.cache {
        client.with_cache(AnalysisCache::new())
    } else {
        client
    }
}

fn load(at: &Location) -> Result<AnalysisBuffer> {
    AnalysisBuffer::load(&at.file).with_context(|| format!("Failed to open {}", at.file.display()))
}

/// Host for a one-shot command: "opening" a file prints where the editor would land
struct PrintingHost {
    current: PathBuf,
    format: OutputFormat,
}

impl Host for PrintingHost {
    type Handle = PathBuf;

    fn open_and_focus(&mut self, path: &Path) -> Result<PathBuf, NavigationError> {
        self.current = path.to_path_buf();
        Ok(self.current.clone())
    }

    fn set_cursor(&mut self, handle: &PathBuf, position: Position) {
        match self.format {
            OutputFormat::Human => println!(
                "{}:{}:{}",
                handle.display().to_string().bold(),
                position.line,
                position.column
            ),
            OutputFormat::Json => println!(
                "{}",
                serde_json::json!({ "file": handle, "position": position })
            ),
        }
    }

    fn current_buffer_path(&self) -> Option<PathBuf> {
        Some(self.current.clone())
    }
}

pub fn definition(config: &IdeConfig, at: &Location) -> Result<()> {
    let buffer = load(at)?;
    let client = client(config);
    let mut controller = NavigationController::new(PrintingHost {
        current: buffer.path().to_path_buf(),
        format: at.format,
    });

    let position = Position::new(at.line, at.column);
    match controller.ctrl_click(&client, buffer.text(), position) {
        Ok(NavigationIntent::ShowReferenceMenu { hits }) => {
            // Nothing resolved; offer the usages like the editor's picker
            print_references(&hits, at.format);
        }
        Ok(NavigationIntent::Nothing) => {
            if matches!(at.format, OutputFormat::Human) {
                println!("{}", "No definition found".yellow());
            }
        }
        Ok(_) => {}
        Err(e) => {
            eprintln!("{} {e}", "✗".red());
            process::exit(1);
        }
    }

    Ok(())
}

pub fn references(config: &IdeConfig, at: &Location) -> Result<()> {
    let buffer = load(at)?;
    let hits = client(config).find_references(
        buffer.text(),
        buffer.path(),
        Position::new(at.line, at.column),
    );

    if hits.is_empty() && matches!(at.format, OutputFormat::Human) {
        println!("{}", "No references found".yellow());
    }
    print_references(&hits, at.format);
    Ok(())
}

fn print_references(hits: &[pyedit_core::ReferenceHit], format: OutputFormat) {
    for hit in hits {
        match format {
            OutputFormat::Human => println!("{}", hit.menu_label()),
            OutputFormat::Json => println!("{}", serde_json::json!(hit)),
        }
    }
}

pub fn hover(config: &IdeConfig, at: &Location) -> Result<()> {
    let buffer = load(at)?;
    let docs = client(config).get_hover_documentation(
        buffer.text(),
        buffer.path(),
        Position::new(at.line, at.column),
    );

    match (docs, at.format) {
        (Some(docs), OutputFormat::Human) => println!("{docs}"),
        (None, OutputFormat::Human) => println!("{}", "No documentation".yellow()),
        (docs, OutputFormat::Json) => println!("{}", serde_json::json!({ "documentation": docs })),
    }
    Ok(())
}

pub fn calltip(config: &IdeConfig, at: &Location) -> Result<()> {
    let buffer = load(at)?;
    let tips = client(config).get_call_tip(
        buffer.text(),
        buffer.path(),
        Position::new(at.line, at.column),
    );

    match at.format {
        OutputFormat::Human => {
            for tip in &tips {
                println!("{}", tip.cyan());
            }
        }
        OutputFormat::Json => println!("{}", serde_json::json!(tips)),
    }
    Ok(())
}

pub fn complete(config: &IdeConfig, at: &Location) -> Result<()> {
    let buffer = load(at)?;
    let items = client(config).get_completions(
        buffer.text(),
        buffer.path(),
        Position::new(at.line, at.column),
    );

    for item in &items {
        match at.format {
            OutputFormat::Human => match &item.kind {
                Some(kind) => println!("{} {}", item.label, kind.dimmed()),
                None => println!("{}", item.label),
            },
            OutputFormat::Json => println!("{}", serde_json::json!(item)),
        }
    }
    Ok(())
}
