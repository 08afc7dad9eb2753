use anyhow::{Context, Result};
use colored::Colorize;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use pyedit_config::IdeConfig;
use pyedit_core::{CheckWorker, DiagnosticsClient, EditorSession, Pylint};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// Watches the directory holding one file. Editors often save by writing a
/// temp file and renaming it over the original, so the file itself can't be watched.
struct FileWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
}

impl FileWatcher {
    fn new(dir: &Path) -> notify::Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;
        watcher.watch(dir, RecursiveMode::NonRecursive)?;
        Ok(Self {
            _watcher: watcher,
            rx,
        })
    }

    async fn next_event(&mut self) -> Option<Event> {
        loop {
            match self.rx.recv().await? {
                Ok(event) => return Some(event),
                Err(e) => tracing::warn!("File watcher error: {e}"),
            }
        }
    }
}

pub async fn run(config: &IdeConfig, file: PathBuf) -> Result<()> {
    let file = file
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", file.display()))?;
    let dir = file
        .parent()
        .context("Failed to get file directory")?
        .to_path_buf();

    let mut session = EditorSession::from_config(config);
    let id = session.open(&file, Instant::now())?;

    let client = Arc::new(DiagnosticsClient::new(Pylint::from_config(config)));
    let (worker, mut results) = CheckWorker::new(client);
    let mut watcher = FileWatcher::new(&dir).context("Failed to start file watcher")?;

    println!(
        "{} {} (quiet interval {:?}, Ctrl-C to stop)",
        "Watching".green().bold(),
        file.display(),
        config.lint.quiet_interval()
    );

    loop {
        let deadline = session.next_deadline();

        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,

            event = watcher.next_event() => {
                let Some(event) = event else { break };
                if !is_change_to(&event, &file) {
                    continue;
                }
                // Our own pre-check saves come back here too; only real changes count
                let Ok(text) = fs::read_to_string(&file) else { continue };
                if session.buffer(id).is_some_and(|buffer| buffer.text() != text) {
                    tracing::debug!("{} changed on disk", file.display());
                    session.edit(id, Instant::now(), |buffer| buffer.set_text(text))?;
                }
            }

            () = sleep_until(deadline), if deadline.is_some() => {
                for request in session.poll(Instant::now()) {
                    let _handle = worker.submit(request);
                }
            }

            Some(completed) = results.recv() => {
                if session.complete_check(completed, Instant::now()) {
                    let summary = session.summary(id).unwrap_or_default();
                    println!("\n{}", format!("── {} ──", file.display()).bold());
                    if summary.is_empty() {
                        println!("{}", "✓ No issues found!".green());
                    } else {
                        print!("{summary}");
                    }
                }
            }
        }
    }

    // Flushes the buffer like closing an editor tab
    session.close(id)?;
    Ok(())
}

fn is_change_to(event: &Event, file: &Path) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_)
    ) && event.paths.iter().any(|path| path == file)
}

async fn sleep_until(deadline: Option<Instant>) {
    if let Some(deadline) = deadline {
        tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
    }
}
