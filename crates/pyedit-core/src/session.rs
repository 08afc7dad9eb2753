//! Open buffers and their check cycle.
//!
//! The session is owned by the host's event loop. Each buffer carries its own
//! debouncer and indicator layers; lint checks are issued as [`CheckRequest`]s and
//! come back as [`CheckCompleted`], either inline through
//! [`EditorSession::run_due_checks`] or from a [`CheckWorker`](crate::CheckWorker).

use crate::annotations::AnnotationRenderer;
use crate::buffer::AnalysisBuffer;
use crate::debounce::{ChangeDebouncer, CheckOutcome};
use crate::lint::{summarize, DiagnosticsClient, Linter};
use crate::position::word_at;
use crate::{CoreError, Diagnostic, Result};
use pyedit_config::IdeConfig;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Identifies an open buffer for the lifetime of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BufferId(u64);

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A lint run the session wants performed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRequest {
    pub buffer: BufferId,
    /// Buffer generation the file was saved at
    pub generation: u64,
    pub path: PathBuf,
}

impl CheckRequest {
    #[must_use]
    pub fn complete(self, diagnostics: Vec<Diagnostic>) -> CheckCompleted {
        CheckCompleted {
            buffer: self.buffer,
            generation: self.generation,
            path: self.path,
            diagnostics,
        }
    }
}

/// Result of a [`CheckRequest`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckCompleted {
    pub buffer: BufferId,
    pub generation: u64,
    pub path: PathBuf,
    pub diagnostics: Vec<Diagnostic>,
}

struct OpenBuffer {
    buffer: AnalysisBuffer,
    debouncer: ChangeDebouncer,
    renderer: AnnotationRenderer,
    diagnostics: Vec<Diagnostic>,
    in_flight: bool,
}

pub struct EditorSession {
    buffers: BTreeMap<BufferId, OpenBuffer>,
    active: Option<BufferId>,
    next_id: u64,
    quiet_interval: Duration,
    lint_enabled: bool,
}

impl EditorSession {
    #[must_use]
    pub const fn new(quiet_interval: Duration) -> Self {
        Self {
            buffers: BTreeMap::new(),
            active: None,
            next_id: 0,
            quiet_interval,
            lint_enabled: true,
        }
    }

    #[must_use]
    pub fn from_config(config: &IdeConfig) -> Self {
        Self {
            lint_enabled: config.lint.enabled,
            ..Self::new(config.lint.quiet_interval())
        }
    }

    /// Load `path` from disk into a new buffer and focus it
    pub fn open(&mut self, path: impl Into<PathBuf>, now: Instant) -> Result<BufferId> {
        let buffer = AnalysisBuffer::load(path)?;
        Ok(self.open_buffer(buffer, now))
    }

    /// Adopt an already built buffer and focus it
    pub fn open_buffer(&mut self, buffer: AnalysisBuffer, now: Instant) -> BufferId {
        let id = BufferId(self.next_id);
        self.next_id += 1;

        tracing::info!("Opened {} as buffer {id}", buffer.path().display());
        self.buffers.insert(
            id,
            OpenBuffer {
                buffer,
                debouncer: ChangeDebouncer::new(self.quiet_interval),
                renderer: AnnotationRenderer::new(),
                diagnostics: Vec::new(),
                in_flight: false,
            },
        );

        let previous = self.active.replace(id);
        if let Some(previous) = previous.and_then(|prev| self.buffers.get_mut(&prev)) {
            previous.debouncer.cancel();
        }
        // Freshly opened buffers are checked once the quiet interval passes
        self.arm(id, now);
        id
    }

    #[must_use]
    pub const fn active(&self) -> Option<BufferId> {
        self.active
    }

    pub fn buffer_ids(&self) -> impl Iterator<Item = BufferId> + '_ {
        self.buffers.keys().copied()
    }

    #[must_use]
    pub fn buffer(&self, id: BufferId) -> Option<&AnalysisBuffer> {
        self.buffers.get(&id).map(|open| &open.buffer)
    }

    #[must_use]
    pub fn find_by_path(&self, path: &Path) -> Option<BufferId> {
        self.buffers
            .iter()
            .find(|(_, open)| open.buffer.path() == path)
            .map(|(id, _)| *id)
    }

    #[must_use]
    pub fn renderer(&self, id: BufferId) -> Option<&AnnotationRenderer> {
        self.buffers.get(&id).map(|open| &open.renderer)
    }

    /// Findings of the last check applied to the buffer, conventions included
    #[must_use]
    pub fn diagnostics(&self, id: BufferId) -> Option<&[Diagnostic]> {
        self.buffers.get(&id).map(|open| open.diagnostics.as_slice())
    }

    #[must_use]
    pub fn summary(&self, id: BufferId) -> Option<String> {
        self.diagnostics(id).map(summarize)
    }

    #[must_use]
    pub fn is_check_in_flight(&self, id: BufferId) -> bool {
        self.buffers.get(&id).is_some_and(|open| open.in_flight)
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.buffers
            .values()
            .filter(|open| !open.in_flight)
            .filter_map(|open| open.debouncer.deadline())
            .min()
    }

    /// Mutate a buffer's text and restart its quiet interval.
    ///
    /// Painted findings keep their line and column until the next check replaces them.
    pub fn edit<T>(
        &mut self,
        id: BufferId,
        now: Instant,
        change: impl FnOnce(&mut AnalysisBuffer) -> Result<T>,
    ) -> Result<T> {
        let open = self.get_mut(id)?;
        let out = change(&mut open.buffer)?;
        open.renderer.clear_underline();
        // Painted offsets belong to the old text; re-anchor the findings by line and column
        if !open.renderer.annotations().is_empty() {
            open.renderer.apply(open.buffer.text(), &open.diagnostics);
        }
        self.arm(id, now);
        Ok(out)
    }

    /// Focus `id`. The previous buffer's timer stops and the new one restarts.
    pub fn activate(&mut self, id: BufferId, now: Instant) -> Result<()> {
        self.get_mut(id)?;
        if let Some(previous) = self.active.filter(|prev| *prev != id) {
            if let Some(open) = self.buffers.get_mut(&previous) {
                open.debouncer.cancel();
                open.renderer.clear_underline();
            }
        }
        self.active = Some(id);
        self.arm(id, now);
        Ok(())
    }

    /// Close a buffer, saving it first. A failed save is logged and the close proceeds.
    pub fn close(&mut self, id: BufferId) -> Result<AnalysisBuffer> {
        let mut open = self.buffers.remove(&id).ok_or(CoreError::UnknownBuffer(id))?;
        open.debouncer.cancel();
        if !open.buffer.is_read_only() {
            if let Err(e) = open.buffer.save() {
                tracing::warn!("Failed to save {} on close: {e}", open.buffer.path().display());
            }
        }
        if self.active == Some(id) {
            self.active = None;
        }
        tracing::info!("Closed buffer {id}");
        Ok(open.buffer)
    }

    /// Explicit save
    pub fn save(&self, id: BufferId) -> Result<()> {
        let open = self.buffers.get(&id).ok_or(CoreError::UnknownBuffer(id))?;
        open.buffer.save()?;
        Ok(())
    }

    /// Save-as. Findings for the old path are dropped.
    pub fn rename(&mut self, id: BufferId, path: impl Into<PathBuf>, now: Instant) -> Result<()> {
        let open = self.get_mut(id)?;
        open.buffer.set_path(path);
        open.diagnostics.clear();
        open.renderer.clear();
        open.debouncer.reset();
        self.arm(id, now);
        Ok(())
    }

    /// Underline the identifier under `offset`; clears the underline when there is none.
    pub fn hover(&mut self, id: BufferId, offset: usize) -> Result<Option<String>> {
        let open = self.get_mut(id)?;
        match word_at(open.buffer.text(), offset) {
            Some((start, end)) => {
                open.renderer.underline_word(start..end);
                Ok(Some(open.buffer.text()[start..end].to_string()))
            }
            None => {
                open.renderer.clear_underline();
                Ok(None)
            }
        }
    }

    pub fn clear_hover(&mut self, id: BufferId) -> Result<()> {
        self.get_mut(id)?.renderer.clear_underline();
        Ok(())
    }

    /// Collect the checks whose quiet interval has passed.
    ///
    /// Each buffer is saved first because the linter reads the file. A buffer whose
    /// previous check hasn't completed keeps its timer pending and is skipped.
    pub fn poll(&mut self, now: Instant) -> Vec<CheckRequest> {
        if !self.lint_enabled {
            return Vec::new();
        }

        let mut requests = Vec::new();
        for (id, open) in &mut self.buffers {
            if open.in_flight || !open.debouncer.poll_due(now) {
                continue;
            }
            if !open.buffer.is_read_only() {
                if let Err(e) = open.buffer.save() {
                    tracing::warn!(
                        "Failed to save {} before check: {e}",
                        open.buffer.path().display()
                    );
                }
            }
            open.in_flight = true;
            tracing::debug!(
                "Issuing check for buffer {id} at generation {}",
                open.buffer.generation()
            );
            requests.push(CheckRequest {
                buffer: *id,
                generation: open.buffer.generation(),
                path: open.buffer.path().to_path_buf(),
            });
        }
        requests
    }

    /// Apply a finished check. Returns whether the indicators were repainted.
    ///
    /// Results for a closed buffer, a renamed buffer or text that was edited since the
    /// check was issued are discarded.
    pub fn complete_check(&mut self, completed: CheckCompleted, now: Instant) -> bool {
        let Some(open) = self.buffers.get_mut(&completed.buffer) else {
            tracing::debug!("Discarding check for closed buffer {}", completed.buffer);
            return false;
        };
        open.in_flight = false;

        if open.buffer.path() != completed.path {
            tracing::debug!("Discarding check for buffer {}: path changed", completed.buffer);
            return false;
        }
        if open.buffer.generation() != completed.generation {
            tracing::debug!(
                "Discarding check for buffer {}: generation {} is now {}",
                completed.buffer,
                completed.generation,
                open.buffer.generation()
            );
            return false;
        }

        match open.debouncer.record(&completed.diagnostics, now) {
            CheckOutcome::Unchanged => false,
            CheckOutcome::Changed => {
                open.renderer.apply(open.buffer.text(), &completed.diagnostics);
                open.diagnostics = completed.diagnostics;
                true
            }
        }
    }

    /// Run every due check inline on the caller's thread. Returns how many repainted.
    pub fn run_due_checks<L: Linter>(
        &mut self,
        now: Instant,
        client: &DiagnosticsClient<L>,
    ) -> usize {
        let mut repainted = 0;
        for request in self.poll(now) {
            let diagnostics = client.check(&request.path);
            if self.complete_check(request.complete(diagnostics), now) {
                repainted += 1;
            }
        }
        repainted
    }

    fn arm(&mut self, id: BufferId, now: Instant) {
        if self.active != Some(id) {
            return;
        }
        if let Some(open) = self.buffers.get_mut(&id) {
            open.debouncer.notify_change(now);
        }
    }

    fn get_mut(&mut self, id: BufferId) -> Result<&mut OpenBuffer> {
        self.buffers.get_mut(&id).ok_or(CoreError::UnknownBuffer(id))
    }
}
