use crate::lint::{DiagnosticsClient, Linter};
use crate::session::{CheckCompleted, CheckRequest};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Runs lint checks on tokio's blocking pool and reports back over a channel.
///
/// The receiving end belongs to whoever owns the [`EditorSession`](crate::EditorSession);
/// results are fed to [`complete_check`](crate::EditorSession::complete_check), which
/// drops the stale ones. Checks are never cancelled once submitted.
pub struct CheckWorker<L> {
    client: Arc<DiagnosticsClient<L>>,
    results: mpsc::UnboundedSender<CheckCompleted>,
}

impl<L: Linter + 'static> CheckWorker<L> {
    #[must_use]
    pub fn new(
        client: Arc<DiagnosticsClient<L>>,
    ) -> (Self, mpsc::UnboundedReceiver<CheckCompleted>) {
        let (results, rx) = mpsc::unbounded_channel();
        (Self { client, results }, rx)
    }

    /// Start a check. Must be called from within a tokio runtime.
    ///
    /// A linter that panics is treated like one that failed to run: the check
    /// completes with no findings so the buffer can be checked again.
    pub fn submit(&self, request: CheckRequest) -> JoinHandle<()> {
        let client = Arc::clone(&self.client);
        let results = self.results.clone();

        tokio::task::spawn_blocking(move || {
            let checked = panic::catch_unwind(AssertUnwindSafe(|| client.check(&request.path)));
            let diagnostics = checked.unwrap_or_else(|_| {
                tracing::error!("Linter panicked on {}", request.path.display());
                Vec::new()
            });
            let buffer = request.buffer;
            if results.send(request.complete(diagnostics)).is_err() {
                tracing::debug!("Session is gone, dropping check for buffer {buffer}");
            }
        })
    }
}
