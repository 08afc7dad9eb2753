use crate::Diagnostic;
use std::time::{Duration, Instant};

/// Timer state of one buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    Pending { deadline: Instant },
}

/// What to do with a finished check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Same findings as last time: leave the indicators alone
    Unchanged,
    /// New findings: repaint. The timer has been re-armed.
    Changed,
}

/// Gates linter runs behind a quiet interval.
///
/// Time is passed in by the caller, so the debouncer never sleeps and can be driven
/// deterministically from tests. Every change pushes the deadline out to
/// `now + quiet_interval`; [`poll_due`](Self::poll_due) reports when it has passed.
#[derive(Debug, Clone)]
pub struct ChangeDebouncer {
    quiet_interval: Duration,
    state: DebounceState,
    last_fired: Option<Vec<Diagnostic>>,
}

impl ChangeDebouncer {
    #[must_use]
    pub const fn new(quiet_interval: Duration) -> Self {
        Self {
            quiet_interval,
            state: DebounceState::Idle,
            last_fired: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> DebounceState {
        self.state
    }

    #[must_use]
    pub const fn quiet_interval(&self) -> Duration {
        self.quiet_interval
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.state, DebounceState::Pending { .. })
    }

    /// Findings of the last check that changed the indicators
    #[must_use]
    pub fn last_fired(&self) -> Option<&[Diagnostic]> {
        self.last_fired.as_deref()
    }

    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        match self.state {
            DebounceState::Idle => None,
            DebounceState::Pending { deadline } => Some(deadline),
        }
    }

    /// Restart the quiet interval from `now`
    pub fn notify_change(&mut self, now: Instant) {
        self.state = DebounceState::Pending {
            deadline: now + self.quiet_interval,
        };
    }

    pub fn cancel(&mut self) {
        self.state = DebounceState::Idle;
    }

    /// Whether the timer has fired. Firing returns the debouncer to `Idle`.
    pub fn poll_due(&mut self, now: Instant) -> bool {
        match self.state {
            DebounceState::Pending { deadline } if now >= deadline => {
                self.state = DebounceState::Idle;
                true
            }
            _ => false,
        }
    }

    /// Compare a check result against the last one that fired.
    ///
    /// A changed result is stored and re-arms the timer, so checking continues
    /// periodically until the findings settle.
    pub fn record(&mut self, diagnostics: &[Diagnostic], now: Instant) -> CheckOutcome {
        if self.last_fired.as_deref() == Some(diagnostics) {
            return CheckOutcome::Unchanged;
        }
        self.last_fired = Some(diagnostics.to_vec());
        self.notify_change(now);
        CheckOutcome::Changed
    }

    /// Forget the last result so the next check always repaints
    pub fn reset(&mut self) {
        self.last_fired = None;
    }
}
