//! Keystroke coalescing.
//!
//! [`Debouncer`] is a two-state machine with no timers of its own: the caller
//! passes the current [`Instant`] in and sleeps until [`Debouncer::deadline`].
//! Only the last query typed within a quiet window is ever fired.

use std::time::Duration;

use tokio::time::Instant;

/// Debouncer state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebounceState {
    /// Nothing is scheduled.
    Idle,
    /// `query` fires at `deadline` unless more input arrives first.
    Pending { query: String, deadline: Instant },
}

/// What an input did to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// A search is scheduled for the quiet window after this input.
    Scheduled,
    /// The input was blank; any pending search was cancelled.
    Cleared,
}

/// Coalesces search-box input into at most one query per quiet window.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    state: DebounceState,
}

impl Debouncer {
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            state: DebounceState::Idle,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &DebounceState {
        &self.state
    }

    /// Record the full search-box text at `now`.
    ///
    /// Non-blank text restarts the quiet window with the trimmed text as the
    /// pending query. Blank text cancels whatever was pending.
    pub fn on_input(&mut self, text: &str, now: Instant) -> InputOutcome {
        let query = text.trim();
        if query.is_empty() {
            self.state = DebounceState::Idle;
            return InputOutcome::Cleared;
        }

        self.state = DebounceState::Pending {
            query: query.to_string(),
            deadline: now + self.window,
        };
        InputOutcome::Scheduled
    }

    /// When the pending query fires, if one is pending.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        match &self.state {
            DebounceState::Idle => None,
            DebounceState::Pending { deadline, .. } => Some(*deadline),
        }
    }

    /// Take the pending query if its deadline has passed, returning to idle.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.state {
            DebounceState::Pending { deadline, .. } if *deadline <= now => {
                match std::mem::replace(&mut self.state, DebounceState::Idle) {
                    DebounceState::Pending { query, .. } => Some(query),
                    DebounceState::Idle => None,
                }
            }
            _ => None,
        }
    }
}
