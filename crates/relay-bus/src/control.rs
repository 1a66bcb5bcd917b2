//! # Control Token
//!
//! Per-run handle coordinating cancellation and pause/resume of one
//! scheduler loop.
//!
//! State lives in a `tokio::sync::watch` channel: the loop waits on changes
//! instead of polling, so a resume wakes it immediately and a new pause
//! replaces a pending delayed resume.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};

/// Pause state of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseState {
    /// Ticks run normally.
    NotPaused,
    /// Paused until the deadline, then resumed automatically.
    PausedUntil(Instant),
    /// Paused until [`ControlToken::resume`].
    PausedIndefinitely,
}

#[derive(Debug, Clone, Copy)]
struct ControlState {
    cancelled: bool,
    pause: PauseState,
}

/// Cancellation and pause handle for one scheduler run.
///
/// Cloning shares the same state. Cancellation is one-way.
#[derive(Debug, Clone)]
pub struct ControlToken {
    state: Arc<watch::Sender<ControlState>>,
}

impl ControlToken {
    /// Create a running, unpaused token.
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(ControlState {
            cancelled: false,
            pause: PauseState::NotPaused,
        });
        Self {
            state: Arc::new(state),
        }
    }

    /// Request cancellation. Irreversible.
    pub fn cancel(&self) {
        self.state.send_if_modified(|state| {
            let changed = !state.cancelled;
            state.cancelled = true;
            changed
        });
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state.borrow().cancelled
    }

    /// Pause for `delay`, or until resumed when `None`.
    ///
    /// Replaces any earlier pause, including a pending delayed resume. A
    /// delay too large to represent as a deadline pauses indefinitely.
    pub fn pause(&self, delay: Option<Duration>) {
        let pause = delay
            .and_then(|delay| Instant::now().checked_add(delay))
            .map_or(PauseState::PausedIndefinitely, PauseState::PausedUntil);
        self.state.send_modify(|state| state.pause = pause);
    }

    /// Clear any pause. No effect when not paused.
    pub fn resume(&self) {
        self.state.send_if_modified(|state| {
            let changed = state.pause != PauseState::NotPaused;
            state.pause = PauseState::NotPaused;
            changed
        });
    }

    /// Current pause state; an elapsed delayed pause reads as not paused.
    #[must_use]
    pub fn pause_state(&self) -> PauseState {
        match self.state.borrow().pause {
            PauseState::PausedUntil(deadline) if deadline <= Instant::now() => {
                PauseState::NotPaused
            }
            pause => pause,
        }
    }

    /// Whether a pause is in effect.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.pause_state() != PauseState::NotPaused
    }

    /// Complete once cancellation is requested.
    pub async fn cancelled(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|state| state.cancelled).await;
    }

    /// Suspend while paused.
    ///
    /// Returns `true` when the loop may proceed and `false` when the token
    /// was cancelled, before or during the pause. A delayed pause whose
    /// deadline passes is cleared here, exactly once.
    pub async fn wait_while_paused(&self) -> bool {
        let mut rx = self.state.subscribe();

        loop {
            let state = *rx.borrow_and_update();
            if state.cancelled {
                return false;
            }

            match state.pause {
                PauseState::NotPaused => return true,
                PauseState::PausedUntil(deadline) => {
                    tokio::select! {
                        () = sleep_until(deadline) => self.expire_pause(deadline),
                        changed = rx.changed() => {
                            if changed.is_err() {
                                return false;
                            }
                        }
                    }
                }
                PauseState::PausedIndefinitely => {
                    if rx.changed().await.is_err() {
                        return false;
                    }
                }
            }
        }
    }

    /// Resume only if the pause with `deadline` is still the active one.
    fn expire_pause(&self, deadline: Instant) {
        self.state.send_if_modified(|state| {
            if state.pause == PauseState::PausedUntil(deadline) {
                state.pause = PauseState::NotPaused;
                true
            } else {
                false
            }
        });
    }
}

impl Default for ControlToken {
    fn default() -> Self {
        Self::new()
    }
}
