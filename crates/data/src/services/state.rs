//! Load sequencing and per-screen state.

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use routebill_shared::AppError;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct GateState {
    generation: u64,
    token: CancellationToken,
}

/// Orders the loads of one screen so that only the latest one lands.
///
/// Starting a load cancels the one before it. A load that finishes after a
/// newer one started is discarded instead of overwriting fresher data.
#[derive(Debug, Default)]
pub struct LoadGate {
    state: Mutex<GateState>,
}

/// Handle for one load started through a [`LoadGate`].
#[derive(Debug, Clone)]
pub struct LoadTicket {
    generation: u64,
    token: CancellationToken,
}

impl LoadTicket {
    /// Sequence number of the load.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns true once a newer load has started.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl LoadGate {
    /// Creates a gate with no load in flight.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a load, cancelling the previous one.
    pub fn begin(&self) -> LoadTicket {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.token.cancel();
        state.generation += 1;
        state.token = CancellationToken::new();
        LoadTicket {
            generation: state.generation,
            token: state.token.clone(),
        }
    }

    /// Returns true if `ticket` belongs to the latest load.
    #[must_use]
    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.generation == ticket.generation && !ticket.token.is_cancelled()
    }

    /// Runs `load` under a fresh ticket.
    ///
    /// Returns `None` when a newer load superseded this one, whether it was
    /// cancelled mid-flight or completed too late.
    pub async fn run<T, F>(&self, load: F) -> Option<Result<T, AppError>>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        let ticket = self.begin();
        let outcome = tokio::select! {
            biased;
            () = ticket.token.cancelled() => None,
            result = load => Some(result),
        };

        match outcome {
            Some(result) if self.is_current(&ticket) => Some(result),
            Some(_) => {
                warn!(
                    generation = ticket.generation,
                    "Discarding load that completed after a newer one started"
                );
                None
            }
            None => {
                debug!(generation = ticket.generation, "Load superseded");
                None
            }
        }
    }
}

/// Kind of a transient notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    /// An action succeeded.
    Success,
    /// A load or action failed.
    Error,
}

/// Transient message shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Success or error.
    pub kind: NoticeKind,
    /// Operator-facing text.
    pub message: String,
    /// Stable error code for errors.
    pub code: Option<&'static str>,
}

impl Notice {
    /// A success notice.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
            code: None,
        }
    }

    /// An error notice built from an application error.
    #[must_use]
    pub fn error(err: &AppError) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: err.user_message(),
            code: Some(err.error_code()),
        }
    }
}

/// What a screen currently shows.
///
/// Snapshots are replaced wholesale. A failed load or action leaves the
/// last good snapshot in place and records a notice instead.
#[derive(Debug, Clone)]
pub struct ScreenState<T> {
    snapshot: Option<T>,
    notice: Option<Notice>,
}

impl<T> Default for ScreenState<T> {
    fn default() -> Self {
        Self {
            snapshot: None,
            notice: None,
        }
    }
}

impl<T> ScreenState<T> {
    /// Creates an empty screen.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies the outcome of a load.
    pub fn apply(&mut self, outcome: Result<T, AppError>) {
        match outcome {
            Ok(snapshot) => self.snapshot = Some(snapshot),
            Err(err) => {
                warn!(code = err.error_code(), error = %err, "Screen update failed");
                self.notice = Some(Notice::error(&err));
            }
        }
    }

    /// Applies the outcome of an action, with a success message on success.
    pub fn apply_action(&mut self, outcome: Result<T, AppError>, success: &str) {
        let succeeded = outcome.is_ok();
        self.apply(outcome);
        if succeeded {
            self.notice = Some(Notice::success(success));
        }
    }

    /// The last good snapshot.
    #[must_use]
    pub const fn snapshot(&self) -> Option<&T> {
        self.snapshot.as_ref()
    }

    /// The pending notice.
    #[must_use]
    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Removes and returns the pending notice.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }
}
