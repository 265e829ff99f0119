// src/session/timer.rs

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Derived urgency of the countdown, for display purposes.
/// Warning at <= 20% of the allotted time remaining, critical at <= 10%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Normal,
    Warning,
    Critical,
}

/// Countdown for one exam attempt.
///
/// The remaining time is derived from a fixed deadline, so it decreases
/// monotonically and saturates at zero. A single background task sleeps
/// until the deadline and then runs the expiry future exactly once.
/// Cancelling (or dropping) the timer aborts that task, so no expiry can
/// fire into a session that has already been torn down.
pub struct ExamTimer {
    total: Duration,
    deadline: Instant,
    expiry_task: Option<JoinHandle<()>>,
}

impl ExamTimer {
    /// Starts the countdown and schedules `on_expiry` for the deadline.
    pub fn start<F>(total: Duration, on_expiry: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let deadline = Instant::now() + total;
        let expiry_task = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            on_expiry.await;
        });
        Self {
            total,
            deadline,
            expiry_task: Some(expiry_task),
        }
    }

    /// Time left before expiry. Never negative.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Remaining whole seconds, the granularity shown to clients.
    pub fn remaining_seconds(&self) -> u64 {
        self.remaining().as_secs()
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }

    pub fn phase(&self) -> TimerPhase {
        let total = self.total.as_secs_f64();
        if total <= 0.0 {
            return TimerPhase::Critical;
        }
        let ratio = self.remaining().as_secs_f64() / total;
        if ratio <= 0.10 {
            TimerPhase::Critical
        } else if ratio <= 0.20 {
            TimerPhase::Warning
        } else {
            TimerPhase::Normal
        }
    }

    /// Stops the countdown. The expiry future will not run after this
    /// returns (unless it is the caller itself, on the expiry path).
    pub fn cancel(&mut self) {
        if let Some(task) = self.expiry_task.take() {
            task.abort();
        }
    }
}

impl Drop for ExamTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
