//! Settle-once completion primitive.
//!
//! A [`Deferred`] is the producer half: whoever holds it may settle the
//! outcome exactly once. The paired [`TaskHandle`] is the consumer half and
//! resolves when the outcome is recorded. The worker pool, the serial queue
//! and the detached deadline guard all hand a `TaskHandle` back to callers.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use parking_lot::Mutex;
use tokio::sync::oneshot;

use super::TaskError;

/// Outcome recorded on a [`Deferred`].
pub type Outcome<T, E> = Result<T, TaskError<E>>;

/// Manually settled completion source.
///
/// Clones share the same slot; whichever clone settles first wins and every
/// later call is a no-op returning `false`.
pub struct Deferred<T, E> {
    slot: Arc<Mutex<Option<oneshot::Sender<Outcome<T, E>>>>>,
}

impl<T, E> Clone for Deferred<T, E> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T, E> Deferred<T, E> {
    /// Create a pending deferred together with the handle that observes it.
    #[must_use]
    pub fn new() -> (Self, TaskHandle<T, E>) {
        let (tx, rx) = oneshot::channel();
        let deferred = Self {
            slot: Arc::new(Mutex::new(Some(tx))),
        };
        (deferred, TaskHandle { rx })
    }

    /// Settle with a success value. Returns `false` if already settled.
    pub fn resolve(&self, value: T) -> bool {
        self.settle(Ok(value))
    }

    /// Settle with the task's own error. Returns `false` if already settled.
    pub fn reject(&self, error: E) -> bool {
        self.settle(Err(TaskError::Failed(error)))
    }

    /// Settle with an arbitrary outcome. Returns `false` if already settled.
    pub fn settle(&self, outcome: Outcome<T, E>) -> bool {
        let Some(tx) = self.slot.lock().take() else {
            return false;
        };
        // The handle may be gone already; an unobserved outcome is dropped.
        let _ = tx.send(outcome);
        true
    }

    /// Whether an outcome has been recorded.
    pub fn is_settled(&self) -> bool {
        self.slot.lock().is_none()
    }
}

/// Consumer half of a [`Deferred`]; resolves to the recorded outcome.
///
/// If every clone of the deferred is dropped without settling, the handle
/// resolves to [`TaskError::Abandoned`]. Dropping the handle itself is always
/// safe: the producer simply discards the outcome.
#[must_use = "a task handle does nothing unless awaited"]
pub struct TaskHandle<T, E> {
    rx: oneshot::Receiver<Outcome<T, E>>,
}

impl<T, E> TaskHandle<T, E> {
    /// Build a handle that is already settled with `outcome`.
    pub fn settled(outcome: Outcome<T, E>) -> Self {
        let (deferred, handle) = Deferred::new();
        deferred.settle(outcome);
        handle
    }

    /// Take the outcome if it is available, without waiting.
    ///
    /// Returns `None` while the task is still pending. Once the outcome has
    /// been taken, further calls report [`TaskError::Abandoned`].
    pub fn try_outcome(&mut self) -> Option<Outcome<T, E>> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(TaskError::Abandoned)),
        }
    }
}

impl<T, E> Future for TaskHandle<T, E> {
    type Output = Outcome<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(TaskError::Abandoned)))
    }
}
