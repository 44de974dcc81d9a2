//! Deadline guard: race a task against a timer.
//!
//! Whichever side finishes first decides the outcome. When both are ready in
//! the same poll the timer wins, so a deadline is never reported as met by a
//! task that only finished at the very instant it expired. A zero deadline
//! times out without polling the task at all.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinError;
use tracing::debug;

use super::TaskError;
use crate::util::panic_message;

/// Race `fut` against a timer of `limit`. `None` means the timer won.
pub(crate) async fn race<F: Future>(fut: F, limit: Duration) -> Option<F::Output> {
    if limit.is_zero() {
        return None;
    }
    tokio::select! {
        biased;
        () = tokio::time::sleep(limit) => None,
        output = fut => Some(output),
    }
}

/// Run `task`, failing with [`TaskError::TimedOut`] if it does not finish
/// within `duration`.
///
/// On timeout the task's future is dropped, so it stops at its next await
/// point and its eventual result is never observed. Use
/// [`with_deadline_detached`] when the work must keep running.
///
/// # Errors
///
/// [`TaskError::Failed`] with the task's error, or [`TaskError::TimedOut`].
pub async fn with_deadline<F, Fut, T, E>(task: F, duration: Duration) -> Result<T, TaskError<E>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    match race(task(), duration).await {
        Some(outcome) => outcome.map_err(TaskError::Failed),
        None => {
            debug!(?duration, "deadline elapsed before task finished");
            Err(TaskError::TimedOut(duration))
        }
    }
}

/// Like [`with_deadline`], but the task runs as its own spawned tokio task.
///
/// After a timeout the task keeps running to completion in the background;
/// only its result is ignored.
///
/// # Errors
///
/// [`TaskError::Failed`], [`TaskError::TimedOut`], [`TaskError::Panicked`]
/// if the spawned task panicked before the deadline, or
/// [`TaskError::Abandoned`] if the runtime cancelled it.
///
/// # Panics
///
/// Panics if called outside a tokio runtime.
pub async fn with_deadline_detached<F, Fut, T, E>(
    task: F,
    duration: Duration,
) -> Result<T, TaskError<E>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let join = tokio::spawn(task());
    match race(join, duration).await {
        Some(Ok(outcome)) => outcome.map_err(TaskError::Failed),
        Some(Err(join_error)) => Err(join_failure(join_error)),
        None => {
            debug!(?duration, "deadline elapsed; detached task left running");
            Err(TaskError::TimedOut(duration))
        }
    }
}

/// A panic keeps its message; a task cancelled by the runtime never settled.
fn join_failure<E>(join_error: JoinError) -> TaskError<E> {
    if join_error.is_panic() {
        TaskError::Panicked(panic_message(join_error.into_panic().as_ref()))
    } else {
        debug!("detached task cancelled by runtime");
        TaskError::Abandoned
    }
}
