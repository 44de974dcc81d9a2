//! Bounded worker pool with FIFO admission.
//!
//! The pool admits tasks up to a concurrency ceiling and parks the rest in a
//! FIFO queue. Every time a running task settles, its slot is released and
//! the next queued task is admitted.
//!
//! # Guarantees
//!
//! - **Ceiling**: the running count never exceeds the ceiling. The
//!   check-increment-dequeue step happens under a single lock, so this holds
//!   on a multi-threaded runtime too.
//! - **Admission order**: queued tasks are admitted in submission order.
//!   Completion order is unconstrained.
//! - **Isolation**: a failing or panicking task settles only its own handle;
//!   dispatch continues.
//! - **No rescinding**: once submitted, a task always eventually runs, even
//!   after [`WorkerPool::close`] or after the pool value is dropped.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::num::NonZeroUsize;
//! use prometheus_task_core::core::WorkerPool;
//!
//! let pool = WorkerPool::<u32, String>::new(NonZeroUsize::new(4).unwrap());
//! let handle = pool.submit(|| async { Ok(42) });
//! assert_eq!(handle.await?, 42);
//! ```

use std::collections::VecDeque;
use std::future::Future;
use std::num::NonZeroUsize;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use super::deadline::race;
use super::deferred::{Deferred, Outcome, TaskHandle};
use super::{ConfigError, Spawn, TaskError};
use crate::config::PoolConfig;
use crate::runtime::TokioSpawner;
use crate::util::panic_message;

type BoxTask<T, E> = Box<dyn FnOnce() -> BoxFuture<'static, Result<T, E>> + Send>;

/// A submitted task paired with the completion source its caller observes.
struct QueueItem<T, E> {
    id: Uuid,
    task: BoxTask<T, E>,
    deferred: Deferred<T, E>,
}

struct PoolState<T, E> {
    running: usize,
    waiting: VecDeque<QueueItem<T, E>>,
    accepting: bool,
}

/// Statistics about pool utilization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Maximum tasks allowed to run at once.
    pub ceiling: usize,
    /// Tasks currently executing.
    pub running: usize,
    /// Tasks waiting for a free slot.
    pub queued: usize,
    /// Tasks accepted by `submit`.
    pub submitted: u64,
    /// Tasks that settled successfully.
    pub completed: u64,
    /// Tasks that settled with a failure, panic, or timeout.
    pub failed: u64,
    /// Submissions refused because the pool was closed.
    pub rejected: u64,
}

/// Lifetime counters (lock-free atomics).
#[derive(Debug, Default)]
struct PoolCounters {
    submitted: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    rejected: AtomicU64,
}

struct PoolShared<T, E> {
    ceiling: NonZeroUsize,
    task_timeout: Option<Duration>,
    state: Mutex<PoolState<T, E>>,
    counters: PoolCounters,
    /// Signalled whenever the pool drains to zero running and zero queued.
    drained: Notify,
}

impl<T, E> PoolShared<T, E> {
    fn is_idle(&self) -> bool {
        let state = self.state.lock();
        state.running == 0 && state.waiting.is_empty()
    }
}

/// Worker pool admitting tasks up to a concurrency ceiling.
///
/// Cloning yields another handle to the same pool.
pub struct WorkerPool<T, E, S = TokioSpawner> {
    shared: Arc<PoolShared<T, E>>,
    spawner: S,
}

impl<T, E, S: Clone> Clone for WorkerPool<T, E, S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            spawner: self.spawner.clone(),
        }
    }
}

impl<T, E> WorkerPool<T, E, TokioSpawner>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Create a pool that spawns onto the ambient tokio runtime.
    pub fn new(ceiling: NonZeroUsize) -> Self {
        Self::with_spawner(ceiling, TokioSpawner::ambient())
    }

    /// Run every task with at most `concurrency` in flight.
    ///
    /// Resolves with all values in submission order, or rejects with the
    /// first failure observed. Tasks still running or queued at that point
    /// keep going; their outcomes are simply not reported. A concurrency of
    /// zero is treated as one.
    ///
    /// # Errors
    ///
    /// The first [`TaskError`] produced by any task.
    pub async fn execute_all<I, F, Fut>(tasks: I, concurrency: usize) -> Result<Vec<T>, TaskError<E>>
    where
        I: IntoIterator<Item = F>,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let ceiling = NonZeroUsize::new(concurrency).unwrap_or_else(|| {
            warn!("execute_all called with concurrency 0, using 1");
            NonZeroUsize::MIN
        });
        let pool = Self::new(ceiling);
        let mut pending: FuturesUnordered<_> = tasks
            .into_iter()
            .enumerate()
            .map(|(index, task)| pool.submit(task).map(move |outcome| (index, outcome)))
            .collect();

        // Slots are filled in settlement order and read back in submission order.
        let mut slots: Vec<Option<T>> = Vec::new();
        slots.resize_with(pending.len(), || None);
        while let Some((index, outcome)) = pending.next().await {
            match outcome {
                Ok(value) => slots[index] = Some(value),
                Err(error) => {
                    debug!(index, remaining = pending.len(), "execute_all rejected on first failure");
                    return Err(error);
                }
            }
        }
        Ok(slots.into_iter().flatten().collect())
    }
}

impl<T, E, S> WorkerPool<T, E, S> {
    /// Create a pool that launches tasks through `spawner`.
    pub fn with_spawner(ceiling: NonZeroUsize, spawner: S) -> Self {
        Self::with_timeout(ceiling, None, spawner)
    }

    /// Create a pool whose tasks fail with [`TaskError::TimedOut`] once they
    /// run longer than `task_timeout`.
    ///
    /// A timed-out task is dropped at its next await point and its slot is
    /// released.
    pub fn with_timeout(ceiling: NonZeroUsize, task_timeout: Option<Duration>, spawner: S) -> Self {
        Self {
            shared: Arc::new(PoolShared {
                ceiling,
                task_timeout,
                state: Mutex::new(PoolState {
                    running: 0,
                    waiting: VecDeque::new(),
                    accepting: true,
                }),
                counters: PoolCounters::default(),
                drained: Notify::new(),
            }),
            spawner,
        }
    }

    /// Build a pool from configuration.
    ///
    /// # Errors
    ///
    /// Returns the configuration's validation error.
    pub fn from_config(cfg: &PoolConfig, spawner: S) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let ceiling = NonZeroUsize::new(cfg.concurrency)
            .ok_or_else(|| ConfigError::invalid("concurrency", "must be greater than 0"))?;
        let task_timeout = cfg.task_timeout_ms.map(Duration::from_millis);
        Ok(Self::with_timeout(ceiling, task_timeout, spawner))
    }

    /// Per-task timeout applied by this pool, if any.
    pub fn task_timeout(&self) -> Option<Duration> {
        self.shared.task_timeout
    }

    /// Maximum tasks allowed to run at once.
    pub fn ceiling(&self) -> usize {
        self.shared.ceiling.get()
    }

    /// Tasks currently executing.
    pub fn running(&self) -> usize {
        self.shared.state.lock().running
    }

    /// Tasks waiting for a free slot.
    pub fn queued(&self) -> usize {
        self.shared.state.lock().waiting.len()
    }

    /// True when nothing is running or queued.
    pub fn is_idle(&self) -> bool {
        self.shared.is_idle()
    }

    /// Whether `submit` still accepts new tasks.
    pub fn is_accepting(&self) -> bool {
        self.shared.state.lock().accepting
    }

    /// Stop accepting new tasks. Queued and running tasks still finish.
    pub fn close(&self) {
        self.shared.state.lock().accepting = false;
        debug!("pool closed to new submissions");
    }

    /// Snapshot of current statistics.
    pub fn stats(&self) -> PoolStats {
        let (running, queued) = {
            let state = self.shared.state.lock();
            (state.running, state.waiting.len())
        };
        let counters = &self.shared.counters;
        PoolStats {
            ceiling: self.shared.ceiling.get(),
            running,
            queued,
            submitted: counters.submitted.load(Ordering::Relaxed),
            completed: counters.completed.load(Ordering::Relaxed),
            failed: counters.failed.load(Ordering::Relaxed),
            rejected: counters.rejected.load(Ordering::Relaxed),
        }
    }

    /// Suspend until nothing is running and nothing is queued.
    ///
    /// Submissions made while waiting extend the wait.
    pub async fn wait_idle(&self) {
        loop {
            let drained = self.shared.drained.notified();
            tokio::pin!(drained);
            // Register before checking so a drain between the two is not missed.
            drained.as_mut().enable();
            if self.shared.is_idle() {
                return;
            }
            drained.await;
        }
    }
}

impl<T, E, S> WorkerPool<T, E, S>
where
    T: Send + 'static,
    E: Send + 'static,
    S: Spawn + Clone + Send + 'static,
{
    /// Submit a task; the returned handle settles when the task finishes.
    ///
    /// Never blocks. If the pool is closed the handle is already settled
    /// with [`TaskError::NotAccepting`].
    pub fn submit<F, Fut>(&self, task: F) -> TaskHandle<T, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let (deferred, handle) = Deferred::new();
        let id = Uuid::new_v4();

        let mut state = self.shared.state.lock();
        if !state.accepting {
            drop(state);
            self.shared.counters.rejected.fetch_add(1, Ordering::Relaxed);
            debug!(%id, "task rejected: pool closed");
            deferred.settle(Err(TaskError::NotAccepting));
            return handle;
        }
        state.waiting.push_back(QueueItem {
            id,
            task: Box::new(move || task().boxed()),
            deferred,
        });
        drop(state);

        self.shared.counters.submitted.fetch_add(1, Ordering::Relaxed);
        trace!(%id, "task queued");
        Self::dispatch(&self.shared, &self.spawner);
        handle
    }

    /// Admit queued tasks while slots are free.
    fn dispatch(shared: &Arc<PoolShared<T, E>>, spawner: &S) {
        let admitted: Vec<QueueItem<T, E>> = {
            let mut state = shared.state.lock();
            let mut admitted = Vec::new();
            while state.running < shared.ceiling.get() {
                let Some(item) = state.waiting.pop_front() else {
                    break;
                };
                state.running += 1;
                admitted.push(item);
            }
            admitted
        };

        for item in admitted {
            Self::start(Arc::clone(shared), spawner.clone(), item);
        }
    }

    fn start(shared: Arc<PoolShared<T, E>>, spawner: S, item: QueueItem<T, E>) {
        let QueueItem { id, task, deferred } = item;
        let next = spawner.clone();
        spawner.spawn(async move {
            trace!(%id, "task admitted");
            let run = AssertUnwindSafe(async move { task().await }).catch_unwind();
            let outcome = match shared.task_timeout {
                Some(limit) => match race(run, limit).await {
                    Some(caught) => flatten(caught),
                    None => {
                        warn!(%id, ?limit, "task exceeded pool timeout");
                        Err(TaskError::TimedOut(limit))
                    }
                },
                None => flatten(run.await),
            };
            Self::finish(&shared, &next, id, &deferred, outcome);
        });
    }

    /// Release the slot, settle the handle, then admit the next task.
    fn finish(
        shared: &Arc<PoolShared<T, E>>,
        spawner: &S,
        id: Uuid,
        deferred: &Deferred<T, E>,
        outcome: Outcome<T, E>,
    ) {
        shared.state.lock().running -= 1;

        match &outcome {
            Ok(_) => {
                shared.counters.completed.fetch_add(1, Ordering::Relaxed);
                trace!(%id, "task completed");
            }
            Err(TaskError::Panicked(reason)) => {
                shared.counters.failed.fetch_add(1, Ordering::Relaxed);
                warn!(%id, %reason, "task panicked");
            }
            Err(_) => {
                shared.counters.failed.fetch_add(1, Ordering::Relaxed);
                debug!(%id, "task failed");
            }
        }
        deferred.settle(outcome);

        Self::dispatch(shared, spawner);
        if shared.is_idle() {
            shared.drained.notify_waiters();
        }
    }
}

fn flatten<T, E>(caught: std::thread::Result<Result<T, E>>) -> Outcome<T, E> {
    match caught {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(TaskError::Failed(error)),
        Err(payload) => Err(TaskError::Panicked(panic_message(payload.as_ref()))),
    }
}
