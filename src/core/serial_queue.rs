//! Strictly ordered single-lane queue.
//!
//! A [`SerialQueue`] is a worker pool with its ceiling fixed at one: task
//! `n` starts only after task `n - 1` has finished, so both start and
//! completion order match submission order.

use std::future::Future;
use std::num::NonZeroUsize;

use super::deferred::TaskHandle;
use super::worker_pool::WorkerPool;
use super::Spawn;
use crate::runtime::TokioSpawner;

/// Single-lane FIFO task queue.
pub struct SerialQueue<T, E, S = TokioSpawner> {
    lane: WorkerPool<T, E, S>,
}

impl<T, E, S: Clone> Clone for SerialQueue<T, E, S> {
    fn clone(&self) -> Self {
        Self {
            lane: self.lane.clone(),
        }
    }
}

impl<T, E> SerialQueue<T, E, TokioSpawner>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Create a queue that runs tasks on the ambient tokio runtime.
    pub fn new() -> Self {
        Self::with_spawner(TokioSpawner::ambient())
    }
}

impl<T, E> Default for SerialQueue<T, E, TokioSpawner>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E, S> SerialQueue<T, E, S> {
    /// Create a queue that launches tasks through `spawner`.
    pub fn with_spawner(spawner: S) -> Self {
        Self {
            lane: WorkerPool::with_spawner(NonZeroUsize::MIN, spawner),
        }
    }

    /// True while a task is executing.
    pub fn is_processing(&self) -> bool {
        self.lane.running() > 0
    }

    /// Tasks waiting behind the one currently executing.
    pub fn pending(&self) -> usize {
        self.lane.queued()
    }

    /// Stop accepting new tasks. Already queued tasks still run.
    pub fn close(&self) {
        self.lane.close();
    }

    /// Suspend until the queue is empty and no task is processing.
    ///
    /// Tasks submitted while waiting are waited for as well; the call
    /// returns only once both conditions hold at the same instant.
    pub async fn wait_all(&self) {
        self.lane.wait_idle().await;
    }
}

impl<T, E, S> SerialQueue<T, E, S>
where
    T: Send + 'static,
    E: Send + 'static,
    S: Spawn + Clone + Send + 'static,
{
    /// Append a task; it runs after every previously submitted task.
    pub fn submit<F, Fut>(&self, task: F) -> TaskHandle<T, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.lane.submit(task)
    }
}
