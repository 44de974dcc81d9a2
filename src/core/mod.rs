//! Core task execution primitives: deferred handles, deadlines, retries,
//! bounded pools, serial queues, memoization, and lazy sequences.

pub mod deadline;
pub mod deferred;
pub mod error;
pub mod memo;
pub mod retry;
pub mod sequence;
pub mod serial_queue;
pub mod spawn;
pub mod worker_pool;

pub use deadline::{with_deadline, with_deadline_detached};
pub use deferred::{Deferred, Outcome, TaskHandle};
pub use error::{AppResult, ConfigError, TaskError};
pub use memo::MemoCache;
pub use retry::{RetryExecutor, RetryPolicy};
pub use sequence::{batch, delayed, from_collection};
pub use serial_queue::SerialQueue;
pub use spawn::Spawn;
pub use worker_pool::{PoolStats, WorkerPool};
