//! # Prometheus Task Core
//!
//! Bounded-concurrency async task execution primitives for the Prometheus AI
//! Platform, built on tokio.
//!
//! The crate covers the coordination layer that sits between callers and
//! their async work: how many tasks may run at once, in which order they are
//! admitted, how long they may take, how often they are retried, and when a
//! previously computed result can be reused.
//!
//! ## Key Features
//!
//! - **Worker Pool**: admits tasks up to a ceiling and queues the rest in FIFO order
//! - **Serial Queue**: a single lane with strict start and completion order
//! - **Deadline Guard**: races a task against a timer; the timer wins ties
//! - **Retry Executor**: exponential backoff with a fixed retry budget
//! - **Memo Cache**: per-key async memoization with optional TTL
//! - **Lazy Sequences**: collection, paced, and batched streams
//!
//! Every component is an owned instance; there are no process-wide registries.
//! Each submission gets its own [`core::TaskHandle`], so a failure is observed
//! by the caller that submitted the task and never stops sibling tasks.
//!
//! ## WorkerPool
//!
//! ```rust,ignore
//! use std::num::NonZeroUsize;
//! use prometheus_task_core::core::{WorkerPool, TaskError};
//!
//! let pool = WorkerPool::<String, std::io::Error>::new(NonZeroUsize::new(4).unwrap());
//! let handle = pool.submit(|| async { Ok("done".to_string()) });
//! let value = handle.await?;
//!
//! // Or run a batch and stop at the first failure:
//! let values = WorkerPool::execute_all(jobs, 2).await?;
//! ```
//!
//! ## Retries and deadlines
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use prometheus_task_core::core::{with_deadline, RetryExecutor, RetryPolicy};
//!
//! let retry = RetryExecutor::new(RetryPolicy::default())?;
//! let body = retry
//!     .execute(|| with_deadline(|| fetch_model_card(), Duration::from_secs(2)))
//!     .await?;
//! ```
//!
//! For complete examples, see the integration tests under `tests/`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core task execution primitives.
pub mod core;
/// Configuration models for pools and retry policies.
pub mod config;
/// Builders to construct executor components from configuration.
pub mod builders;
/// Runtime adapters.
pub mod runtime;
/// Shared utilities.
pub mod util;
