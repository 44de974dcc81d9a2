//! Configuration models for pools and retry policies.

pub mod pool;

pub use pool::{ExecutorConfig, PoolConfig, RetryConfig, ENV_PREFIX};
