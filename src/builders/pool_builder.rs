//! Builders to construct worker pools and retry executors from configuration.

use std::collections::HashMap;

use tracing::debug;

use crate::config::ExecutorConfig;
use crate::core::{ConfigError, RetryExecutor, WorkerPool};

/// Build one independent worker pool per configured name.
///
/// Every pool gets its own clone of `spawner`; nothing is shared between
/// pools and the caller owns the returned map.
///
/// # Errors
///
/// The configuration's validation error.
pub fn build_pools<T, E, S>(
    cfg: &ExecutorConfig,
    spawner: &S,
) -> Result<HashMap<String, WorkerPool<T, E, S>>, ConfigError>
where
    S: Clone,
{
    cfg.validate()?;

    let mut pools = HashMap::with_capacity(cfg.pools.len());
    for (name, pool_cfg) in &cfg.pools {
        let pool = WorkerPool::from_config(pool_cfg, spawner.clone())?;
        debug!(pool = %name, concurrency = pool_cfg.concurrency, "built worker pool");
        pools.insert(name.clone(), pool);
    }
    Ok(pools)
}

/// Build the retry executor described by `cfg.retry`.
///
/// # Errors
///
/// [`ConfigError::Invalid`] for an invalid backoff multiplier.
pub fn build_retry_executor(cfg: &ExecutorConfig) -> Result<RetryExecutor, ConfigError> {
    RetryExecutor::new(cfg.retry.to_policy())
}
