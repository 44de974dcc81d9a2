//! Tests for builders

use prometheus_task_core::builders::{build_pools, build_retry_executor};
use prometheus_task_core::config::{ExecutorConfig, PoolConfig, RetryConfig};
use prometheus_task_core::core::WorkerPool;
use prometheus_task_core::runtime::TokioSpawner;
use std::collections::HashMap;

/// Two pools with distinct ceilings.
fn config() -> ExecutorConfig {
    let mut pools = HashMap::new();
    pools.insert(
        "inference".to_string(),
        PoolConfig {
            concurrency: 2,
            task_timeout_ms: Some(5_000),
        },
    );
    pools.insert(
        "embedding".to_string(),
        PoolConfig {
            concurrency: 6,
            task_timeout_ms: None,
        },
    );
    ExecutorConfig {
        pools,
        retry: RetryConfig {
            max_retries: 4,
            initial_delay_ms: 10,
            backoff_multiplier: 2.0,
        },
    }
}

#[test]
fn test_build_pools_from_config() {
    let pools: HashMap<String, WorkerPool<u32, String>> =
        build_pools(&config(), &TokioSpawner::ambient()).unwrap();
    assert_eq!(pools.len(), 2);
    assert_eq!(pools["inference"].ceiling(), 2);
    assert_eq!(pools["embedding"].ceiling(), 6);
    assert!(pools.values().all(WorkerPool::is_idle));
}

#[test]
fn test_build_pools_rejects_invalid_config() {
    let mut cfg = config();
    cfg.pools.get_mut("inference").unwrap().concurrency = 0;
    let built: Result<HashMap<String, WorkerPool<u32, String>>, _> =
        build_pools(&cfg, &TokioSpawner::ambient());
    assert!(built.is_err());
}

#[test]
fn test_build_retry_executor() {
    let executor = build_retry_executor(&config()).unwrap();
    assert_eq!(executor.policy().max_retries, 4);

    let mut cfg = config();
    cfg.retry.backoff_multiplier = 0.0;
    assert!(build_retry_executor(&cfg).is_err());
}

#[tokio::test]
async fn test_built_pools_are_independent() {
    let pools: HashMap<String, WorkerPool<&'static str, String>> =
        build_pools(&config(), &TokioSpawner::ambient()).unwrap();
    pools["inference"].close();

    let refused = pools["inference"].submit(|| async { Ok("inference") });
    let accepted = pools["embedding"].submit(|| async { Ok("embedding") });
    assert!(refused.await.is_err());
    assert_eq!(accepted.await, Ok("embedding"));
}
