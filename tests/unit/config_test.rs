//! Tests for configuration validation

use prometheus_task_core::config::{ExecutorConfig, PoolConfig, RetryConfig};
use std::collections::HashMap;
use std::time::Duration;

/// Variable lookup backed by a fixed list instead of the process environment.
fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn test_pool_config_validation() {
    let valid = PoolConfig {
        concurrency: 4,
        task_timeout_ms: Some(1_000),
    };
    assert!(valid.validate().is_ok());
}

#[test]
fn test_pool_config_invalid_concurrency() {
    let invalid = PoolConfig {
        concurrency: 0,
        task_timeout_ms: None,
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_pool_config_invalid_timeout() {
    let invalid = PoolConfig {
        concurrency: 2,
        task_timeout_ms: Some(0),
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_pool_config_default_uses_cpu_count() {
    let cfg = PoolConfig::default();
    assert!(cfg.concurrency >= 1);
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_retry_config_to_policy() {
    let cfg = RetryConfig {
        max_retries: 5,
        initial_delay_ms: 20,
        backoff_multiplier: 1.5,
    };
    let policy = cfg.to_policy();
    assert_eq!(policy.max_retries, 5);
    assert_eq!(policy.initial_delay, Duration::from_millis(20));
    assert!((policy.backoff_multiplier - 1.5).abs() < f64::EPSILON);
}

#[test]
fn test_retry_config_invalid_multiplier() {
    let cfg = RetryConfig {
        backoff_multiplier: 0.9,
        ..RetryConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_executor_config_empty_pools() {
    let config = ExecutorConfig {
        pools: HashMap::new(),
        retry: RetryConfig::default(),
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_executor_config_names_offending_pool() {
    let mut config = ExecutorConfig::default();
    config.pools.insert(
        "inference".to_string(),
        PoolConfig {
            concurrency: 0,
            task_timeout_ms: None,
        },
    );
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("pools.inference.concurrency"));
}

#[test]
fn test_executor_config_from_json() {
    let json = r#"{
        "pools": {
            "inference": { "concurrency": 2, "task_timeout_ms": 30000 },
            "embedding": { "concurrency": 8 }
        },
        "retry": { "max_retries": 2, "initial_delay_ms": 50, "backoff_multiplier": 2.0 }
    }"#;

    let config = ExecutorConfig::from_json_str(json).unwrap();
    assert_eq!(config.pools.len(), 2);
    assert_eq!(config.pools["inference"].task_timeout_ms, Some(30_000));
    assert_eq!(config.pools["embedding"].concurrency, 8);
    assert_eq!(config.retry.max_retries, 2);
}

#[test]
fn test_executor_config_from_json_rejects_garbage() {
    assert!(ExecutorConfig::from_json_str("{ not json").is_err());
    assert!(ExecutorConfig::from_json_str(r#"{ "pools": {} }"#).is_err());
}

#[test]
fn test_executor_config_from_lookup() {
    let config = ExecutorConfig::from_lookup(lookup(&[
        ("TASK_CORE_CONCURRENCY", "3"),
        ("TASK_CORE_TASK_TIMEOUT_MS", " 1500 "),
        ("TASK_CORE_MAX_RETRIES", "7"),
        ("TASK_CORE_INITIAL_DELAY_MS", "25"),
        ("TASK_CORE_BACKOFF_MULTIPLIER", "1.5"),
    ]))
    .unwrap();

    let pool = &config.pools["default"];
    assert_eq!(pool.concurrency, 3);
    assert_eq!(pool.task_timeout_ms, Some(1_500));
    assert_eq!(config.retry.max_retries, 7);
    assert_eq!(config.retry.initial_delay_ms, 25);
}

#[test]
fn test_executor_config_from_lookup_defaults() {
    let config = ExecutorConfig::from_lookup(|_| None).unwrap();
    assert_eq!(config.pools.len(), 1);
    assert_eq!(config.retry, RetryConfig::default());
}

#[test]
fn test_executor_config_from_lookup_bad_value() {
    let err = ExecutorConfig::from_lookup(lookup(&[("TASK_CORE_CONCURRENCY", "many")])).unwrap_err();
    assert!(err.to_string().contains("TASK_CORE_CONCURRENCY"));

    assert!(ExecutorConfig::from_lookup(lookup(&[("TASK_CORE_CONCURRENCY", "0")])).is_err());
}
