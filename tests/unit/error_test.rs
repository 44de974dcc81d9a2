//! Tests for error types

use prometheus_task_core::core::{ConfigError, TaskError};
use std::time::Duration;

#[test]
fn test_failed_error() {
    let err: TaskError<String> = TaskError::Failed("connection reset".to_string());
    assert_eq!(format!("{}", err), "task failed: connection reset");
}

#[test]
fn test_timed_out_error() {
    let err: TaskError<String> = TaskError::TimedOut(Duration::from_millis(250));
    assert_eq!(format!("{}", err), "deadline of 250ms elapsed");
    assert!(err.is_timeout());
}

#[test]
fn test_retry_exhausted_error() {
    let err: TaskError<String> = TaskError::RetryExhausted {
        attempts: 4,
        last: "503".to_string(),
    };
    assert_eq!(format!("{}", err), "retries exhausted after 4 attempts: 503");
    assert_eq!(err.failure(), Some(&"503".to_string()));
}

#[test]
fn test_lifecycle_errors() {
    assert_eq!(
        format!("{}", TaskError::<String>::NotAccepting),
        "pool is not accepting new tasks"
    );
    assert_eq!(
        format!("{}", TaskError::<String>::Abandoned),
        "task was abandoned before settling"
    );
    assert_eq!(
        format!("{}", TaskError::<String>::Panicked("oops".into())),
        "task panicked: oops"
    );
}

#[test]
fn test_config_error() {
    let err = ConfigError::Invalid {
        field: "concurrency".to_string(),
        reason: "must be greater than 0".to_string(),
    };
    assert_eq!(format!("{}", err), "invalid `concurrency`: must be greater than 0");
}
