//! Tests for runtime adapters

use prometheus_task_core::core::Spawn;
use prometheus_task_core::runtime::TokioSpawner;
use tokio::sync::oneshot;

#[test]
fn test_current_outside_runtime_fails() {
    assert!(TokioSpawner::current().is_err());
    assert!(!TokioSpawner::ambient().is_bound());
}

#[test]
fn test_bound_spawner_runs_on_its_runtime() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap();
    let spawner = TokioSpawner::new(runtime.handle().clone());
    assert!(spawner.is_bound());

    let (tx, rx) = oneshot::channel();
    spawner.spawn(async move {
        let _ = tx.send(21 * 2);
    });
    assert_eq!(runtime.block_on(rx).unwrap(), 42);
}

#[tokio::test]
async fn test_ambient_spawner_uses_current_runtime() {
    let (tx, rx) = oneshot::channel();
    TokioSpawner::default().spawn(async move {
        let _ = tx.send("spawned");
    });
    assert_eq!(rx.await.unwrap(), "spawned");
}
