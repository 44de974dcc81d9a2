//! Tokio runtime spawner implementation.

use std::future::Future;
use std::sync::Arc;

use crate::core::Spawn;

/// Tokio-based spawner that executes tasks on a tokio runtime.
///
/// Either pinned to an explicit runtime handle, or "ambient": spawning onto
/// whichever runtime is current at the moment a task is admitted.
#[derive(Clone, Default)]
pub struct TokioSpawner {
    handle: Option<Arc<tokio::runtime::Handle>>,
}

impl TokioSpawner {
    /// Create a spawner bound to a specific runtime handle.
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self {
            handle: Some(Arc::new(handle)),
        }
    }

    /// Create a spawner that uses the runtime current at spawn time.
    pub const fn ambient() -> Self {
        Self { handle: None }
    }

    /// Bind to the runtime the caller is running on.
    ///
    /// # Errors
    ///
    /// Fails when called outside a tokio runtime.
    pub fn current() -> Result<Self, tokio::runtime::TryCurrentError> {
        tokio::runtime::Handle::try_current().map(Self::new)
    }

    /// Whether this spawner is pinned to an explicit runtime.
    pub const fn is_bound(&self) -> bool {
        self.handle.is_some()
    }
}

impl Spawn for TokioSpawner {
    /// # Panics
    ///
    /// An ambient spawner panics when used outside a tokio runtime.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match &self.handle {
            Some(handle) => {
                handle.spawn(fut);
            }
            None => {
                tokio::spawn(fut);
            }
        }
    }
}
