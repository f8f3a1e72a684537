//! Teardown hook registry. Handlers and long-lived tasks register a hook at
//! setup time; `Lifecycle::teardown` runs every hook concurrently once, on
//! shutdown.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::Mutex;

use telemetry::debug;

type TeardownFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type TeardownHook = Box<dyn FnOnce() -> TeardownFuture + Send>;

/// Collects teardown hooks registered over a node's lifetime and runs them
/// all, concurrently, exactly once.
#[derive(Default)]
pub struct Lifecycle {
    hooks: Mutex<Vec<TeardownHook>>,
}

impl Lifecycle {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers a hook to run on [`Lifecycle::teardown`].
    pub async fn register<F, Fut>(&self, hook: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let boxed: TeardownHook = Box::new(move || Box::pin(hook()));
        self.hooks.lock().await.push(boxed);
    }

    /// Drains every registered hook and runs them all concurrently. Safe to
    /// call more than once: a second call simply has nothing left to run.
    pub async fn teardown(&self) {
        let hooks: Vec<TeardownHook> = std::mem::take(&mut *self.hooks.lock().await);
        debug!(count = hooks.len(), "running teardown hooks");
        let futures = hooks.into_iter().map(|hook| hook());
        futures::future::join_all(futures).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn runs_every_registered_hook() {
        let lifecycle = Lifecycle::new();
        let ran = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let ran = ran.clone();
            lifecycle
                .register(move || async move {
                    ran.fetch_add(1, Ordering::SeqCst);
                })
                .await;
        }

        lifecycle.teardown().await;
        assert_eq!(ran.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn second_teardown_is_a_no_op() {
        let lifecycle = Lifecycle::new();
        let ran = Arc::new(AtomicUsize::new(0));
        let ran_clone = ran.clone();
        lifecycle
            .register(move || async move {
                ran_clone.fetch_add(1, Ordering::SeqCst);
            })
            .await;

        lifecycle.teardown().await;
        lifecycle.teardown().await;

        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }
}
