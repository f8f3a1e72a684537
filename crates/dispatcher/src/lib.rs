//! Worker pool draining the node's single shared inbox.
//!
//! For every [`IncomeSignal`] popped off the inbox, the dispatcher first
//! offers it to every live [`ReactionRegistry`] predicate under one lock,
//! then looks up a static type → handler mapping and invokes the match on
//! a fresh task. Both steps always run, in that order, regardless of
//! whether a reaction consumed the signal — a handler that still has
//! interesting fallback behavior for a type (e.g. logging an
//! already-matched `ConnectionEstablished`) gets the chance to run.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use primitives::{IncomeSignal, SignalType};
use reaction::ReactionRegistry;
use telemetry::{debug, NodeMetrics};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

type HandlerFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// A type-specific protocol handler. Cloned into the handler map once at
/// startup; invoked on its own task per matching signal.
pub type Handler = Arc<dyn Fn(IncomeSignal) -> HandlerFuture + Send + Sync>;

/// The static `SignalType -> Handler` routing table the dispatcher
/// consults after the reaction pass.
pub type HandlerMap = HashMap<SignalType, Handler>;

/// Wraps an async closure as a [`Handler`] without the caller having to
/// spell out the boxed-future type.
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(IncomeSignal) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move |signal| Box::pin(f(signal)))
}

/// Drains the shared inbox across `workers_num` worker tasks, routing each
/// signal through the reaction registry and then the handler map.
pub struct Dispatcher {
    inbox: Mutex<mpsc::Receiver<IncomeSignal>>,
    reactions: Arc<ReactionRegistry>,
    handlers: HandlerMap,
    metrics: Arc<NodeMetrics>,
}

impl Dispatcher {
    pub fn new(
        inbox: mpsc::Receiver<IncomeSignal>,
        reactions: Arc<ReactionRegistry>,
        handlers: HandlerMap,
        metrics: Arc<NodeMetrics>,
    ) -> Arc<Self> {
        Arc::new(Self {
            inbox: Mutex::new(inbox),
            reactions,
            handlers,
            metrics,
        })
    }

    /// Spawns `workers_num` tasks, each looping `recv` on the shared inbox.
    /// The inbox is wrapped in an async mutex so only one worker pulls a
    /// signal off it at a time; processing a popped signal is otherwise
    /// fully concurrent across workers, since handlers run on their own
    /// spawned task.
    pub fn spawn_workers(self: &Arc<Self>, workers_num: usize) -> Vec<JoinHandle<()>> {
        (0..workers_num)
            .map(|worker_idx| {
                let dispatcher = self.clone();
                tokio::spawn(async move {
                    loop {
                        let signal = {
                            let mut inbox = dispatcher.inbox.lock().await;
                            inbox.recv().await
                        };
                        match signal {
                            Some(signal) => dispatcher.dispatch(signal).await,
                            None => {
                                debug!(worker_idx, "inbox closed, worker exiting");
                                break;
                            }
                        }
                    }
                })
            })
            .collect()
    }

    /// Runs the reaction pass, then routes to the static handler for
    /// `signal`'s type, if any is registered.
    async fn dispatch(&self, signal: IncomeSignal) {
        self.metrics.record_signal_dispatched();

        let matched = self.reactions.poll(&signal);
        if matched > 0 {
            self.metrics.record_reaction_matched();
        }

        let Some(handler) = self.handlers.get(&signal.signal_type()) else {
            debug!(signal_type = ?signal.signal_type(), "no handler registered for this signal type");
            return;
        };

        let handler = handler.clone();
        let metrics = self.metrics.clone();
        tokio::spawn(async move {
            metrics.record_handler_invoked();
            handler(signal).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use primitives::{MemberId, NetworkSignal};

    use super::*;

    fn id(c: char) -> MemberId {
        MemberId::new(c.to_string().repeat(52)).unwrap()
    }

    #[tokio::test]
    async fn dispatches_to_registered_handler() {
        let (inbox_tx, inbox_rx) = mpsc::channel(8);
        let reactions = Arc::new(ReactionRegistry::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();

        let mut handlers: HandlerMap = HashMap::new();
        handlers.insert(
            SignalType::Ping,
            handler(move |_signal| {
                let calls = calls_clone.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                }
            }),
        );

        let dispatcher = Dispatcher::new(inbox_rx, reactions, handlers, Arc::new(NodeMetrics::new()));
        let _workers = dispatcher.spawn_workers(1);

        inbox_tx
            .send(IncomeSignal::new(id('A'), NetworkSignal::new(SignalType::Ping, vec![])))
            .await
            .unwrap();

        tokio::time::timeout(Duration::from_secs(1), async {
            while calls.load(Ordering::SeqCst) == 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("handler should have run");
    }

    #[tokio::test]
    async fn unmapped_signal_type_is_dropped_without_panicking() {
        let (inbox_tx, inbox_rx) = mpsc::channel(8);
        let reactions = Arc::new(ReactionRegistry::new());
        let dispatcher = Dispatcher::new(inbox_rx, reactions, HashMap::new(), Arc::new(NodeMetrics::new()));
        let _workers = dispatcher.spawn_workers(1);

        inbox_tx
            .send(IncomeSignal::new(id('A'), NetworkSignal::new(SignalType::Pong, vec![])))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn reaction_pass_still_runs_handler_afterward() {
        let (inbox_tx, inbox_rx) = mpsc::channel(8);
        let reactions = Arc::new(ReactionRegistry::new());
        reactions.add(Duration::from_secs(1), |s| s.signal_type() == SignalType::Ping);

        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let mut handlers: HandlerMap = HashMap::new();
        handlers.insert(
            SignalType::Ping,
            handler(move |_signal| {
                let calls = calls_clone.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                }
            }),
        );

        let dispatcher = Dispatcher::new(inbox_rx, reactions.clone(), handlers, Arc::new(NodeMetrics::new()));
        let _workers = dispatcher.spawn_workers(1);

        inbox_tx
            .send(IncomeSignal::new(id('A'), NetworkSignal::new(SignalType::Ping, vec![])))
            .await
            .unwrap();

        tokio::time::timeout(Duration::from_secs(1), async {
            while calls.load(Ordering::SeqCst) == 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("handler should still run even though a reaction matched");

        assert!(reactions.is_empty());
    }
}
