//! In-process counters for the dispatcher and interaction table.
//!
//! The upstream node exports these through a dedicated metrics-collection
//! crate; that crate isn't part of this workspace, so counters are kept here
//! as plain atomics and surfaced through `tracing` events, which any
//! subscriber can turn into whatever metrics backend it likes.

use std::sync::atomic::{AtomicU64, Ordering};

/// Running counts for the signaling engine's hot paths. Cheap to clone
/// (internally `Arc`-free: every field is its own atomic, so a `&NodeMetrics`
/// can be shared across workers without additional synchronization).
#[derive(Debug, Default)]
pub struct NodeMetrics {
    signals_dispatched: AtomicU64,
    reactions_matched: AtomicU64,
    handlers_invoked: AtomicU64,
    peers_disconnected: AtomicU64,
    filter_rejections: AtomicU64,
}

impl NodeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_signal_dispatched(&self) {
        self.signals_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reaction_matched(&self) {
        self.reactions_matched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_handler_invoked(&self) {
        self.handlers_invoked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_peer_disconnected(&self) {
        self.peers_disconnected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_filter_rejection(&self) {
        self.filter_rejections.fetch_add(1, Ordering::Relaxed);
    }

    /// Emits a single `tracing` event with the current snapshot of every
    /// counter, suitable for periodic polling by a supervisor task.
    pub fn emit(&self) {
        tracing::info!(
            signals_dispatched = self.signals_dispatched.load(Ordering::Relaxed),
            reactions_matched = self.reactions_matched.load(Ordering::Relaxed),
            handlers_invoked = self.handlers_invoked.load(Ordering::Relaxed),
            peers_disconnected = self.peers_disconnected.load(Ordering::Relaxed),
            filter_rejections = self.filter_rejections.load(Ordering::Relaxed),
            "node metrics"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let metrics = NodeMetrics::new();
        assert_eq!(metrics.signals_dispatched.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn record_signal_dispatched_increments() {
        let metrics = NodeMetrics::new();
        metrics.record_signal_dispatched();
        metrics.record_signal_dispatched();
        assert_eq!(metrics.signals_dispatched.load(Ordering::Relaxed), 2);
    }
}
