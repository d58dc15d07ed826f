//! Listener registry shared by every notifying container
//!
//! The registry owns the handlers subscribed to one container and delivers
//! each [`ChangeEvent`] to them in subscription order. It also carries the
//! pieces of bookkeeping every container needs around a mutation: a version
//! counter, a serialization lock so events leave in the order the mutations
//! happened, and batch mode.
//!
//! # Batch mode
//!
//! While a batch is open, dispatch only records that something changed. When
//! the outermost batch closes, listeners receive a single `Reset` and rebuild
//! from the container's contents. Batches nest.
//!
//! # Re-entrancy
//!
//! The serialization lock and the listener list are held while handlers run.
//! A handler must not mutate, or subscribe to, the container it observes.

use aura_mirror::{ChangeEvent, ChangeHandler, Result, SourceCollection};
use parking_lot::{Mutex, MutexGuard};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

#[derive(Debug, Default)]
struct BatchState {
    depth: usize,
    pending: bool,
}

/// Handlers registered on one container, plus the container's change bookkeeping.
pub struct ListenerRegistry<S> {
    listeners: Mutex<Vec<ChangeHandler<S>>>,
    batch: Mutex<BatchState>,
    serial: Mutex<()>,
    version: AtomicU64,
}

impl<S> Default for ListenerRegistry<S> {
    fn default() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
            batch: Mutex::new(BatchState::default()),
            serial: Mutex::new(()),
            version: AtomicU64::new(0),
        }
    }
}

impl<S> fmt::Debug for ListenerRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listener_count())
            .field("version", &self.version())
            .field("batching", &self.is_batching())
            .finish()
    }
}

impl<S> ListenerRegistry<S> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for every later event.
    pub fn subscribe(&self, handler: ChangeHandler<S>) {
        let mut listeners = self.listeners.lock();
        listeners.push(handler);
        trace!(listeners = listeners.len(), "listener subscribed");
    }

    /// Number of registered handlers.
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Number of events dispatched or deferred so far.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Whether a batch is currently open.
    pub fn is_batching(&self) -> bool {
        self.batch.lock().depth > 0
    }

    /// Serialize a mutation and its dispatch against other mutations.
    ///
    /// Containers hold the returned guard from before they touch storage
    /// until the matching dispatch returns.
    pub fn serialize(&self) -> MutexGuard<'_, ()> {
        self.serial.lock()
    }

    /// Deliver `event` to every handler, or defer it while a batch is open.
    ///
    /// Every handler sees the event even if an earlier one failed. The first
    /// failure is returned.
    pub fn dispatch(&self, event: &ChangeEvent<S>, source: &dyn SourceCollection<S>) -> Result<()> {
        self.version.fetch_add(1, Ordering::Release);
        {
            let mut batch = self.batch.lock();
            if batch.depth > 0 {
                batch.pending = true;
                trace!(kind = ?event.kind(), "event deferred by open batch");
                return Ok(());
            }
        }
        self.deliver(event, source)
    }

    /// Open a batch.
    pub fn begin_batch(&self) {
        let mut batch = self.batch.lock();
        batch.depth += 1;
        trace!(depth = batch.depth, "batch opened");
    }

    /// Close a batch. Closing the outermost batch after any deferred change
    /// delivers one `Reset`.
    pub fn end_batch(&self, source: &dyn SourceCollection<S>) -> Result<()> {
        // Held across the decision and the flush so no mutation slips between.
        let _serial = self.serialize();
        let flush = {
            let mut batch = self.batch.lock();
            batch.depth = batch.depth.saturating_sub(1);
            trace!(depth = batch.depth, "batch closed");
            batch.depth == 0 && std::mem::take(&mut batch.pending)
        };
        if !flush {
            return Ok(());
        }
        self.deliver(&ChangeEvent::reset(), source)
    }

    /// Run `body` inside a batch, closing it even if `body` fails.
    ///
    /// The body's error wins over an error raised while flushing.
    pub fn batch<R, F>(&self, source: &dyn SourceCollection<S>, body: F) -> Result<R>
    where
        F: FnOnce() -> Result<R>,
    {
        self.begin_batch();
        let outcome = body();
        let flushed = self.end_batch(source);
        let value = outcome?;
        flushed?;
        Ok(value)
    }

    fn deliver(&self, event: &ChangeEvent<S>, source: &dyn SourceCollection<S>) -> Result<()> {
        let mut listeners = self.listeners.lock();
        trace!(kind = ?event.kind(), listeners = listeners.len(), "dispatching change event");

        let mut first_error = None;
        for handler in listeners.iter_mut() {
            if let Err(err) = handler(event, source) {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_mirror::{ChangeKind, MirrorError};
    use std::sync::Arc;

    fn recorder(registry: &ListenerRegistry<i32>) -> Arc<Mutex<Vec<ChangeKind>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        registry.subscribe(Box::new(
            move |event: &ChangeEvent<i32>, _: &dyn SourceCollection<i32>| -> Result<()> {
                sink.lock().push(event.kind());
                Ok(())
            },
        ));
        seen
    }

    #[test]
    fn test_dispatch_reaches_every_listener() {
        let registry = ListenerRegistry::new();
        let first = recorder(&registry);
        let second = recorder(&registry);
        let source = vec![1];

        registry
            .dispatch(&ChangeEvent::added(Some(0), vec![1]), &source)
            .unwrap();
        assert_eq!(*first.lock(), vec![ChangeKind::Add]);
        assert_eq!(*second.lock(), vec![ChangeKind::Add]);
        assert_eq!(registry.version(), 1);
    }

    #[test]
    fn test_first_error_is_returned_after_full_delivery() {
        let registry = ListenerRegistry::new();
        registry.subscribe(Box::new(
            |_: &ChangeEvent<i32>, _: &dyn SourceCollection<i32>| -> Result<()> {
                Err(MirrorError::consistency("first"))
            },
        ));
        let seen = recorder(&registry);

        let err = registry
            .dispatch(&ChangeEvent::reset(), &Vec::<i32>::new())
            .unwrap_err();
        assert_eq!(err, MirrorError::consistency("first"));
        assert_eq!(*seen.lock(), vec![ChangeKind::Reset]);
    }

    #[test]
    fn test_batch_collapses_to_single_reset() {
        let registry = ListenerRegistry::new();
        let seen = recorder(&registry);
        let source = vec![1, 2, 3];

        registry
            .batch(&source, || {
                registry.dispatch(&ChangeEvent::added(Some(0), vec![1]), &source)?;
                registry.batch(&source, || {
                    registry.dispatch(&ChangeEvent::added(Some(1), vec![2]), &source)
                })?;
                registry.dispatch(&ChangeEvent::added(Some(2), vec![3]), &source)
            })
            .unwrap();

        assert_eq!(*seen.lock(), vec![ChangeKind::Reset]);
        assert!(!registry.is_batching());
        assert_eq!(registry.version(), 3);
    }

    #[test]
    fn test_batch_reset_precedes_racing_mutation() {
        let registry = ListenerRegistry::new();
        let seen = recorder(&registry);
        let source = vec![1, 2];

        registry.begin_batch();
        registry
            .dispatch(&ChangeEvent::added(Some(0), vec![1]), &source)
            .unwrap();

        std::thread::scope(|scope| {
            let serial = registry.serialize();
            let closer = scope.spawn(|| registry.end_batch(&source));
            std::thread::sleep(std::time::Duration::from_millis(50));
            // A mutation in flight when the batch closes stays inside it.
            registry
                .dispatch(&ChangeEvent::added(Some(1), vec![2]), &source)
                .unwrap();
            drop(serial);
            closer.join().unwrap().unwrap();
        });

        assert_eq!(*seen.lock(), vec![ChangeKind::Reset]);
        assert!(!registry.is_batching());
    }

    #[test]
    fn test_empty_batch_emits_nothing() {
        let registry = ListenerRegistry::new();
        let seen = recorder(&registry);
        registry.batch(&Vec::<i32>::new(), || Ok(())).unwrap();
        assert!(seen.lock().is_empty());
    }
}
