//! Source collections and their notification channel
//!
//! The synchronizer never depends on a concrete container. It reads the
//! current contents through [`SourceCollection`] and, when the source can
//! report its own mutations, registers a handler through [`ChangeNotifier`].
//!
//! The notifier passes itself to every handler call. Handlers therefore never
//! need to own a handle to the source they observe, which keeps the listener
//! registry free of reference cycles.

use crate::errors::Result;
use crate::event::ChangeEvent;
use std::collections::VecDeque;

/// Handler invoked once per source mutation.
///
/// The second argument is the source in its post-mutation state.
pub type ChangeHandler<S> =
    Box<dyn FnMut(&ChangeEvent<S>, &dyn SourceCollection<S>) -> Result<()> + Send>;

/// A sequence of items that may additionally report its own mutations.
pub trait SourceCollection<S> {
    /// Snapshot of the current contents, in source order.
    fn items(&self) -> Vec<S>;

    /// Number of items currently held.
    fn count(&self) -> usize {
        self.items().len()
    }

    /// The notification channel, for sources that have one.
    ///
    /// Sources returning `None` are mirrored once and never again.
    fn notifier(&self) -> Option<&dyn ChangeNotifier<S>> {
        None
    }
}

/// Capability to register handlers on a source's mutation stream.
pub trait ChangeNotifier<S> {
    /// Register `handler`. It fires for every later mutation, in order.
    fn subscribe(&self, handler: ChangeHandler<S>);
}

impl<S: Clone> SourceCollection<S> for Vec<S> {
    fn items(&self) -> Vec<S> {
        self.clone()
    }

    fn count(&self) -> usize {
        self.len()
    }
}

impl<S: Clone> SourceCollection<S> for [S] {
    fn items(&self) -> Vec<S> {
        self.to_vec()
    }

    fn count(&self) -> usize {
        self.len()
    }
}

impl<S: Clone> SourceCollection<S> for VecDeque<S> {
    fn items(&self) -> Vec<S> {
        self.iter().cloned().collect()
    }

    fn count(&self) -> usize {
        self.len()
    }
}
