//! ObservableVec<T> - A list that reports its own mutations
//!
//! Every mutating call updates storage, releases the storage lock, then
//! dispatches one [`ChangeEvent`] to the registered handlers. Errors raised by
//! a handler (for example a mirror that fell out of sync) are returned from
//! the mutating call itself.
//!
//! # Example
//!
//! ```rust,no_run
//! use aura_collections::ObservableVec;
//! use aura_mirror::{mirror, shared};
//!
//! # fn main() -> aura_mirror::Result<()> {
//! let source = ObservableVec::from(vec![1, 2, 3]);
//! let target = shared(Vec::new());
//! mirror(&source, target.clone())?;
//!
//! source.push(4)?;
//! assert_eq!(*target.read(), vec![1, 2, 3, 4]);
//! # Ok(())
//! # }
//! ```

use crate::registry::ListenerRegistry;
use aura_mirror::{
    ChangeEvent, ChangeHandler, ChangeNotifier, MirrorError, Result, SourceCollection,
};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

struct VecInner<T> {
    items: RwLock<Vec<T>>,
    listeners: ListenerRegistry<T>,
}

/// A shared, change-notifying list.
///
/// Cloning the handle shares the same storage and listeners.
pub struct ObservableVec<T> {
    inner: Arc<VecInner<T>>,
}

impl<T> Clone for ObservableVec<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for ObservableVec<T> {
    fn default() -> Self {
        Self::from(Vec::new())
    }
}

impl<T> From<Vec<T>> for ObservableVec<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            inner: Arc::new(VecInner {
                items: RwLock::new(items),
                listeners: ListenerRegistry::new(),
            }),
        }
    }
}

impl<T> FromIterator<T> for ObservableVec<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableVec")
            .field("items", &*self.inner.items.read())
            .field("listeners", &self.inner.listeners)
            .finish()
    }
}

fn out_of_range(index: usize, len: usize) -> MirrorError {
    MirrorError::invalid_argument(format!("index {index} out of range for length {len}"))
}

impl<T: Clone> ObservableVec<T> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.inner.items.read().len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.items.read().is_empty()
    }

    /// Copy of the item at `index`.
    pub fn get(&self, index: usize) -> Option<T> {
        self.inner.items.read().get(index).cloned()
    }

    /// Snapshot of all items.
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.items.read().clone()
    }

    /// Number of events produced so far, deferred ones included.
    pub fn version(&self) -> u64 {
        self.inner.listeners.version()
    }

    /// Number of registered handlers.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.listener_count()
    }

    /// Append an item.
    pub fn push(&self, item: T) -> Result<()> {
        let _serial = self.inner.listeners.serialize();
        let index = {
            let mut items = self.inner.items.write();
            items.push(item.clone());
            items.len() - 1
        };
        self.emit(ChangeEvent::added(Some(index), vec![item]))
    }

    /// Insert an item at `index`, shifting later items right.
    pub fn insert(&self, index: usize, item: T) -> Result<()> {
        let _serial = self.inner.listeners.serialize();
        {
            let mut items = self.inner.items.write();
            if index > items.len() {
                return Err(out_of_range(index, items.len()));
            }
            items.insert(index, item.clone());
        }
        self.emit(ChangeEvent::added(Some(index), vec![item]))
    }

    /// Remove and return the item at `index`.
    pub fn remove_at(&self, index: usize) -> Result<T> {
        let _serial = self.inner.listeners.serialize();
        let removed = {
            let mut items = self.inner.items.write();
            if index >= items.len() {
                return Err(out_of_range(index, items.len()));
            }
            items.remove(index)
        };
        self.emit(ChangeEvent::removed(Some(index), vec![removed.clone()]))?;
        Ok(removed)
    }

    /// Overwrite the item at `index`, returning the previous one.
    pub fn set(&self, index: usize, item: T) -> Result<T> {
        let _serial = self.inner.listeners.serialize();
        let previous = {
            let mut items = self.inner.items.write();
            let len = items.len();
            let slot = items.get_mut(index).ok_or_else(|| out_of_range(index, len))?;
            std::mem::replace(slot, item.clone())
        };
        self.emit(ChangeEvent::replaced(Some(index), previous.clone(), item))?;
        Ok(previous)
    }

    /// Remove every item.
    pub fn clear(&self) -> Result<()> {
        let _serial = self.inner.listeners.serialize();
        self.inner.items.write().clear();
        self.emit(ChangeEvent::reset())
    }

    /// Append every item, then notify once with a `Reset`.
    pub fn extend<I>(&self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        self.batch(|list| items.into_iter().try_for_each(|item| list.push(item)))
    }

    /// Run `body` with notifications deferred.
    ///
    /// If anything changed, handlers see a single `Reset` once the outermost
    /// batch returns.
    pub fn batch<R, F>(&self, body: F) -> Result<R>
    where
        F: FnOnce(&Self) -> Result<R>,
    {
        self.inner.listeners.batch(self, || body(self))
    }

    fn emit(&self, event: ChangeEvent<T>) -> Result<()> {
        self.inner.listeners.dispatch(&event, self)
    }
}

impl<T: Clone + PartialEq> ObservableVec<T> {
    /// Remove the first item equal to `item`. Returns whether one was found.
    pub fn remove(&self, item: &T) -> Result<bool> {
        let _serial = self.inner.listeners.serialize();
        let removed = {
            let mut items = self.inner.items.write();
            let position = items.iter().position(|candidate| candidate == item);
            position.map(|index| (index, items.remove(index)))
        };
        match removed {
            Some((index, old)) => {
                self.emit(ChangeEvent::removed(Some(index), vec![old]))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Whether any item equals `item`.
    pub fn contains(&self, item: &T) -> bool {
        self.inner.items.read().contains(item)
    }
}

impl<T: Clone> SourceCollection<T> for ObservableVec<T> {
    fn items(&self) -> Vec<T> {
        self.to_vec()
    }

    fn count(&self) -> usize {
        self.len()
    }

    fn notifier(&self) -> Option<&dyn ChangeNotifier<T>> {
        Some(self)
    }
}

impl<T: Clone> ChangeNotifier<T> for ObservableVec<T> {
    fn subscribe(&self, handler: ChangeHandler<T>) {
        self.inner.listeners.subscribe(handler);
    }
}
