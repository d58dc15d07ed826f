//! ObservableHashSet<T> - A set that reports its own mutations
//!
//! Backed by an [`IndexSet`], so items keep insertion order and every item
//! has a stable position that events can report. Removals shift later items
//! left, the same way a list would.
//!
//! Set-algebra operations report one event per removed item, each with its
//! position at the moment it left. Items entering through a union or a
//! symmetric difference are reported together as one `Add` at the old end of
//! the set. An operation that changes nothing emits nothing.

use crate::registry::ListenerRegistry;
use aura_mirror::{ChangeEvent, ChangeHandler, ChangeNotifier, Result, SourceCollection};
use indexmap::IndexSet;
use parking_lot::RwLock;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

struct SetInner<T> {
    items: RwLock<IndexSet<T>>,
    listeners: ListenerRegistry<T>,
}

/// A shared, change-notifying set with insertion order.
pub struct ObservableHashSet<T> {
    inner: Arc<SetInner<T>>,
}

impl<T> Clone for ObservableHashSet<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Eq + Hash> Default for ObservableHashSet<T> {
    fn default() -> Self {
        Self::from_set(IndexSet::new())
    }
}

impl<T: Eq + Hash> FromIterator<T> for ObservableHashSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_set(iter.into_iter().collect())
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableHashSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableHashSet")
            .field("items", &*self.inner.items.read())
            .field("listeners", &self.inner.listeners)
            .finish()
    }
}

impl<T: Eq + Hash> ObservableHashSet<T> {
    fn from_set(items: IndexSet<T>) -> Self {
        Self {
            inner: Arc::new(SetInner {
                items: RwLock::new(items),
                listeners: ListenerRegistry::new(),
            }),
        }
    }
}

impl<T: Eq + Hash + Clone> ObservableHashSet<T> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.inner.items.read().len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.items.read().is_empty()
    }

    /// Whether `item` is a member.
    pub fn contains(&self, item: &T) -> bool {
        self.inner.items.read().contains(item)
    }

    /// Position of `item` in insertion order.
    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.inner.items.read().get_index_of(item)
    }

    /// Snapshot of all items in insertion order.
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.items.read().iter().cloned().collect()
    }

    /// Number of events produced so far, deferred ones included.
    pub fn version(&self) -> u64 {
        self.inner.listeners.version()
    }

    /// Add `item`. Returns `false` if it was already present.
    pub fn insert(&self, item: T) -> Result<bool> {
        let _serial = self.inner.listeners.serialize();
        let (index, added) = self.inner.items.write().insert_full(item.clone());
        if !added {
            return Ok(false);
        }
        self.emit(ChangeEvent::added(Some(index), vec![item]))?;
        Ok(true)
    }

    /// Remove `item`. Returns `false` if it was not present.
    pub fn remove(&self, item: &T) -> Result<bool> {
        let _serial = self.inner.listeners.serialize();
        Ok(self.take(item)?.is_some())
    }

    /// Remove every item.
    pub fn clear(&self) -> Result<()> {
        let _serial = self.inner.listeners.serialize();
        self.inner.items.write().clear();
        self.emit(ChangeEvent::reset())
    }

    /// Add every item of `other` not already present.
    pub fn union_with<I>(&self, other: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        let _serial = self.inner.listeners.serialize();
        self.append_missing(other)
    }

    /// Remove every item that also appears in `other`.
    pub fn except_with<I>(&self, other: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        let _serial = self.inner.listeners.serialize();
        for item in other {
            self.take(&item)?;
        }
        Ok(())
    }

    /// Keep only the items that also appear in `other`.
    pub fn intersect_with<I>(&self, other: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        let _serial = self.inner.listeners.serialize();
        let keep: IndexSet<T> = other.into_iter().collect();
        let doomed: Vec<T> = self
            .inner
            .items
            .read()
            .iter()
            .filter(|item| !keep.contains(*item))
            .cloned()
            .collect();
        for item in &doomed {
            self.take(item)?;
        }
        Ok(())
    }

    /// Keep the items present in exactly one of `self` and `other`.
    ///
    /// Shared items are removed first, then the items only `other` had are
    /// added as one batch at the end.
    pub fn symmetric_except_with<I>(&self, other: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        let _serial = self.inner.listeners.serialize();
        let other: IndexSet<T> = other.into_iter().collect();
        let (shared, fresh): (Vec<T>, Vec<T>) = {
            let items = self.inner.items.read();
            other.into_iter().partition(|item| items.contains(item))
        };
        for item in &shared {
            self.take(item)?;
        }
        self.append_missing(fresh)
    }

    /// Run `body` with notifications deferred, then emit one `Reset` if
    /// anything changed.
    pub fn batch<R, F>(&self, body: F) -> Result<R>
    where
        F: FnOnce(&Self) -> Result<R>,
    {
        self.inner.listeners.batch(self, || body(self))
    }

    fn take(&self, item: &T) -> Result<Option<T>> {
        let removed = self.inner.items.write().shift_remove_full(item);
        match removed {
            Some((index, old)) => {
                self.emit(ChangeEvent::removed(Some(index), vec![old.clone()]))?;
                Ok(Some(old))
            }
            None => Ok(None),
        }
    }

    fn append_missing<I>(&self, other: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        let (start, added) = {
            let mut items = self.inner.items.write();
            let start = items.len();
            let added: Vec<T> = other
                .into_iter()
                .filter(|item| items.insert(item.clone()))
                .collect();
            (start, added)
        };
        if added.is_empty() {
            return Ok(());
        }
        self.emit(ChangeEvent::added(Some(start), added))
    }

    fn emit(&self, event: ChangeEvent<T>) -> Result<()> {
        self.inner.listeners.dispatch(&event, self)
    }
}

impl<T: Eq + Hash + Clone> SourceCollection<T> for ObservableHashSet<T> {
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

impl<T: Eq + Hash + Clone> ChangeNotifier<T> for ObservableHashSet<T> {
    fn subscribe(&self, handler: ChangeHandler<T>) {
        self.inner.listeners.subscribe(handler);
    }
}
