//! ObservableKeyedCollection<K, T> - A list indexed by a key derived from each item
//!
//! Items keep list order and can be reached either by position or by the key
//! the collection's key function extracts from them. Keys are unique.

use crate::registry::ListenerRegistry;
use aura_mirror::{
    ChangeEvent, ChangeHandler, ChangeNotifier, MirrorError, Result, SourceCollection,
};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Extracts the key of an item.
pub type KeyFn<K, T> = Arc<dyn Fn(&T) -> K + Send + Sync>;

struct KeyedInner<K, T> {
    items: RwLock<IndexMap<K, T>>,
    key_of: KeyFn<K, T>,
    listeners: ListenerRegistry<T>,
}

/// A shared, change-notifying list with unique keys.
pub struct ObservableKeyedCollection<K, T> {
    inner: Arc<KeyedInner<K, T>>,
}

impl<K, T> Clone for ObservableKeyedCollection<K, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: fmt::Debug, T: fmt::Debug> fmt::Debug for ObservableKeyedCollection<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableKeyedCollection")
            .field("items", &*self.inner.items.read())
            .field("listeners", &self.inner.listeners)
            .finish()
    }
}

fn duplicate_key<K: fmt::Debug>(key: &K) -> MirrorError {
    MirrorError::invalid_argument(format!("an item with key {key:?} already exists"))
}

fn out_of_range(index: usize, len: usize) -> MirrorError {
    MirrorError::invalid_argument(format!("index {index} out of range for length {len}"))
}

impl<K, T> ObservableKeyedCollection<K, T>
where
    K: Eq + Hash + Clone + fmt::Debug,
    T: Clone,
{
    /// Create an empty collection keyed by `key_of`.
    pub fn new<F>(key_of: F) -> Self
    where
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(KeyedInner {
                items: RwLock::new(IndexMap::new()),
                key_of: Arc::new(key_of),
                listeners: ListenerRegistry::new(),
            }),
        }
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.inner.items.read().len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.items.read().is_empty()
    }

    /// Key of `item` under this collection's key function.
    pub fn key_of(&self, item: &T) -> K {
        (self.inner.key_of)(item)
    }

    /// Whether an item with `key` is present.
    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.items.read().contains_key(key)
    }

    /// Copy of the item stored under `key`.
    pub fn try_get(&self, key: &K) -> Option<T> {
        self.inner.items.read().get(key).cloned()
    }

    /// Copy of the item at `index`.
    pub fn get_index(&self, index: usize) -> Option<T> {
        self.inner
            .items
            .read()
            .get_index(index)
            .map(|(_, item)| item.clone())
    }

    /// Position of the item stored under `key`.
    pub fn index_of(&self, key: &K) -> Option<usize> {
        self.inner.items.read().get_index_of(key)
    }

    /// Snapshot of all items in list order.
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.items.read().values().cloned().collect()
    }

    /// Number of events produced so far, deferred ones included.
    pub fn version(&self) -> u64 {
        self.inner.listeners.version()
    }

    /// Append `item`. Fails if its key is already taken.
    pub fn insert(&self, item: T) -> Result<()> {
        let _serial = self.inner.listeners.serialize();
        let key = self.key_of(&item);
        let index = {
            let mut items = self.inner.items.write();
            if items.contains_key(&key) {
                return Err(duplicate_key(&key));
            }
            items.insert_full(key, item.clone()).0
        };
        self.emit(ChangeEvent::added(Some(index), vec![item]))
    }

    /// Insert `item` at `index`. Fails if its key is already taken.
    pub fn insert_at(&self, index: usize, item: T) -> Result<()> {
        let _serial = self.inner.listeners.serialize();
        let key = self.key_of(&item);
        {
            let mut items = self.inner.items.write();
            if index > items.len() {
                return Err(out_of_range(index, items.len()));
            }
            if items.contains_key(&key) {
                return Err(duplicate_key(&key));
            }
            items.shift_insert(index, key, item.clone());
        }
        self.emit(ChangeEvent::added(Some(index), vec![item]))
    }

    /// Overwrite the item at `index`, returning the previous one.
    ///
    /// The new item may carry a different key, as long as no other item
    /// already holds it.
    pub fn set(&self, index: usize, item: T) -> Result<T> {
        let _serial = self.inner.listeners.serialize();
        let previous = self.overwrite(index, item.clone())?;
        self.emit(ChangeEvent::replaced(Some(index), previous.clone(), item))?;
        Ok(previous)
    }

    /// Overwrite the item stored under `item`'s key, returning the previous one.
    pub fn replace(&self, item: T) -> Result<T> {
        let _serial = self.inner.listeners.serialize();
        let key = self.key_of(&item);
        let index = self.inner.items.read().get_index_of(&key).ok_or_else(|| {
            MirrorError::invalid_argument(format!("no item with key {key:?}"))
        })?;
        let previous = self.overwrite(index, item.clone())?;
        self.emit(ChangeEvent::replaced(Some(index), previous.clone(), item))?;
        Ok(previous)
    }

    /// Remove the item stored under `key`.
    pub fn remove_key(&self, key: &K) -> Result<Option<T>> {
        let _serial = self.inner.listeners.serialize();
        let removed = self.inner.items.write().shift_remove_full(key);
        match removed {
            Some((index, _, item)) => {
                self.emit(ChangeEvent::removed(Some(index), vec![item.clone()]))?;
                Ok(Some(item))
            }
            None => Ok(None),
        }
    }

    /// Remove and return the item at `index`.
    pub fn remove_at(&self, index: usize) -> Result<T> {
        let _serial = self.inner.listeners.serialize();
        let removed = {
            let mut items = self.inner.items.write();
            let len = items.len();
            items
                .shift_remove_index(index)
                .map(|(_, item)| item)
                .ok_or_else(|| out_of_range(index, len))?
        };
        self.emit(ChangeEvent::removed(Some(index), vec![removed.clone()]))?;
        Ok(removed)
    }

    /// Remove every item.
    pub fn clear(&self) -> Result<()> {
        let _serial = self.inner.listeners.serialize();
        self.inner.items.write().clear();
        self.emit(ChangeEvent::reset())
    }

    /// Append every item, then notify once with a `Reset`.
    ///
    /// Stops at the first duplicate key. Items appended before it stay, and
    /// handlers still see the `Reset` for them.
    pub fn add_range<I>(&self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        self.batch(|collection| {
            items
                .into_iter()
                .try_for_each(|item| collection.insert(item))
        })
    }

    /// Run `body` with notifications deferred, then emit one `Reset` if
    /// anything changed.
    pub fn batch<R, F>(&self, body: F) -> Result<R>
    where
        F: FnOnce(&Self) -> Result<R>,
    {
        self.inner.listeners.batch(self, || body(self))
    }

    fn overwrite(&self, index: usize, item: T) -> Result<T> {
        let key = self.key_of(&item);
        let mut items = self.inner.items.write();
        let len = items.len();
        let current_key = items
            .get_index(index)
            .map(|(current, _)| current.clone())
            .ok_or_else(|| out_of_range(index, len))?;

        if current_key == key {
            let slot = items
                .get_index_mut(index)
                .map(|(_, slot)| slot)
                .ok_or_else(|| out_of_range(index, len))?;
            return Ok(std::mem::replace(slot, item));
        }
        if items.contains_key(&key) {
            return Err(duplicate_key(&key));
        }
        let (_, previous) = items
            .shift_remove_index(index)
            .ok_or_else(|| out_of_range(index, len))?;
        items.shift_insert(index, key, item);
        Ok(previous)
    }

    fn emit(&self, event: ChangeEvent<T>) -> Result<()> {
        self.inner.listeners.dispatch(&event, self)
    }
}

impl<K, T> SourceCollection<T> for ObservableKeyedCollection<K, T>
where
    K: Eq + Hash + Clone + fmt::Debug,
    T: Clone,
{
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

impl<K, T> ChangeNotifier<T> for ObservableKeyedCollection<K, T>
where
    K: Eq + Hash + Clone + fmt::Debug,
    T: Clone,
{
    fn subscribe(&self, handler: ChangeHandler<T>) {
        self.inner.listeners.subscribe(handler);
    }
}
