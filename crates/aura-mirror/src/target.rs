//! Target collections the synchronizer writes into
//!
//! The engine only needs index-addressed mutation, so any ordered sequence can
//! serve as a mirror target by implementing [`TargetList`]. Bounds are checked
//! before every mutation and reported as consistency violations instead of
//! panicking.

use crate::errors::{MirrorError, Result};
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;

/// An ordered, index-addressable, mutable sequence.
pub trait TargetList<T> {
    /// Number of items currently held.
    fn len(&self) -> usize;

    /// Item at `index`, if any.
    fn get(&self, index: usize) -> Option<&T>;

    /// Append an item at the end.
    fn push(&mut self, item: T);

    /// Insert an item at `index`. Callers guarantee `index <= len()`.
    fn insert(&mut self, index: usize, item: T);

    /// Remove and return the item at `index`, or `None` past the end.
    fn remove(&mut self, index: usize) -> Option<T>;

    /// Remove every item.
    fn clear(&mut self);

    /// Whether the sequence is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> TargetList<T> for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    fn push(&mut self, item: T) {
        Vec::push(self, item);
    }

    fn insert(&mut self, index: usize, item: T) {
        Vec::insert(self, index, item);
    }

    fn remove(&mut self, index: usize) -> Option<T> {
        (index < Vec::len(self)).then(|| Vec::remove(self, index))
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }
}

impl<T> TargetList<T> for VecDeque<T> {
    fn len(&self) -> usize {
        VecDeque::len(self)
    }

    fn get(&self, index: usize) -> Option<&T> {
        VecDeque::get(self, index)
    }

    fn push(&mut self, item: T) {
        self.push_back(item);
    }

    fn insert(&mut self, index: usize, item: T) {
        VecDeque::insert(self, index, item);
    }

    fn remove(&mut self, index: usize) -> Option<T> {
        VecDeque::remove(self, index)
    }

    fn clear(&mut self) {
        VecDeque::clear(self);
    }
}

/// A target shared between its owner and the synchronizer.
///
/// The owner reads through the lock; the synchronizer holds the write lock
/// for the duration of a single change event.
pub type SharedTarget<L> = Arc<RwLock<L>>;

/// Wrap a target list so it can be handed to the synchronizer.
pub fn shared<L>(list: L) -> SharedTarget<L> {
    Arc::new(RwLock::new(list))
}

/// Insert, failing if `index` is past the end.
pub(crate) fn try_insert<T, L>(target: &mut L, index: usize, item: T) -> Result<()>
where
    L: TargetList<T> + ?Sized,
{
    if index > target.len() {
        return Err(MirrorError::index_out_of_bounds(
            index,
            target.len(),
            "insert",
        ));
    }
    target.insert(index, item);
    Ok(())
}

/// Remove, failing if `index` does not name an existing item.
pub(crate) fn try_remove<T, L>(target: &mut L, index: usize) -> Result<T>
where
    L: TargetList<T> + ?Sized,
{
    let len = target.len();
    target
        .remove(index)
        .ok_or_else(|| MirrorError::index_out_of_bounds(index, len, "remove"))
}
