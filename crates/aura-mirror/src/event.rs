//! ChangeEvent<S> - Structured description of one source mutation
//!
//! A `ChangeEvent` tells a listener what happened to a source collection:
//! which kind of mutation, where it happened, and which items were involved.
//! Sources without positional semantics (sets, keyed stores) may report
//! `None` for a position.
//!
//! # Example
//!
//! ```rust,no_run
//! use aura_mirror::{ChangeEvent, ChangeKind};
//!
//! let event = ChangeEvent::added(Some(5), vec![6]);
//! assert_eq!(event.kind(), ChangeKind::Add);
//! assert_eq!(event.new_items(), Some(&[6][..]));
//! ```

use crate::errors::{MirrorError, Result};
use serde::{Deserialize, Serialize};

/// The kind of mutation a source collection went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// One or more items were inserted contiguously.
    Add,
    /// One or more items were removed.
    Remove,
    /// An item was overwritten in place. Positions do not shift.
    Replace,
    /// The source was cleared or rebuilt wholesale. Carries no items.
    Reset,
}

/// An immutable description of what changed in a source collection.
///
/// Invariants, enforced by [`ChangeEvent::new`]:
/// - `Reset` carries no item lists.
/// - `Replace` carries both lists, neither empty.
/// - `Add` carries only `new_items`, `Remove` carries only `old_items`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent<S> {
    kind: ChangeKind,
    old_start_index: Option<usize>,
    new_start_index: Option<usize>,
    old_items: Option<Vec<S>>,
    new_items: Option<Vec<S>>,
}

impl<S> ChangeEvent<S> {
    /// Build an event from raw parts, checking the per-kind invariants.
    pub fn new(
        kind: ChangeKind,
        old_start_index: Option<usize>,
        new_start_index: Option<usize>,
        old_items: Option<Vec<S>>,
        new_items: Option<Vec<S>>,
    ) -> Result<Self> {
        let (has_old, has_new) = (old_items.is_some(), new_items.is_some());
        let well_formed = match kind {
            ChangeKind::Reset => !has_old && !has_new,
            ChangeKind::Add => !has_old && has_new,
            ChangeKind::Remove => has_old && !has_new,
            ChangeKind::Replace => {
                old_items.as_ref().is_some_and(|items| !items.is_empty())
                    && new_items.as_ref().is_some_and(|items| !items.is_empty())
            }
        };
        if !well_formed {
            return Err(MirrorError::invalid_argument(format!(
                "malformed {kind:?} event: old items {has_old}, new items {has_new}"
            )));
        }

        Ok(Self {
            kind,
            old_start_index,
            new_start_index,
            old_items,
            new_items,
        })
    }

    /// Items were inserted starting at `index`.
    pub fn added(index: Option<usize>, items: Vec<S>) -> Self {
        Self {
            kind: ChangeKind::Add,
            old_start_index: None,
            new_start_index: index,
            old_items: None,
            new_items: Some(items),
        }
    }

    /// Items were removed starting at `index`.
    pub fn removed(index: Option<usize>, items: Vec<S>) -> Self {
        Self {
            kind: ChangeKind::Remove,
            old_start_index: index,
            new_start_index: None,
            old_items: Some(items),
            new_items: None,
        }
    }

    /// `old` was overwritten by `new` at `index`.
    ///
    /// Both start indices carry the same position since a replace does not
    /// shift anything.
    pub fn replaced(index: Option<usize>, old: S, new: S) -> Self {
        Self {
            kind: ChangeKind::Replace,
            old_start_index: index,
            new_start_index: index,
            old_items: Some(vec![old]),
            new_items: Some(vec![new]),
        }
    }

    /// The source was cleared or rebuilt.
    pub fn reset() -> Self {
        Self {
            kind: ChangeKind::Reset,
            old_start_index: None,
            new_start_index: None,
            old_items: None,
            new_items: None,
        }
    }

    /// The kind of mutation.
    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    /// Position the removed items used to occupy.
    pub fn old_start_index(&self) -> Option<usize> {
        self.old_start_index
    }

    /// Position the new items now occupy.
    pub fn new_start_index(&self) -> Option<usize> {
        self.new_start_index
    }

    /// Items that left the source, if any.
    pub fn old_items(&self) -> Option<&[S]> {
        self.old_items.as_deref()
    }

    /// Items that entered the source, if any.
    pub fn new_items(&self) -> Option<&[S]> {
        self.new_items.as_deref()
    }

    /// Position used for removing the old half of this event.
    ///
    /// A replace reports the new start index, everything else the old one.
    pub fn removal_index(&self) -> Option<usize> {
        match self.kind {
            ChangeKind::Replace => self.new_start_index,
            _ => self.old_start_index,
        }
    }

    /// Whether the event carries no items at all (a reset, or empty lists).
    pub fn is_empty(&self) -> bool {
        self.old_items.as_ref().map_or(true, Vec::is_empty)
            && self.new_items.as_ref().map_or(true, Vec::is_empty)
    }
}
