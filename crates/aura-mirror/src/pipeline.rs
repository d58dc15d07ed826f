//! Per-item transform pipeline: filter, then select, then order
//!
//! `filter` and `orderer` must be pure and deterministic; the engine calls
//! them more than once for the same item. A selector may be fallible, in which
//! case its error surfaces as [`MirrorError::TransformFailure`].

use crate::errors::{MirrorError, Result};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Predicate deciding membership in the derived view.
pub type Filter<S> = Arc<dyn Fn(&S) -> bool + Send + Sync>;

/// Mapping from source item to target item.
pub type Selector<S, T> = Arc<dyn Fn(&S) -> Result<T> + Send + Sync>;

/// Three-way comparator defining the derived view's order.
pub type Orderer<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// The filter/select/order functions applied to every source item.
pub struct Pipeline<S, T> {
    filter: Option<Filter<S>>,
    selector: Selector<S, T>,
    orderer: Option<Orderer<T>>,
}

impl<S, T> Clone for Pipeline<S, T> {
    fn clone(&self) -> Self {
        Self {
            filter: self.filter.clone(),
            selector: self.selector.clone(),
            orderer: self.orderer.clone(),
        }
    }
}

impl<S, T> fmt::Debug for Pipeline<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("filtered", &self.filter.is_some())
            .field("ordered", &self.orderer.is_some())
            .finish()
    }
}

impl<T: Clone + 'static> Pipeline<T, T> {
    /// Pipeline that copies every item unchanged.
    pub fn identity() -> Self {
        Self::new(|item: &T| item.clone())
    }
}

impl<S: 'static, T: 'static> Pipeline<S, T> {
    /// Pipeline with an infallible selector and no filter or order.
    pub fn new<F>(selector: F) -> Self
    where
        F: Fn(&S) -> T + Send + Sync + 'static,
    {
        Self {
            filter: None,
            selector: Arc::new(move |item: &S| -> Result<T> { Ok(selector(item)) }),
            orderer: None,
        }
    }

    /// Pipeline with a fallible selector.
    pub fn try_new<F, E>(selector: F) -> Self
    where
        F: Fn(&S) -> std::result::Result<T, E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        Self {
            filter: None,
            selector: Arc::new(move |item: &S| {
                selector(item).map_err(|e| MirrorError::transform(e.to_string()))
            }),
            orderer: None,
        }
    }

    /// Pipeline built from an already-erased selector.
    pub(crate) fn from_parts(
        filter: Option<Filter<S>>,
        selector: Selector<S, T>,
        orderer: Option<Orderer<T>>,
    ) -> Self {
        Self {
            filter,
            selector,
            orderer,
        }
    }

    /// Keep only items for which `predicate` holds.
    pub fn with_filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(predicate));
        self
    }

    /// Keep the target sorted by `orderer`.
    pub fn with_orderer<F>(mut self, orderer: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.orderer = Some(Arc::new(orderer));
        self
    }
}

impl<S, T> Pipeline<S, T> {
    /// Whether `item` belongs in the derived view.
    pub fn accepts(&self, item: &S) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(item))
    }

    /// Map a source item to its target value.
    pub fn select(&self, item: &S) -> Result<T> {
        (self.selector)(item)
    }

    /// The orderer, when the view is sorted.
    pub fn orderer(&self) -> Option<&Orderer<T>> {
        self.orderer.as_ref()
    }

    /// Whether a filter is configured.
    pub fn is_filtered(&self) -> bool {
        self.filter.is_some()
    }

    /// Whether the view is sorted.
    pub fn is_ordered(&self) -> bool {
        self.orderer.is_some()
    }

    /// Run filter, select and order over a full snapshot of the source.
    ///
    /// Sorting is stable, so items the orderer considers equal keep their
    /// source order.
    pub fn project(&self, items: &[S]) -> Result<Vec<T>> {
        let mut projected = items
            .iter()
            .filter(|item| self.accepts(item))
            .map(|item| self.select(item))
            .collect::<Result<Vec<T>>>()?;
        if let Some(orderer) = &self.orderer {
            projected.sort_by(|a, b| orderer(a, b));
        }
        Ok(projected)
    }

    /// Number of items in `items[..end]` that pass the filter.
    ///
    /// Translates a source position into the matching target position for
    /// unordered views.
    pub fn accepted_before(&self, items: &[S], end: usize) -> usize {
        match &self.filter {
            Some(filter) => items.iter().take(end).filter(|item| filter(item)).count(),
            None => end,
        }
    }
}
