//! Entry points for starting a mirror
//!
//! [`MirrorBuilder`] collects the pipeline, configuration and target, then
//! starts a [`Synchronizer`]. The free functions cover the common cases where
//! source and target share an item type.
//!
//! # Example
//!
//! ```rust,no_run
//! use aura_mirror::{shared, MirrorBuilder};
//!
//! #[derive(Clone)]
//! struct User {
//!     name: String,
//!     active: bool,
//! }
//!
//! # fn main() -> aura_mirror::Result<()> {
//! let users = vec![
//!     User { name: "cy".into(), active: true },
//!     User { name: "bo".into(), active: false },
//!     User { name: "ana".into(), active: true },
//! ];
//! let names = shared(Vec::new());
//! let mirror = MirrorBuilder::new()
//!     .filter(|user: &User| user.active)
//!     .select(|user: &User| user.name.clone())
//!     .order_by(|a: &String, b: &String| a.cmp(b))
//!     .target(names.clone())
//!     .start(&users)?;
//! assert!(!mirror.is_live());
//! assert_eq!(*names.read(), vec!["ana".to_string(), "cy".to_string()]);
//! # Ok(())
//! # }
//! ```
//!
//! # Locking
//!
//! The target's write lock is taken for every delivered event. Do not hold a
//! read guard on the target while mutating the source on the same thread.

use crate::config::MirrorConfig;
use crate::errors::{MirrorError, Result};
use crate::pipeline::{Filter, Orderer, Pipeline, Selector};
use crate::source::SourceCollection;
use crate::synchronizer::{SyncState, Synchronizer};
use crate::target::{SharedTarget, TargetList};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Handle to a started mirror.
pub struct Mirror<L> {
    target: SharedTarget<L>,
    state: SyncState,
    label: String,
}

impl<L> Mirror<L> {
    pub(crate) fn new(target: SharedTarget<L>, state: SyncState, label: String) -> Self {
        Self {
            target,
            state,
            label,
        }
    }

    /// The target being kept in sync.
    pub fn target(&self) -> &SharedTarget<L> {
        &self.target
    }

    /// Lifecycle state reached when the mirror started.
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Whether the target follows later source changes.
    pub fn is_live(&self) -> bool {
        self.state == SyncState::Subscribed
    }

    /// Label used in log output.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<L: Clone> Mirror<L> {
    /// Copy of the target's current contents.
    pub fn snapshot(&self) -> L {
        self.target.read().clone()
    }
}

impl<L> fmt::Debug for Mirror<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mirror")
            .field("label", &self.label)
            .field("state", &self.state)
            .finish()
    }
}

/// Collects everything needed to start a mirror.
pub struct MirrorBuilder<S, T, L> {
    filter: Option<Filter<S>>,
    selector: Option<Selector<S, T>>,
    orderer: Option<Orderer<T>>,
    config: MirrorConfig,
    target: Option<SharedTarget<L>>,
}

impl<S, T, L> Default for MirrorBuilder<S, T, L> {
    fn default() -> Self {
        Self {
            filter: None,
            selector: None,
            orderer: None,
            config: MirrorConfig::default(),
            target: None,
        }
    }
}

impl<T: Clone + 'static, L> MirrorBuilder<T, T, L> {
    /// Builder whose selector copies items unchanged.
    pub fn identity() -> Self {
        Self {
            selector: Some(Arc::new(|item: &T| -> Result<T> { Ok(item.clone()) })),
            ..Self::default()
        }
    }
}

impl<S: 'static, T: 'static, L> MirrorBuilder<S, T, L> {
    /// Empty builder. A selector and a target must be supplied before start.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only source items for which `predicate` holds.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(predicate));
        self
    }

    /// Map source items to target items.
    pub fn select<F>(mut self, selector: F) -> Self
    where
        F: Fn(&S) -> T + Send + Sync + 'static,
    {
        self.selector = Some(Arc::new(move |item: &S| -> Result<T> {
            Ok(selector(item))
        }));
        self
    }

    /// Map source items with a selector that can fail.
    ///
    /// A failure surfaces as [`MirrorError::TransformFailure`].
    pub fn try_select<F, E>(mut self, selector: F) -> Self
    where
        F: Fn(&S) -> std::result::Result<T, E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        self.selector = Some(Arc::new(move |item: &S| {
            selector(item).map_err(|e| MirrorError::transform(e.to_string()))
        }));
        self
    }

    /// Keep the target sorted by `orderer`.
    pub fn order_by<F>(mut self, orderer: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.orderer = Some(Arc::new(orderer));
        self
    }

    /// Use `config` instead of the defaults.
    pub fn config(mut self, config: MirrorConfig) -> Self {
        self.config = config;
        self
    }

    /// The list to keep in sync.
    pub fn target(mut self, target: SharedTarget<L>) -> Self {
        self.target = Some(target);
        self
    }

    /// Build the synchronizer without starting it.
    pub fn build(self) -> Result<(Synchronizer<S, T>, SharedTarget<L>)> {
        let target = self
            .target
            .ok_or_else(|| MirrorError::invalid_argument("mirror target is required"))?;
        let selector = self
            .selector
            .ok_or_else(|| MirrorError::invalid_argument("mirror selector is required"))?;
        self.config.validate()?;

        let pipeline = Pipeline::from_parts(self.filter, selector, self.orderer);
        Ok((Synchronizer::new(pipeline, self.config), target))
    }

    /// Populate the target from `source` and follow its changes.
    pub fn start<Src>(self, source: &Src) -> Result<Mirror<L>>
    where
        Src: SourceCollection<S>,
        L: TargetList<T> + Send + Sync + 'static,
    {
        let (synchronizer, target) = self.build()?;
        synchronizer.start(source, target)
    }
}

/// Mirror `source` into `target` unchanged.
pub fn mirror<T, Src, L>(source: &Src, target: SharedTarget<L>) -> Result<Mirror<L>>
where
    T: Clone + 'static,
    Src: SourceCollection<T>,
    L: TargetList<T> + Send + Sync + 'static,
{
    MirrorBuilder::identity().target(target).start(source)
}

/// Mirror the items of `source` for which `predicate` holds.
pub fn mirror_filtered<T, Src, L, F>(
    source: &Src,
    target: SharedTarget<L>,
    predicate: F,
) -> Result<Mirror<L>>
where
    T: Clone + 'static,
    Src: SourceCollection<T>,
    L: TargetList<T> + Send + Sync + 'static,
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    MirrorBuilder::identity()
        .filter(predicate)
        .target(target)
        .start(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::shared;

    #[test]
    fn test_plain_vec_source_is_one_shot_copy() {
        let source = vec![1, 2, 3, 4, 5];
        let target = shared(Vec::new());
        let handle = mirror(&source, target.clone()).unwrap();

        assert_eq!(*target.read(), source);
        assert_eq!(handle.state(), SyncState::Populated);
        assert!(!handle.is_live());
    }

    #[test]
    fn test_missing_target_is_invalid_argument() {
        let source = vec![1, 2, 3];
        let err = MirrorBuilder::<i32, i32, Vec<i32>>::identity()
            .start(&source)
            .unwrap_err();
        assert!(matches!(err, MirrorError::InvalidArgument { .. }));
    }

    #[test]
    fn test_missing_selector_is_invalid_argument() {
        let source = vec![1, 2, 3];
        let err = MirrorBuilder::<i32, String, Vec<String>>::new()
            .target(shared(Vec::new()))
            .start(&source)
            .unwrap_err();
        assert!(matches!(err, MirrorError::InvalidArgument { .. }));
    }

    #[test]
    fn test_population_applies_full_pipeline() {
        let source = vec![3, 8, 1, 6, 5, 2];
        let target = shared(Vec::new());
        let handle = MirrorBuilder::new()
            .filter(|x: &i32| *x > 2)
            .select(|x: &i32| format!("#{x}"))
            .order_by(|a: &String, b: &String| a.cmp(b))
            .config(MirrorConfig::labeled("numbers"))
            .target(target)
            .start(&source)
            .unwrap();

        assert_eq!(handle.snapshot(), vec!["#3", "#5", "#6", "#8"]);
        assert_eq!(handle.label(), "numbers");
    }

    #[test]
    fn test_failing_selector_surfaces_from_start() {
        let source = vec!["1".to_string(), "two".to_string()];
        let err = MirrorBuilder::new()
            .try_select(|s: &String| s.parse::<i32>())
            .target(shared(Vec::new()))
            .start(&source)
            .unwrap_err();
        assert!(matches!(err, MirrorError::TransformFailure { .. }));
    }

    #[test]
    fn test_invalid_config_rejected_before_population() {
        let source = vec![1];
        let target = shared(Vec::new());
        let err = MirrorBuilder::identity()
            .config(MirrorConfig::labeled(""))
            .target(target.clone())
            .start(&source)
            .unwrap_err();
        assert!(matches!(err, MirrorError::Config { .. }));
        assert!(target.read().is_empty());
    }

    #[test]
    fn test_mirror_filtered_keeps_matching_items() {
        let source = vec![1, 2, 3, 4, 5];
        let target = shared(Vec::new());
        mirror_filtered(&source, target.clone(), |x: &i32| x % 2 == 0).unwrap();
        assert_eq!(*target.read(), vec![2, 4]);
    }
}
