//! Synchronizer - keeps a target equal to the projected source
//!
//! The synchronizer owns the pipeline and applies it in two situations:
//! once over the full source when a mirror starts, and then once per change
//! event the source reports. After either step the target equals
//! `order(map(select, filter(predicate, source)))`.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized --populate--> Populated --subscribe--> Subscribed
//! ```
//!
//! A source without a notifier stops at `Populated`: the mirror is a one-shot
//! copy. There is no unsubscribed state; the handler lives as long as the
//! source keeps it.
//!
//! # Failure
//!
//! Event positions are checked against the current target. A position that
//! does not fit is a [`MirrorError::ConsistencyViolation`] and is returned to
//! whoever delivered the event. Nothing is rolled back: item operations that
//! completed earlier in the same event stay applied.

use crate::config::{MirrorConfig, RemovalPolicy};
use crate::errors::{MirrorError, Result};
use crate::event::{ChangeEvent, ChangeKind};
use crate::mirror::Mirror;
use crate::pipeline::Pipeline;
use crate::resolver;
use crate::source::SourceCollection;
use crate::target::{self, SharedTarget, TargetList};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Where a synchronizer is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// Nothing has been written to the target yet.
    Uninitialized,
    /// Initial contents written; the source cannot report changes.
    Populated,
    /// Initial contents written and a handler is registered on the source.
    Subscribed,
}

/// The engine applying a [`Pipeline`] to a target.
pub struct Synchronizer<S, T> {
    pipeline: Pipeline<S, T>,
    config: MirrorConfig,
    state: SyncState,
}

impl<S, T> Clone for Synchronizer<S, T> {
    fn clone(&self) -> Self {
        Self {
            pipeline: self.pipeline.clone(),
            config: self.config.clone(),
            state: self.state,
        }
    }
}

impl<S, T> std::fmt::Debug for Synchronizer<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Synchronizer")
            .field("label", &self.config.label)
            .field("pipeline", &self.pipeline)
            .field("state", &self.state)
            .finish()
    }
}

impl<S, T> Synchronizer<S, T> {
    /// Create an uninitialized synchronizer.
    pub fn new(pipeline: Pipeline<S, T>, config: MirrorConfig) -> Self {
        Self {
            pipeline,
            config,
            state: SyncState::Uninitialized,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// The pipeline applied to every item.
    pub fn pipeline(&self) -> &Pipeline<S, T> {
        &self.pipeline
    }

    /// The data configuration.
    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// Append the projected contents of `source` to `target`.
    ///
    /// Returns the number of items written.
    pub fn populate<L>(&mut self, target: &mut L, source: &dyn SourceCollection<S>) -> Result<usize>
    where
        L: TargetList<T> + ?Sized,
    {
        let written = self.append_projection(target, source)?;
        if self.state == SyncState::Uninitialized {
            self.state = SyncState::Populated;
        }
        debug!(label = %self.config.label, written, "mirror populated");
        Ok(written)
    }

    /// Apply one change event to `target`.
    ///
    /// `source` is the source in its post-change state. It is only read for
    /// resets and for translating positions of filtered, unordered mirrors.
    pub fn apply<L>(
        &self,
        target: &mut L,
        event: &ChangeEvent<S>,
        source: &dyn SourceCollection<S>,
    ) -> Result<()>
    where
        L: TargetList<T> + ?Sized,
    {
        trace!(
            label = %self.config.label,
            kind = ?event.kind(),
            old_start = ?event.old_start_index(),
            new_start = ?event.new_start_index(),
            "applying change event"
        );

        if event.kind() == ChangeKind::Reset {
            target.clear();
            let written = self.append_projection(target, source)?;
            debug!(label = %self.config.label, written, "mirror rebuilt after reset");
            return Ok(());
        }

        let snapshot = self.translates_positions().then(|| source.items());

        if let Some(old_items) = event.old_items() {
            let position = self.target_position(snapshot.as_deref(), event.removal_index());
            for item in old_items.iter().filter(|item| self.pipeline.accepts(item)) {
                self.remove_item(target, item, position)?;
            }
        }

        if let Some(new_items) = event.new_items() {
            let base = self.target_position(snapshot.as_deref(), event.new_start_index());
            let accepted = new_items.iter().filter(|item| self.pipeline.accepts(item));
            for (offset, item) in accepted.enumerate() {
                self.insert_item(target, item, base.map(|base| base + offset))?;
            }
        }

        Ok(())
    }

    /// Populate `target`, then subscribe to `source` if it can notify.
    pub fn start<Src, L>(mut self, source: &Src, target: SharedTarget<L>) -> Result<Mirror<L>>
    where
        Src: SourceCollection<S>,
        S: 'static,
        T: 'static,
        L: TargetList<T> + Send + Sync + 'static,
    {
        {
            let mut guard = target.write();
            self.populate(&mut *guard, source)?;
        }

        if let Some(notifier) = source.notifier() {
            self.state = SyncState::Subscribed;
            let engine = self.clone();
            let handler_target = Arc::clone(&target);
            notifier.subscribe(Box::new(
                move |event: &ChangeEvent<S>, source: &dyn SourceCollection<S>| {
                    let mut guard = handler_target.write();
                    engine.apply(&mut *guard, event, source)
                },
            ));
            debug!(label = %self.config.label, "mirror subscribed to source");
        } else {
            debug!(label = %self.config.label, "source has no notifier, mirror is a one-shot copy");
        }

        Ok(Mirror::new(target, self.state, self.config.label))
    }

    fn translates_positions(&self) -> bool {
        self.config.translate_filtered_positions
            && self.pipeline.is_filtered()
            && !self.pipeline.is_ordered()
    }

    fn target_position(&self, snapshot: Option<&[S]>, position: Option<usize>) -> Option<usize> {
        match (snapshot, position) {
            (Some(items), Some(position)) => Some(self.pipeline.accepted_before(items, position)),
            (_, position) => position,
        }
    }

    fn append_projection<L>(
        &self,
        target: &mut L,
        source: &dyn SourceCollection<S>,
    ) -> Result<usize>
    where
        L: TargetList<T> + ?Sized,
    {
        let projected = self.pipeline.project(&source.items())?;
        let written = projected.len();
        for item in projected {
            target.push(item);
        }
        Ok(written)
    }

    fn insert_item<L>(&self, target: &mut L, item: &S, position: Option<usize>) -> Result<()>
    where
        L: TargetList<T> + ?Sized,
    {
        let mapped = self.pipeline.select(item)?;
        let index = match self.pipeline.orderer() {
            Some(orderer) => resolver::insertion_index(target, &mapped, |a, b| orderer(a, b)),
            None => resolver::clamped_index(position, target.len()),
        };
        trace!(label = %self.config.label, index, "inserting into target");
        target::try_insert(target, index, mapped)
    }

    fn remove_item<L>(&self, target: &mut L, item: &S, position: Option<usize>) -> Result<()>
    where
        L: TargetList<T> + ?Sized,
    {
        let Some(orderer) = self.pipeline.orderer() else {
            let Some(index) = position else {
                warn!(label = %self.config.label, "remove event carries no position");
                return Err(MirrorError::consistency(
                    "remove event carries no position for an unordered mirror",
                ));
            };
            trace!(label = %self.config.label, index, "removing from target");
            return match target::try_remove(target, index) {
                Ok(_) => Ok(()),
                Err(err) => {
                    warn!(label = %self.config.label, error = %err, "mirror desynchronized");
                    Err(err)
                }
            };
        };

        let probe = self.pipeline.select(item)?;
        let indices = match self.config.removal_policy {
            RemovalPolicy::AllEquivalent => {
                resolver::equivalent_indices(target, &probe, |a, b| orderer(a, b))
            }
            RemovalPolicy::FirstEquivalent => {
                resolver::first_equivalent(target, &probe, |a, b| orderer(a, b))
                    .into_iter()
                    .collect()
            }
        };

        if indices.is_empty() {
            warn!(label = %self.config.label, "no equivalent target entry for removed item");
            return Ok(());
        }

        // Highest first so earlier indices stay valid.
        for &index in indices.iter().rev() {
            trace!(label = %self.config.label, index, "removing equivalent entry");
            target::try_remove(target, index)?;
        }
        Ok(())
    }
}
