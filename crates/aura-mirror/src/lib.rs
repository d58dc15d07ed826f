//! Aura Mirror - Incremental Collection Synchronization
//!
//! This crate keeps a target list equal to a derived view of a source
//! collection. The view is described by a per-item pipeline:
//!
//! ```text
//! target == order_by(orderer, map(selector, filter(predicate, source)))
//! ```
//!
//! The target is filled once when the mirror starts. If the source can report
//! its own mutations, every later [`ChangeEvent`] is translated into the
//! smallest set of inserts and removals on the target instead of a rebuild.
//!
//! # Architecture
//!
//! ## Pipeline
//! - [`Pipeline`]: optional filter, required selector, optional orderer
//! - [`MirrorBuilder`]: collects the pipeline, a [`MirrorConfig`] and a target
//!
//! ## Engine
//! - [`Synchronizer`]: populate, then apply one event at a time
//! - [`resolver`]: insertion and removal positions for ordered targets
//!
//! ## Seams
//! - [`SourceCollection`] and [`ChangeNotifier`]: what a source must provide
//! - [`TargetList`]: what a target must provide, implemented for `Vec` and
//!   `VecDeque`
//!
//! Observable source containers live in the `aura-collections` crate.

#![forbid(unsafe_code)]

/// Data configuration loaded from TOML or the environment
pub mod config;

/// Unified error handling
pub mod errors;

/// Change events emitted by observable sources
pub mod event;

/// Builder and handle for started mirrors
pub mod mirror;

/// Filter, selector and orderer
pub mod pipeline;

/// Position resolution for ordered targets
pub mod resolver;

/// Source collection and notifier traits
pub mod source;

/// Synchronization engine
pub mod synchronizer;

/// Target list abstraction
pub mod target;

pub use config::{MirrorConfig, RemovalPolicy, ENV_PREFIX};
pub use errors::{MirrorError, Result};
pub use event::{ChangeEvent, ChangeKind};
pub use mirror::{mirror, mirror_filtered, Mirror, MirrorBuilder};
pub use pipeline::{Filter, Orderer, Pipeline, Selector};
pub use source::{ChangeHandler, ChangeNotifier, SourceCollection};
pub use synchronizer::{SyncState, Synchronizer};
pub use target::{shared, SharedTarget, TargetList};
