//! Aura Collections - Change-Notifying Containers
//!
//! Containers that report each of their own mutations as an
//! [`aura_mirror::ChangeEvent`]. Any of them can be handed to
//! [`aura_mirror::MirrorBuilder::start`] as a live source.
//!
//! - [`ObservableVec`]: plain list
//! - [`ObservableHashSet`]: set with insertion order and set algebra
//! - [`ObservableKeyedCollection`]: list with unique, derived keys
//!
//! All three are cheap `Clone` handles over shared storage. A mutating call
//! returns the first error any handler raised while the change was delivered.

#![forbid(unsafe_code)]

pub mod hash_set;
pub mod keyed;
pub mod registry;
pub mod vec;

pub use hash_set::ObservableHashSet;
pub use keyed::{KeyFn, ObservableKeyedCollection};
pub use registry::ListenerRegistry;
pub use vec::ObservableVec;
