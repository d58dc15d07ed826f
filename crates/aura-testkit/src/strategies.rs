//! Property test strategies for container mutations
//!
//! Strategies generate sequences of operations rather than containers, so a
//! property test can replay the same sequence against a live container and a
//! reference model. Positions are generated unbounded and folded into range
//! when applied, which keeps every generated operation valid.

use proptest::prelude::*;

// Re-export proptest for convenience
pub use proptest;

use aura_collections::{ObservableHashSet, ObservableVec};
use aura_mirror::Result;

/// One mutation of an [`ObservableVec<i32>`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VecOp {
    /// Append a value.
    Push(i32),
    /// Insert a value; the position is folded into `0..=len`.
    Insert(usize, i32),
    /// Remove by position; folded into `0..len`, skipped when empty.
    RemoveAt(usize),
    /// Remove the first equal value, if any.
    Remove(i32),
    /// Overwrite by position; folded into `0..len`, skipped when empty.
    Set(usize, i32),
    /// Remove everything.
    Clear,
    /// Append several values as one batch.
    Extend(Vec<i32>),
}

/// One mutation of an [`ObservableHashSet<i32>`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetOp {
    /// Add a value.
    Insert(i32),
    /// Remove a value.
    Remove(i32),
    /// Add every value.
    Union(Vec<i32>),
    /// Remove every listed value.
    Except(Vec<i32>),
    /// Keep only listed values.
    Intersect(Vec<i32>),
    /// Keep values present on exactly one side.
    SymmetricExcept(Vec<i32>),
    /// Remove everything.
    Clear,
}

/// Strategy for small item values.
///
/// A narrow range makes duplicates and orderer ties common.
pub fn arb_value() -> impl Strategy<Value = i32> {
    -20i32..20
}

/// Strategy for a short list of values.
pub fn arb_values(max_len: usize) -> impl Strategy<Value = Vec<i32>> {
    prop::collection::vec(arb_value(), 0..=max_len)
}

/// Strategy for a single list mutation.
///
/// Weighted toward pushes and inserts so lists tend to grow.
pub fn arb_vec_op() -> impl Strategy<Value = VecOp> {
    prop_oneof![
        4 => arb_value().prop_map(VecOp::Push),
        3 => (any::<usize>(), arb_value()).prop_map(|(index, value)| VecOp::Insert(index, value)),
        2 => any::<usize>().prop_map(VecOp::RemoveAt),
        1 => arb_value().prop_map(VecOp::Remove),
        2 => (any::<usize>(), arb_value()).prop_map(|(index, value)| VecOp::Set(index, value)),
        1 => Just(VecOp::Clear),
        1 => arb_values(4).prop_map(VecOp::Extend),
    ]
}

/// Strategy for a sequence of list mutations.
pub fn arb_vec_ops(max_len: usize) -> impl Strategy<Value = Vec<VecOp>> {
    prop::collection::vec(arb_vec_op(), 0..=max_len)
}

/// Strategy for a single set mutation.
pub fn arb_set_op() -> impl Strategy<Value = SetOp> {
    prop_oneof![
        4 => arb_value().prop_map(SetOp::Insert),
        2 => arb_value().prop_map(SetOp::Remove),
        1 => arb_values(5).prop_map(SetOp::Union),
        1 => arb_values(5).prop_map(SetOp::Except),
        1 => arb_values(12).prop_map(SetOp::Intersect),
        1 => arb_values(5).prop_map(SetOp::SymmetricExcept),
        1 => Just(SetOp::Clear),
    ]
}

/// Strategy for a sequence of set mutations.
pub fn arb_set_ops(max_len: usize) -> impl Strategy<Value = Vec<SetOp>> {
    prop::collection::vec(arb_set_op(), 0..=max_len)
}

/// Apply `op` to `list`, folding positions into range.
pub fn apply_vec_op(list: &ObservableVec<i32>, op: &VecOp) -> Result<()> {
    let len = list.len();
    match op {
        VecOp::Push(value) => list.push(*value),
        VecOp::Insert(index, value) => list.insert(index % (len + 1), *value),
        VecOp::RemoveAt(_) | VecOp::Set(..) if len == 0 => Ok(()),
        VecOp::RemoveAt(index) => list.remove_at(index % len).map(drop),
        VecOp::Remove(value) => list.remove(value).map(drop),
        VecOp::Set(index, value) => list.set(index % len, *value).map(drop),
        VecOp::Clear => list.clear(),
        VecOp::Extend(values) => list.extend(values.iter().copied()),
    }
}

/// Apply `op` to `set`.
pub fn apply_set_op(set: &ObservableHashSet<i32>, op: &SetOp) -> Result<()> {
    match op {
        SetOp::Insert(value) => set.insert(*value).map(drop),
        SetOp::Remove(value) => set.remove(value).map(drop),
        SetOp::Union(values) => set.union_with(values.iter().copied()),
        SetOp::Except(values) => set.except_with(values.iter().copied()),
        SetOp::Intersect(values) => set.intersect_with(values.iter().copied()),
        SetOp::SymmetricExcept(values) => set.symmetric_except_with(values.iter().copied()),
        SetOp::Clear => set.clear(),
    }
}
