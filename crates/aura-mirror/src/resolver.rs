//! Position resolution for ordered and unordered targets
//!
//! Ordered targets are resolved by a linear scan. The scan only relies on the
//! target already being sorted by the orderer, which the synchronizer keeps
//! true after every event.
//!
//! An ordered insertion lands after every element that ties with it and
//! before the first element that compares greater. A one-element target
//! follows the same rule, so the result is always still sorted.

use crate::target::TargetList;
use std::cmp::Ordering;

/// Index at which `item` belongs in a target sorted by `orderer`.
///
/// Walks the target and stops at the first boundary where the comparison of
/// the resident element against `item` turns `Greater`. New items therefore
/// go after any run of equal elements, so the earliest seen item wins ties.
/// If no boundary exists the item is appended.
pub fn insertion_index<T, L, F>(target: &L, item: &T, orderer: F) -> usize
where
    L: TargetList<T> + ?Sized,
    F: Fn(&T, &T) -> Ordering,
{
    (0..target.len())
        .find(|&index| {
            target
                .get(index)
                .is_some_and(|resident| orderer(resident, item) == Ordering::Greater)
        })
        .unwrap_or_else(|| target.len())
}

/// Index at which an unordered insertion lands, clamped to the target length.
///
/// A missing position appends.
pub fn clamped_index(position: Option<usize>, len: usize) -> usize {
    position.map_or(len, |position| position.min(len))
}

/// Every index whose element compares equal to `probe`, ascending.
pub fn equivalent_indices<T, L, F>(target: &L, probe: &T, orderer: F) -> Vec<usize>
where
    L: TargetList<T> + ?Sized,
    F: Fn(&T, &T) -> Ordering,
{
    (0..target.len())
        .filter(|&index| {
            target
                .get(index)
                .is_some_and(|candidate| orderer(candidate, probe) == Ordering::Equal)
        })
        .collect()
}

/// First index whose element compares equal to `probe`.
pub fn first_equivalent<T, L, F>(target: &L, probe: &T, orderer: F) -> Option<usize>
where
    L: TargetList<T> + ?Sized,
    F: Fn(&T, &T) -> Ordering,
{
    (0..target.len()).find(|&index| {
        target
            .get(index)
            .is_some_and(|candidate| orderer(candidate, probe) == Ordering::Equal)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ascending(a: &i32, b: &i32) -> Ordering {
        a.cmp(b)
    }

    fn descending(a: &i32, b: &i32) -> Ordering {
        b.cmp(a)
    }

    #[test]
    fn test_empty_target_inserts_at_zero() {
        let target: Vec<i32> = Vec::new();
        assert_eq!(insertion_index(&target, &3, ascending), 0);
    }

    #[test]
    fn test_single_element_target() {
        let target = vec![5];
        assert_eq!(insertion_index(&target, &7, ascending), 1);
        assert_eq!(insertion_index(&target, &5, ascending), 1);
        assert_eq!(insertion_index(&target, &2, ascending), 0);
    }

    #[test]
    fn test_insert_between_elements() {
        let target = vec![1, 3, 5];
        assert_eq!(insertion_index(&target, &4, ascending), 2);
        assert_eq!(insertion_index(&target, &0, ascending), 0);
        assert_eq!(insertion_index(&target, &9, ascending), 3);
    }

    #[test]
    fn test_ties_go_after_existing_run() {
        let target = vec![1, 3, 3, 5];
        assert_eq!(insertion_index(&target, &3, ascending), 3);
    }

    #[test]
    fn test_descending_appends_smaller_items() {
        let target = vec![5, 4, 3, 2, 1];
        assert_eq!(insertion_index(&target, &0, descending), 5);
        assert_eq!(insertion_index(&target, &6, descending), 0);
        assert_eq!(insertion_index(&target, &3, descending), 3);
    }

    #[test]
    fn test_clamped_index() {
        assert_eq!(clamped_index(Some(2), 5), 2);
        assert_eq!(clamped_index(Some(9), 5), 5);
        assert_eq!(clamped_index(None, 5), 5);
    }

    #[test]
    fn test_equivalent_indices_finds_every_tie() {
        let target = vec![1, 2, 2, 2, 3];
        assert_eq!(equivalent_indices(&target, &2, ascending), vec![1, 2, 3]);
        assert_eq!(first_equivalent(&target, &2, ascending), Some(1));
        assert!(equivalent_indices(&target, &7, ascending).is_empty());
        assert_eq!(first_equivalent(&target, &7, ascending), None);
    }

    #[test]
    fn test_equivalence_follows_orderer_not_equality() {
        let target = vec![10, 11, 20, 25];
        let by_tens = |a: &i32, b: &i32| (a / 10).cmp(&(b / 10));
        assert_eq!(equivalent_indices(&target, &19, by_tens), vec![0, 1]);
    }
}
