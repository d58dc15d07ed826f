//! Standard assertion helpers for mirror tests
//!
//! The reference functions recompute the derived view from scratch with
//! nothing but iterator adapters, so incremental results can be compared
//! against an implementation that shares no code with the engine.

use std::cmp::Ordering;

/// Expected target contents for `source` under a sorted pipeline.
///
/// Sorting is stable: items that compare equal keep their source order.
pub fn reference_view<S, T, P, M, O>(
    source: &[S],
    predicate: P,
    select: M,
    orderer: Option<O>,
) -> Vec<T>
where
    P: Fn(&S) -> bool,
    M: Fn(&S) -> T,
    O: Fn(&T, &T) -> Ordering,
{
    let mut view: Vec<T> = source
        .iter()
        .filter(|item| predicate(item))
        .map(select)
        .collect();
    if let Some(orderer) = orderer {
        view.sort_by(orderer);
    }
    view
}

/// Expected target contents for `source` under an unordered pipeline.
pub fn reference_view_unordered<S, T, P, M>(source: &[S], predicate: P, select: M) -> Vec<T>
where
    P: Fn(&S) -> bool,
    M: Fn(&S) -> T,
{
    reference_view(source, predicate, select, None::<fn(&T, &T) -> Ordering>)
}

/// Assert that a shared target holds exactly the expected items
#[macro_export]
macro_rules! assert_mirrors {
    ($target:expr, $expected:expr) => {{
        let actual = $target.read().clone();
        let expected = $expected;
        assert_eq!(
            actual, expected,
            "Mirror target diverged from its source: got {:?}, expected {:?}",
            actual, expected
        )
    }};
}

/// Assert that a result failed because the mirror lost track of its source
#[macro_export]
macro_rules! assert_desynchronized {
    ($result:expr) => {
        match $result {
            Err(err) => assert!(
                err.is_desynchronized(),
                "Expected a desynchronization error, got {:?}",
                err
            ),
            Ok(value) => panic!("Expected a desynchronization error, got Ok({:?})", value),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_view_filters_maps_and_sorts() {
        let view = reference_view(
            &[5, 2, 8, 1],
            |x: &i32| *x > 1,
            |x: &i32| x * 2,
            Some(|a: &i32, b: &i32| b.cmp(a)),
        );
        assert_eq!(view, vec![16, 10, 4]);
    }

    #[test]
    fn test_reference_view_unordered_keeps_source_order() {
        let view = reference_view_unordered(&[3, 1, 2], |_: &i32| true, |x: &i32| *x);
        assert_eq!(view, vec![3, 1, 2]);
    }
}
