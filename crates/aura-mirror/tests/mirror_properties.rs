//! Property-Based Tests for Mirror Synchronization
//!
//! After any sequence of source mutations, the target must equal the view
//! recomputed from scratch over the source's current contents.
//!
//! ## Pipelines Tested
//!
//! 1. Identity copy
//! 2. Filter only (exercises position translation)
//! 3. Filter, selector and orderer together
//! 4. Orderer with many ties under `FirstEquivalent`
//! 5. Set algebra over `ObservableHashSet`

use aura_collections::{ObservableHashSet, ObservableVec};
use aura_mirror::{mirror, shared, MirrorBuilder, MirrorConfig, RemovalPolicy};
use aura_testkit::strategies::{arb_set_ops, arb_values, arb_vec_ops, proptest};
use aura_testkit::{apply_set_op, apply_vec_op, reference_view, reference_view_unordered};
use proptest::prelude::*;

fn is_even(x: &i32) -> bool {
    x % 2 == 0
}

proptest! {
    /// Property: an identity mirror is always a copy of the source
    #[test]
    fn prop_identity_mirror_tracks_source(initial in arb_values(8), ops in arb_vec_ops(40)) {
        let source = ObservableVec::from(initial);
        let target = shared(Vec::new());
        mirror(&source, target.clone()).unwrap();

        for op in &ops {
            apply_vec_op(&source, op).unwrap();
            let actual = target.read().clone();
            prop_assert_eq!(actual, source.to_vec(), "after {:?}", op);
        }
    }

    /// Property: a filtered, unordered mirror keeps source order
    #[test]
    fn prop_filtered_mirror_tracks_source(initial in arb_values(8), ops in arb_vec_ops(40)) {
        let source = ObservableVec::from(initial);
        let target = shared(Vec::new());
        MirrorBuilder::identity()
            .filter(is_even)
            .target(target.clone())
            .start(&source)
            .unwrap();

        for op in &ops {
            apply_vec_op(&source, op).unwrap();
            let expected = reference_view_unordered(&source.to_vec(), is_even, |x: &i32| *x);
            let actual = target.read().clone();
            prop_assert_eq!(actual, expected, "after {:?}", op);
        }
    }

    /// Property: the full pipeline matches a stable sort of the projection
    ///
    /// Equal values tie under the orderer, so only one of them may leave per
    /// removal.
    #[test]
    fn prop_full_pipeline_tracks_source(initial in arb_values(8), ops in arb_vec_ops(40)) {
        let source = ObservableVec::from(initial);
        let target = shared(Vec::new());
        MirrorBuilder::new()
            .filter(|x: &i32| *x >= -10)
            .select(|x: &i32| i64::from(*x) * 3)
            .order_by(|a: &i64, b: &i64| b.cmp(a))
            .config(MirrorConfig::default().with_removal_policy(RemovalPolicy::FirstEquivalent))
            .target(target.clone())
            .start(&source)
            .unwrap();

        for op in &ops {
            apply_vec_op(&source, op).unwrap();
            let expected = reference_view(
                &source.to_vec(),
                |x: &i32| *x >= -10,
                |x: &i32| i64::from(*x) * 3,
                Some(|a: &i64, b: &i64| b.cmp(a)),
            );
            let actual = target.read().clone();
            prop_assert_eq!(actual, expected, "after {:?}", op);
        }
    }

    /// Property: with the first-equivalent policy, ties never over-remove
    ///
    /// The orderer only looks at the value's magnitude bucket, so most items
    /// tie. Compared as multisets of buckets, since which tie survives is
    /// not tracked.
    #[test]
    fn prop_first_equivalent_keeps_bucket_counts(initial in arb_values(8), ops in arb_vec_ops(40)) {
        let bucket = |x: &i32| x.abs() / 5;
        let source = ObservableVec::from(initial);
        let target = shared(Vec::new());
        MirrorBuilder::identity()
            .order_by(move |a: &i32, b: &i32| bucket(a).cmp(&bucket(b)))
            .config(MirrorConfig::default().with_removal_policy(RemovalPolicy::FirstEquivalent))
            .target(target.clone())
            .start(&source)
            .unwrap();

        for op in &ops {
            apply_vec_op(&source, op).unwrap();
            let actual: Vec<i32> = target.read().iter().map(bucket).collect();
            let mut expected: Vec<i32> = source.to_vec().iter().map(bucket).collect();
            expected.sort_unstable();
            prop_assert_eq!(actual, expected, "after {:?}", op);
        }
    }

    /// Property: set algebra keeps a filtered set mirror consistent
    #[test]
    fn prop_hash_set_mirror_tracks_source(ops in arb_set_ops(40)) {
        let source = ObservableHashSet::new();
        let target = shared(Vec::new());
        MirrorBuilder::identity()
            .filter(is_even)
            .target(target.clone())
            .start(&source)
            .unwrap();

        for op in &ops {
            apply_set_op(&source, op).unwrap();
            let expected = reference_view_unordered(&source.to_vec(), is_even, |x: &i32| *x);
            let actual = target.read().clone();
            prop_assert_eq!(actual, expected, "after {:?}", op);
        }
    }
}
