//! Aura Mirror Testing Infrastructure
//!
//! Shared helpers for the integration and property tests of `aura-mirror` and
//! `aura-collections`: proptest strategies that generate container mutations,
//! a reference model of the mirrored view, and assertion macros.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! Add this to your crate's `Cargo.toml` dev-dependencies:
//! ```toml
//! [dev-dependencies]
//! aura-testkit = { path = "../aura-testkit" }
//! ```
//!
//! Then in your tests:
//! ```rust,no_run
//! use aura_testkit::*;
//!
//! #[test]
//! fn my_test() {
//!     init_test_tracing();
//!     let expected = reference_view(&[3, 1, 2], |_| true, |x| *x, Some(i32::cmp));
//!     assert_eq!(expected, vec![1, 2, 3]);
//! }
//! ```

pub mod assertions;
pub mod strategies;

pub use assertions::{reference_view, reference_view_unordered};
pub use strategies::{apply_set_op, apply_vec_op, arb_set_ops, arb_vec_ops, SetOp, VecOp};

use tracing_subscriber::EnvFilter;

/// Install a test subscriber once per process.
///
/// Honors `RUST_LOG` and falls back to `warn`. Output goes through the test
/// harness so it only shows for failing tests.
pub fn init_test_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
