//! A height-balanced ordered index for embedded document stores.
//!
//! This crate provides [`AvlIndex`], an [AVL tree] that maps field values to
//! the documents holding them. It supports:
//!
//! - [`insert`](AvlIndex::insert) / [`delete`](AvlIndex::delete) - O(log n), with
//!   several values per key or an optional uniqueness constraint
//! - [`search`](AvlIndex::search) - all values stored under a key
//! - [`between_bounds`](AvlIndex::between_bounds) - values for keys inside a
//!   `$gt`/`$gte` and `$lt`/`$lte` window, in key order
//! - [`check_is_avl_tree`](AvlIndex::check_is_avl_tree) - a full structural audit for tests
//!
//! # Example
//!
//! ```
//! use avl_index::{AvlIndex, IndexOptions, RangeQuery};
//!
//! let mut index = AvlIndex::with_options(IndexOptions::new().unique(true));
//! for (age, doc) in [(31, "ann"), (25, "bob"), (40, "cy"), (19, "dee")] {
//!     index.insert(age, doc).unwrap();
//! }
//!
//! assert_eq!(index.search(&25), ["bob"]);
//!
//! let twenties_and_up: Vec<_> = index
//!     .between_bounds(&RangeQuery::new().gte(20).lt(40))
//!     .copied()
//!     .collect();
//! assert_eq!(twenties_and_up, ["bob", "ann"]);
//!
//! // Unique indexes reject a second value for the same key.
//! assert!(index.insert(31, "eve").is_err());
//! assert!(index.check_is_avl_tree().is_ok());
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`
//! - **Pluggable ordering** - Any [`KeyComparator`] and [`ValueEquality`], with
//!   `Ord`/`PartialEq` defaults
//! - **Structured logging** - Rotations, splices and constraint violations are
//!   reported through [`tracing`](https://docs.rs/tracing) when a subscriber is installed
//!
//! # Implementation
//!
//! Nodes live in an arena and link to each other by index, so the parent
//! back-links an AVL tree needs for rotations never form reference cycles.
//! Every insert and delete records the ancestors it passes and rebalances them
//! bottom-up in a single pass.
//!
//! [AVL tree]: https://en.wikipedia.org/wiki/AVL_tree

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod compare;
mod options;
mod raw;

pub mod avl_index;
pub mod error;

pub use avl_index::{AvlIndex, RangeQuery};
pub use compare::{KeyComparator, NaturalOrder, PartialEqValues, ValueEquality};
pub use error::{ErrorType, IndexError, InvariantViolation};
pub use options::IndexOptions;
