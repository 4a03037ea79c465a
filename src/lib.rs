//! # `speakeasy2`
//!
//! Label-propagation community detection (SpeakEasy 2) for weighted or
//! unweighted, directed or undirected graphs.
//!
//! The engine discovers a partition of nodes into communities by iterating
//! a family of update modes (typical propagation, bubbling, merging,
//! nurturing), sampling many candidate partitions across independent runs,
//! and electing the most representative one under normalised mutual
//! information. [`speak_easy_2`] is the top-level entry point; it accepts
//! an [`OwnedNeighborView`] and returns a membership matrix, one row per
//! hierarchy level.
//!
//! This crate does not read graphs from disk or from any particular graph
//! library — callers build an [`OwnedNeighborView`] from their own
//! adjacency representation.
//!
//! No logging subscriber is installed by this crate; instrumentation goes
//! through the [`log`] facade and a consuming binary decides whether (and
//! how) to surface it.

// No warnings
#![deny(warnings)]

// the code must be safe and shouldn't ever panic to be relayable
#![deny(clippy::todo)]
#![deny(unsafe_code)]
#![deny(clippy::panic)]
#![deny(clippy::panicking_unwrap)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

// for now we don't need any new feature but we might remove this in the future
#![deny(unstable_features)]

// no dead code
#![deny(dead_code)]
#![deny(trivial_casts)]
#![deny(unconditional_recursion)]
#![deny(clippy::empty_loop)]
#![deny(unreachable_code)]
#![deny(unreachable_pub)]
#![deny(unreachable_patterns)]
#![deny(unused_macro_rules)]
//#![deny(unused_results)]

// the code must be documented and everything should have a debug print implementation
#![deny(unused_doc_comments)]
#![deny(missing_docs)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![deny(clippy::missing_safety_doc)]
//#![deny(clippy::missing_doc_code_examples)]
//#![deny(clippy::missing_crate_level_docs)]
//#![deny(clippy::missing_docs_in_private_items)]
//#![deny(missing_debug_implementations)]

mod bootstrap;
mod core;
mod error;
mod hierarchy;
mod iterator;
mod labeller;
mod neighbors;
mod nmi;
mod options;
mod partition;
mod reweigh;
mod seed;
mod tracker;

pub use bootstrap::bootstrap;
pub use error::{Result, Se2Error};
pub use hierarchy::{order_nodes, speak_easy_2};
pub use neighbors::{NeighborView, OwnedNeighborView};
pub use options::{ResolvedOptions, Se2Options};
