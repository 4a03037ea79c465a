/*
 * SPDX-FileCopyrightText: 2024 Tommaso Fontana
 * SPDX-FileCopyrightText: 2024 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Error type returned by every fallible entry point in this crate.

use thiserror::Error;

/// Everything that can go wrong while building a neighbour view, validating
/// options, or running the clustering engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Se2Error {
    /// A node's weight list has a different length than its neighbour list.
    #[error("node {node} has {actual} weights but {expected} neighbours")]
    MismatchedWeightLength {
        /// Index of the offending node.
        node: usize,
        /// Expected weight-list length (the neighbour-list length).
        expected: usize,
        /// Actual weight-list length supplied.
        actual: usize,
    },

    /// A configuration field failed validation.
    #[error("invalid option `{field}`: {message}")]
    InvalidOption {
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable description of why it was rejected.
        message: String,
    },

    /// A size computation (growing a label pool, a partition store, ...)
    /// would overflow `usize`.
    #[error("capacity overflow while computing size of {what}")]
    CapacityOverflow {
        /// What was being sized when the overflow was detected.
        what: &'static str,
    },

    /// The graph has zero nodes, so no membership can be defined.
    #[error("graph has no nodes")]
    EmptyGraph,
}

/// Convenience alias used throughout the crate's public API.
pub type Result<T> = std::result::Result<T, Se2Error>;
