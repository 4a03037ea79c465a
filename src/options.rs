/*
 * SPDX-FileCopyrightText: 2024 Tommaso Fontana
 * SPDX-FileCopyrightText: 2024 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Typed, validated configuration surface.

use crate::error::{Result, Se2Error};

/// Caller-facing configuration. A value of `0` (or `false`/`None` where
/// applicable) for a numeric field means "use the default" and is filled in
/// by [`Se2Options::resolve`]; the struct itself never silently rewrites what
/// the caller wrote.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Se2Options {
    /// Number of independent clusterings to run per hierarchy level.
    pub independent_runs: usize,
    /// Depth of the clustering hierarchy; number of rows in the output.
    pub subcluster: usize,
    /// Reserved; advisory only, not currently wired into any code path.
    pub multicommunity: usize,
    /// Number of partitions saved per independent run after the transient.
    pub target_partitions: usize,
    /// Expected number of clusters to seed with; `0` picks a default based
    /// on graph size.
    pub target_clusters: usize,
    /// Minimum community size eligible for sub-clustering or bubbling.
    pub minclust: usize,
    /// Number of initial intervention events to discard as transient.
    pub discard_transient: usize,
    /// Base RNG seed; run `k` within a bootstrap uses `random_seed + k`.
    /// `0` picks a random seed at resolve time.
    pub random_seed: u64,
    /// Size of the worker pool; `0` defaults to `independent_runs`.
    pub max_threads: usize,
    /// Reserved; advisory only.
    pub node_confidence: bool,
    /// Emit progress notices through the `log` facade.
    pub verbose: bool,
}

impl Default for Se2Options {
    fn default() -> Self {
        Se2Options {
            independent_runs: 10,
            subcluster: 1,
            multicommunity: 1,
            target_partitions: 5,
            target_clusters: 0,
            minclust: 5,
            discard_transient: 3,
            random_seed: 0,
            max_threads: 0,
            node_confidence: false,
            verbose: false,
        }
    }
}

/// [`Se2Options`] with every default placeholder filled in for a graph of a
/// specific size. This is what the engine actually runs against; a caller
/// inspecting the original [`Se2Options`] after construction still sees
/// their own un-resolved intent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedOptions {
    /// See [`Se2Options::independent_runs`].
    pub independent_runs: usize,
    /// See [`Se2Options::subcluster`].
    pub subcluster: usize,
    /// See [`Se2Options::multicommunity`].
    pub multicommunity: usize,
    /// See [`Se2Options::target_partitions`].
    pub target_partitions: usize,
    /// See [`Se2Options::target_clusters`].
    pub target_clusters: usize,
    /// See [`Se2Options::minclust`].
    pub minclust: usize,
    /// See [`Se2Options::discard_transient`].
    pub discard_transient: usize,
    /// See [`Se2Options::random_seed`].
    pub random_seed: u64,
    /// See [`Se2Options::max_threads`].
    pub max_threads: usize,
    /// See [`Se2Options::node_confidence`].
    pub node_confidence: bool,
    /// See [`Se2Options::verbose`].
    pub verbose: bool,
}

impl Se2Options {
    /// Fill in every default-dependent field for a graph with `n_nodes`
    /// nodes, then validate the result.
    ///
    /// # Errors
    ///
    /// Returns [`Se2Error::InvalidOption`] if any explicitly-set field is
    /// out of range, or [`Se2Error::EmptyGraph`] if `n_nodes == 0`.
    pub fn resolve(&self, n_nodes: usize) -> Result<ResolvedOptions> {
        if n_nodes == 0 {
            return Err(Se2Error::EmptyGraph);
        }

        let target_clusters = if self.target_clusters == 0 {
            if n_nodes < 10 {
                n_nodes
            } else {
                (n_nodes / 100).max(10)
            }
        } else {
            self.target_clusters
        };

        let independent_runs = if self.independent_runs == 0 {
            10
        } else {
            self.independent_runs
        };

        let max_threads = if self.max_threads == 0 {
            independent_runs
        } else {
            self.max_threads
        };

        let random_seed = if self.random_seed == 0 {
            rand::random::<u64>() % 9999 + 1
        } else {
            self.random_seed
        };

        let resolved = ResolvedOptions {
            independent_runs,
            subcluster: if self.subcluster == 0 { 1 } else { self.subcluster },
            multicommunity: if self.multicommunity == 0 {
                1
            } else {
                self.multicommunity
            },
            target_partitions: if self.target_partitions == 0 {
                5
            } else {
                self.target_partitions
            },
            target_clusters,
            minclust: if self.minclust == 0 { 5 } else { self.minclust },
            discard_transient: self.discard_transient,
            random_seed,
            max_threads,
            node_confidence: self.node_confidence,
            verbose: self.verbose,
        };

        resolved.validate(n_nodes)?;
        Ok(resolved)
    }
}

impl ResolvedOptions {
    /// Reject configurations that cannot produce a well-defined run.
    ///
    /// # Errors
    ///
    /// Returns [`Se2Error::InvalidOption`] describing the first offending
    /// field.
    pub fn validate(&self, n_nodes: usize) -> Result<()> {
        if self.independent_runs == 0 {
            return Err(Se2Error::InvalidOption {
                field: "independent_runs",
                message: "must be positive".into(),
            });
        }
        if self.subcluster == 0 {
            return Err(Se2Error::InvalidOption {
                field: "subcluster",
                message: "must be positive".into(),
            });
        }
        if self.target_partitions == 0 {
            return Err(Se2Error::InvalidOption {
                field: "target_partitions",
                message: "must be positive".into(),
            });
        }
        if self.target_clusters == 0 {
            return Err(Se2Error::InvalidOption {
                field: "target_clusters",
                message: "must be positive for a non-empty graph".into(),
            });
        }
        if self.target_clusters > n_nodes {
            return Err(Se2Error::InvalidOption {
                field: "target_clusters",
                message: format!("{} exceeds node count {}", self.target_clusters, n_nodes),
            });
        }
        if self.minclust == 0 {
            return Err(Se2Error::InvalidOption {
                field: "minclust",
                message: "must be at least 1".into(),
            });
        }
        if self.max_threads == 0 {
            return Err(Se2Error::InvalidOption {
                field: "max_threads",
                message: "must be positive".into(),
            });
        }

        Ok(())
    }
}
