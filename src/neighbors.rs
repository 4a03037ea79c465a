/*
 * SPDX-FileCopyrightText: 2024 Tommaso Fontana
 * SPDX-FileCopyrightText: 2024 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Abstract adjacency view consumed by the clustering engine.

use crate::error::{Result, Se2Error};

/// Immutable adjacency (plus optional per-edge weight) view over a graph of
/// `N` nodes, indexed `[0, N)`.
///
/// For directed graphs `neighbors(i)` holds *incoming* neighbours, matching
/// the convention label propagation reads against: a node's label is
/// influenced by who points at it.
pub trait NeighborView {
    /// Number of nodes, `N`.
    fn vcount(&self) -> usize;

    /// Incoming neighbours of node `i`.
    fn neighbors(&self, i: usize) -> &[usize];

    /// Whether this view carries edge weights.
    fn has_weights(&self) -> bool;

    /// Per-edge weights of node `i`, parallel to `neighbors(i)`. Only
    /// meaningful when [`NeighborView::has_weights`] is `true`.
    fn weights(&self, i: usize) -> &[f64];

    /// Total edge count, `Σ |neighbors(i)|`.
    fn ecount(&self) -> usize {
        (0..self.vcount()).map(|i| self.neighbors(i).len()).sum()
    }

    /// Total edge weight, `Σ w`. `1.0` per edge when unweighted.
    fn total_weight(&self) -> f64 {
        if self.has_weights() {
            (0..self.vcount()).map(|i| self.weights(i).iter().sum::<f64>()).sum()
        } else {
            self.ecount() as f64
        }
    }

    /// Weight of the edge from neighbour at position `j` of node `i`'s
    /// neighbour list, or `1.0` when unweighted.
    fn edge_weight(&self, i: usize, j: usize) -> f64 {
        if self.has_weights() {
            self.weights(i)[j]
        } else {
            1.0
        }
    }
}

/// Owned [`NeighborView`] built from plain `Vec`s; the type the public API
/// actually constructs and consumes.
#[derive(Debug, Clone)]
pub struct OwnedNeighborView {
    neighbors: Vec<Vec<usize>>,
    weights: Option<Vec<Vec<f64>>>,
}

impl OwnedNeighborView {
    /// Build a view without validating the weight-list-length invariant.
    /// Prefer [`OwnedNeighborView::try_new`] unless the caller has already
    /// validated the lengths itself.
    #[must_use]
    pub fn new(neighbors: Vec<Vec<usize>>, weights: Option<Vec<Vec<f64>>>) -> Self {
        OwnedNeighborView { neighbors, weights }
    }

    /// Build a view, checking that every weight list's length matches its
    /// neighbour list's length.
    ///
    /// # Errors
    ///
    /// Returns [`Se2Error::MismatchedWeightLength`] naming the first
    /// offending node.
    pub fn try_new(neighbors: Vec<Vec<usize>>, weights: Option<Vec<Vec<f64>>>) -> Result<Self> {
        if let Some(ref w) = weights {
            for (node, (n, wl)) in neighbors.iter().zip(w.iter()).enumerate() {
                if n.len() != wl.len() {
                    return Err(Se2Error::MismatchedWeightLength {
                        node,
                        expected: n.len(),
                        actual: wl.len(),
                    });
                }
            }
        }

        Ok(OwnedNeighborView { neighbors, weights })
    }

    /// Mutable access to the per-node weight lists, used by the reweigher.
    /// `None` for unweighted graphs.
    pub(crate) fn weights_mut(&mut self) -> Option<&mut Vec<Vec<f64>>> {
        self.weights.as_mut()
    }

    /// Immutable access to every node's weight list at once, used by the
    /// reweigher's skewness computation. `None` for unweighted graphs.
    pub(crate) fn weights_ref(&self) -> Option<&Vec<Vec<f64>>> {
        self.weights.as_ref()
    }

    /// Mutable access to the per-node neighbour lists, used by the
    /// reweigher to install/dedupe self-loops.
    pub(crate) fn neighbors_mut(&mut self) -> &mut Vec<Vec<usize>> {
        &mut self.neighbors
    }

    /// Build a sub-view over a subset of nodes, renumbered to `[0, |ids|)`
    /// and with neighbours outside the subset dropped. Used by the
    /// hierarchical driver to run bootstrap on one community at a time.
    #[must_use]
    pub fn subview(&self, ids: &[usize]) -> OwnedNeighborView {
        let mut global_to_local = vec![None; self.vcount()];
        for (local, &global) in ids.iter().enumerate() {
            global_to_local[global] = Some(local);
        }

        let mut neighbors = Vec::with_capacity(ids.len());
        let mut weights = self.weights.as_ref().map(|_| Vec::with_capacity(ids.len()));

        for &global in ids {
            let mut local_neighbors = Vec::new();
            let mut local_weights = Vec::new();
            for (j, &n) in self.neighbors[global].iter().enumerate() {
                if let Some(local) = global_to_local[n] {
                    local_neighbors.push(local);
                    if self.has_weights() {
                        local_weights.push(self.weights(global)[j]);
                    }
                }
            }
            neighbors.push(local_neighbors);
            if let Some(ref mut w) = weights {
                w.push(local_weights);
            }
        }

        OwnedNeighborView { neighbors, weights }
    }
}

impl NeighborView for OwnedNeighborView {
    fn vcount(&self) -> usize {
        self.neighbors.len()
    }

    fn neighbors(&self, i: usize) -> &[usize] {
        &self.neighbors[i]
    }

    fn has_weights(&self) -> bool {
        self.weights.is_some()
    }

    fn weights(&self, i: usize) -> &[f64] {
        self.weights
            .as_ref()
            .map(|w| w[i].as_slice())
            .unwrap_or(&[])
    }
}
