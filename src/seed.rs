/*
 * SPDX-FileCopyrightText: 2024 Tommaso Fontana
 * SPDX-FileCopyrightText: 2024 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Initial label assignment for a single clustering run.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::neighbors::NeighborView;

/// Produce an initial per-node label assignment.
///
/// Fills `labels[i] = i % target_clusters`, shuffles the assignment, then
/// gives every node whose only incoming neighbour is itself (i.e. an
/// isolated node, post-reweigh) a fresh singleton label above the current
/// maximum, so isolated nodes never get lumped in with an arbitrary
/// round-robin cluster.
pub(crate) fn seed(view: &impl NeighborView, target_clusters: usize, rng: &mut impl Rng) -> Vec<usize> {
    let n = view.vcount();
    let mut labels: Vec<usize> = (0..n).map(|i| i % target_clusters).collect();
    labels.shuffle(rng);

    let mut max_label = labels.iter().copied().max().unwrap_or(0);
    for i in 0..n {
        if view.neighbors(i).len() == 1 {
            max_label += 1;
            labels[i] = max_label;
        }
    }

    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neighbors::OwnedNeighborView;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn isolated_nodes_each_get_a_distinct_singleton() {
        let view = OwnedNeighborView::new(vec![vec![0], vec![1], vec![2, 0]], None);
        let mut rng = SmallRng::seed_from_u64(42);
        let labels = seed(&view, 2, &mut rng);
        assert_ne!(labels[0], labels[1]);
        assert!(labels[0] > 1);
        assert!(labels[1] > 1);
    }

    #[test]
    fn round_robin_respects_target_clusters() {
        let view = OwnedNeighborView::new(vec![vec![0, 1, 2]; 6], None);
        let mut rng = SmallRng::seed_from_u64(7);
        let labels = seed(&view, 3, &mut rng);
        let max = labels.iter().copied().max().unwrap();
        assert!(max < 3);
    }
}
