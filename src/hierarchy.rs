/*
 * SPDX-FileCopyrightText: 2024 Tommaso Fontana
 * SPDX-FileCopyrightText: 2024 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Hierarchical sub-clustering driver: the crate's top-level entry point.

use log::info;

use crate::bootstrap::bootstrap;
use crate::error::Result;
use crate::neighbors::{NeighborView, OwnedNeighborView};
use crate::options::Se2Options;
use crate::reweigh::reweigh;

/// Run SpeakEasy 2 end to end: reweigh `view`, bootstrap a top-level
/// partition, then for each subsequent level sub-cluster every community
/// from the level above.
///
/// Returns `membership[level][node]`, a dense 0-based labelling per row.
///
/// # Errors
///
/// Propagates any [`crate::error::Se2Error`] raised while resolving
/// options or running a bootstrap at any level.
pub fn speak_easy_2(mut view: OwnedNeighborView, opts: &Se2Options) -> Result<Vec<Vec<usize>>> {
    let resolved = opts.resolve(view.vcount())?;
    reweigh(&mut view);

    info!(
        "level 0: bootstrapping {} independent runs over {} nodes",
        resolved.independent_runs,
        view.vcount()
    );
    let row0 = bootstrap(&view, &resolved)?;
    let mut membership = vec![row0];

    for level in 1..resolved.subcluster {
        let prev = membership[level - 1].clone();
        let min = prev.iter().copied().min().unwrap_or(0);
        let max = prev.iter().copied().max().unwrap_or(0);
        // Deliberately `max - min`, not `max - min + 1`: a previous-level
        // community at label `max` is visited as the last iteration of a
        // half-open range, matching how the level above was produced.
        let n_comms = max.saturating_sub(min);

        info!(
            "level {}: sub-clustering {} communities",
            level, n_comms
        );

        let mut local_memb = vec![0usize; view.vcount()];
        let mut max_sub_label = vec![0usize; n_comms.max(1)];

        for c_idx in 0..n_comms {
            let c = min + c_idx;
            let members: Vec<usize> = (0..view.vcount()).filter(|&i| prev[i] == c).collect();
            if members.is_empty() {
                continue;
            }

            if members.len() <= resolved.minclust {
                for &m in &members {
                    local_memb[m] = 0;
                }
                continue;
            }

            let mut sub_view = view.subview(&members);
            reweigh(&mut sub_view);
            let sub_resolved = opts.resolve(sub_view.vcount())?;
            let sub_membership = bootstrap(&sub_view, &sub_resolved)?;

            for (local_idx, &global) in members.iter().enumerate() {
                local_memb[global] = sub_membership[local_idx];
            }
            max_sub_label[c_idx] = sub_membership.iter().copied().max().unwrap_or(0);
        }

        // Re-label hierarchically: each parent community's sub-labels get
        // a disjoint global range, offset growing by `max sub-label + 1`
        // per parent visited in ascending order.
        let mut level_memb = vec![0usize; view.vcount()];
        let mut offset = 0usize;
        for c_idx in 0..n_comms {
            let c = min + c_idx;
            for i in 0..view.vcount() {
                if prev[i] == c {
                    level_memb[i] = local_memb[i] + offset;
                }
            }
            offset += max_sub_label[c_idx] + 1;
        }

        membership.push(level_memb);
    }

    Ok(membership)
}

/// For each level row of a membership matrix, return a permutation of
/// `[0, N)` that groups nodes by community: stable within a community,
/// communities visited in ascending label order. A visualisation helper,
/// not used internally by the clustering engine itself.
#[must_use]
pub fn order_nodes(membership: &[Vec<usize>]) -> Vec<Vec<usize>> {
    membership
        .iter()
        .map(|row| {
            let mut idx: Vec<usize> = (0..row.len()).collect();
            idx.sort_by_key(|&i| row[i]);
            idx
        })
        .collect()
}
