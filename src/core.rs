/*
 * SPDX-FileCopyrightText: 2024 Tommaso Fontana
 * SPDX-FileCopyrightText: 2024 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Single independent-run core loop: select a mode, run it, decide
//! whether to save a snapshot or terminate.

use rand::Rng;

use crate::error::Result;
use crate::labeller;
use crate::neighbors::NeighborView;
use crate::options::ResolvedOptions;
use crate::partition::Partition;
use crate::tracker::{Mode, Tracker};

/// Run one independent clustering until `opts.target_partitions`
/// post-intervention snapshots have been saved, returning those snapshots
/// as dense, reindexed membership vectors.
///
/// # Errors
///
/// Propagates any [`crate::error::Se2Error::CapacityOverflow`] raised while
/// bursting a community (label-pool growth) or merging communities.
pub(crate) fn run(
    view: &impl NeighborView,
    seed_labels: Vec<usize>,
    opts: &ResolvedOptions,
    rng: &mut impl Rng,
) -> Result<Vec<Vec<usize>>> {
    let n = view.vcount();
    let mut partition = Partition::new(seed_labels);
    let mut tracker = Tracker::new(opts.target_partitions, opts.discard_transient);
    let mut saved = Vec::with_capacity(opts.target_partitions);

    loop {
        let mode = tracker.select_mode();
        let changed_or_stable = match mode {
            Mode::Typical => {
                if tracker.skip_typical() {
                    false
                } else {
                    labeller::typical_mode(view, &mut partition, rng)
                }
            }
            Mode::Nurture => labeller::nurture_mode(view, &mut partition, rng),
            Mode::Bubble => {
                labeller::burst_large_communities(&mut partition, opts.minclust, rng)?;
                true
            }
            Mode::Merge => labeller::merge_well_connected_communities(
                view,
                &mut partition,
                tracker.max_prev_merge_threshold(),
            )?,
        };

        tracker.post_step_hook(mode, changed_or_stable, &partition);

        if tracker.do_save_partition() {
            let mut dest = vec![0usize; n];
            partition.store(&mut dest);
            saved.push(dest);
        }

        if tracker.do_terminate() {
            break;
        }
    }

    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neighbors::OwnedNeighborView;
    use crate::options::Se2Options;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn saves_exactly_target_partitions() {
        let neighbors: Vec<Vec<usize>> = (0..20)
            .map(|i| vec![(i + 19) % 20, i, (i + 1) % 20])
            .collect();
        let view = OwnedNeighborView::new(neighbors, None);
        let mut opts = Se2Options::default();
        opts.target_partitions = 3;
        opts.discard_transient = 1;
        let resolved = opts.resolve(20).expect("resolves");

        let mut rng = SmallRng::seed_from_u64(resolved.random_seed);
        let seed = crate::seed::seed(&view, resolved.target_clusters, &mut rng);
        let saved = run(&view, seed, &resolved, &mut rng).expect("completes");
        assert_eq!(saved.len(), resolved.target_partitions);
        for partition in &saved {
            assert_eq!(partition.len(), 20);
        }
    }
}
