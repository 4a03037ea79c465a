/*
 * SPDX-FileCopyrightText: 2024 Tommaso Fontana
 * SPDX-FileCopyrightText: 2024 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Multi-run bootstrap and NMI-based representative-partition selection.

use log::debug;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::core;
use crate::error::{Result, Se2Error};
use crate::neighbors::NeighborView;
use crate::nmi;
use crate::options::ResolvedOptions;
use crate::seed;

/// Run `independent_runs` independent clusterings (each saving
/// `target_partitions` snapshots) on a shared thread pool, then return the
/// single saved partition with the largest summed pairwise NMI against
/// every other saved partition.
///
/// Every run seeds its own RNG as `opts.random_seed + run_index`, so the
/// set of seed labellings is identical regardless of how work is
/// distributed across threads; only which worker happens to execute which
/// run can vary with `max_threads`.
///
/// # Errors
///
/// Propagates the first [`crate::error::Se2Error`] raised by any run, or
/// an [`Se2Error::InvalidOption`] if the thread pool itself could not be
/// built for the requested `max_threads`.
pub fn bootstrap(view: &impl NeighborView, opts: &ResolvedOptions) -> Result<Vec<usize>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(opts.max_threads)
        .build()
        .map_err(|e| Se2Error::InvalidOption {
            field: "max_threads",
            message: e.to_string(),
        })?;

    debug!(
        "bootstrapping {} independent runs across {} threads",
        opts.independent_runs, opts.max_threads
    );

    let per_run: Result<Vec<Vec<Vec<usize>>>> = pool.install(|| {
        (0..opts.independent_runs)
            .into_par_iter()
            .map(|run_i| {
                let mut rng = SmallRng::seed_from_u64(opts.random_seed + run_i as u64);
                let seed_labels = seed::seed(view, opts.target_clusters, &mut rng);
                core::run(view, seed_labels, opts, &mut rng)
            })
            .collect()
    });

    let partition_store: Vec<Vec<usize>> = per_run?.into_iter().flatten().collect();
    Ok(select_representative(&partition_store))
}

/// Pick the partition with the largest summed NMI against every other
/// partition in the store, breaking ties toward the lowest index.
fn select_representative(partition_store: &[Vec<usize>]) -> Vec<usize> {
    let n = partition_store.len();
    let mut nmi_sum = vec![0.0_f64; n];
    for i in 0..n {
        for j in 0..n {
            if i != j {
                nmi_sum[i] += nmi::nmi(&partition_store[i], &partition_store[j]);
            }
        }
    }

    let mut best = 0;
    for i in 1..n {
        if nmi_sum[i] > nmi_sum[best] {
            best = i;
        }
    }

    partition_store[best].clone()
}
