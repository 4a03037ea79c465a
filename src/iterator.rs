/*
 * SPDX-FileCopyrightText: 2024 Tommaso Fontana
 * SPDX-FileCopyrightText: 2024 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Ordered/shuffled traversal over nodes or labels.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::partition::Partition;

/// Traversal over a pool of node or label ids, with an explicit `shuffle`/
/// `reset` lifecycle on top of the standard [`Iterator`] contract.
///
/// Construct with one of the four associated functions, then drive it as a
/// plain `Iterator<Item = usize>`; exhausting it is the idiomatic
/// replacement for the "peek past the end" sentinel the pool is drawn from.
#[derive(Debug, Clone)]
pub(crate) struct LabelIterator {
    ids: Vec<usize>,
    limit: usize,
    pos: usize,
}

impl LabelIterator {
    /// All `N` node indices, shuffled; yields the first
    /// `⌊fraction·N⌋` (`0` means all).
    #[must_use]
    pub(crate) fn random_nodes(partition: &Partition, fraction: f64, rng: &mut impl Rng) -> Self {
        let mut ids: Vec<usize> = (0..partition.n_nodes()).collect();
        ids.shuffle(rng);
        let limit = fraction_limit(fraction, ids.len());
        LabelIterator { ids, limit, pos: 0 }
    }

    /// Only currently-occupied labels, shuffled; yields the first
    /// `⌊fraction·k⌋` (`0` means all).
    #[must_use]
    pub(crate) fn random_labels(partition: &Partition, fraction: f64, rng: &mut impl Rng) -> Self {
        let mut ids: Vec<usize> = (0..=partition.max_label())
            .filter(|&l| partition.community_size(l) > 0)
            .collect();
        ids.shuffle(rng);
        let limit = fraction_limit(fraction, ids.len());
        LabelIterator { ids, limit, pos: 0 }
    }

    /// Node indices sorted ascending by quality (worst-fit first),
    /// truncated to `k`.
    #[must_use]
    pub(crate) fn k_worst_fit_nodes(partition: &Partition, k: usize) -> Self {
        let mut ids: Vec<usize> = (0..partition.n_nodes()).collect();
        ids.sort_by(|&a, &b| {
            partition
                .quality(a)
                .partial_cmp(&partition.quality(b))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ids.truncate(k.min(ids.len()));
        let limit = ids.len();
        LabelIterator { ids, limit, pos: 0 }
    }

    /// Externally supplied id array, yielding the first `n_iter` entries.
    #[must_use]
    pub(crate) fn from_vector(ids: Vec<usize>, n_iter: usize) -> Self {
        let limit = n_iter.min(ids.len());
        LabelIterator { ids, limit, pos: 0 }
    }

    /// Re-randomise the underlying id order and rewind.
    pub(crate) fn shuffle(&mut self, rng: &mut impl Rng) {
        self.ids.shuffle(rng);
        self.pos = 0;
    }

    /// Rewind without reshuffling.
    pub(crate) fn reset(&mut self) {
        self.pos = 0;
    }
}

impl Iterator for LabelIterator {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.pos >= self.limit {
            return None;
        }
        let v = self.ids[self.pos];
        self.pos += 1;
        Some(v)
    }
}

fn fraction_limit(fraction: f64, len: usize) -> usize {
    if fraction <= 0.0 {
        len
    } else {
        ((fraction * len as f64).floor() as usize).min(len)
    }
}
