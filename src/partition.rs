/*
 * SPDX-FileCopyrightText: 2024 Tommaso Fontana
 * SPDX-FileCopyrightText: 2024 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Two-slot (staged/committed) membership store with a free/reserved/
//! occupied label allocator.

use crate::error::{Result, Se2Error};

/// A label slot in [`Partition`]'s community-size index: free (no node
/// holds it), reserved (just allocated, not yet populated by a commit), or
/// occupied with the given population.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Free,
    Reserved,
    Occupied(usize),
}

impl Slot {
    fn population(self) -> usize {
        match self {
            Slot::Occupied(n) => n,
            Slot::Free | Slot::Reserved => 0,
        }
    }

    fn is_free(self) -> bool {
        matches!(self, Slot::Free)
    }
}

/// Mutable per-run clustering state: a committed `reference` labelling
/// consulted by readers, a `stage` labelling written by mode steps, a
/// per-node `quality` (specificity) score, and a label allocator backed by
/// `community_sizes`.
#[derive(Debug, Clone)]
pub(crate) struct Partition {
    stage: Vec<usize>,
    reference: Vec<usize>,
    quality: Vec<f64>,
    community_sizes: Vec<Slot>,
    n_labels: usize,
    max_label: usize,
}

impl Partition {
    /// Build a partition from a seed label vector. The initial
    /// `reference`/`stage` are both the seed; `quality` starts at `0.0`.
    #[must_use]
    pub(crate) fn new(initial_labels: Vec<usize>) -> Self {
        let n = initial_labels.len();
        let max_initial = initial_labels.iter().copied().max().unwrap_or(0);
        let mut community_sizes = vec![Slot::Free; max_initial + 1];
        for &label in &initial_labels {
            community_sizes[label] = match community_sizes[label] {
                Slot::Occupied(count) => Slot::Occupied(count + 1),
                _ => Slot::Occupied(1),
            };
        }
        let n_labels = community_sizes.iter().filter(|s| !s.is_free()).count();
        let max_label = community_sizes.len() - 1;

        Partition {
            stage: initial_labels.clone(),
            reference: initial_labels,
            quality: vec![0.0; n],
            community_sizes,
            n_labels,
            max_label,
        }
    }

    /// Number of nodes tracked by this partition.
    #[must_use]
    pub(crate) fn n_nodes(&self) -> usize {
        self.reference.len()
    }

    /// Committed label of `node`.
    #[must_use]
    pub(crate) fn label(&self, node: usize) -> usize {
        self.reference[node]
    }

    /// In-flight (staged) label of `node`.
    #[must_use]
    pub(crate) fn staged_label(&self, node: usize) -> usize {
        self.stage[node]
    }

    /// Specificity score last attributed to `node`'s staged label.
    #[must_use]
    pub(crate) fn quality(&self, node: usize) -> f64 {
        self.quality[node]
    }

    /// Full committed labelling.
    #[must_use]
    pub(crate) fn reference(&self) -> &[usize] {
        &self.reference
    }

    /// Count of labels with population `> 0`.
    #[must_use]
    pub(crate) fn n_labels(&self) -> usize {
        self.n_labels
    }

    /// Highest label index whose slot has ever been populated in this
    /// partition's lifecycle.
    #[must_use]
    pub(crate) fn max_label(&self) -> usize {
        self.max_label
    }

    /// Population of `label`; `0` for free or reserved slots.
    #[must_use]
    pub(crate) fn community_size(&self, label: usize) -> usize {
        self.community_sizes
            .get(label)
            .copied()
            .unwrap_or(Slot::Free)
            .population()
    }

    /// Median population over labels currently occupied.
    #[must_use]
    pub(crate) fn median_community_size(&self) -> f64 {
        let mut sizes: Vec<usize> = self
            .community_sizes
            .iter()
            .filter_map(|s| match s {
                Slot::Occupied(n) => Some(*n),
                _ => None,
            })
            .collect();
        if sizes.is_empty() {
            return 0.0;
        }
        sizes.sort_unstable();
        let mid = sizes.len() / 2;
        if sizes.len() % 2 == 0 {
            (sizes[mid - 1] + sizes[mid]) as f64 / 2.0
        } else {
            sizes[mid] as f64
        }
    }

    /// Write `stage[node] = label` with the given specificity score.
    /// Does not touch `community_sizes`.
    pub(crate) fn add_to_stage(&mut self, node: usize, label: usize, specificity: f64) {
        self.stage[node] = label;
        self.quality[node] = specificity;
    }

    /// Allocate a fresh label: the lowest free slot, growing the pool
    /// (doubling, minimum `n_nodes`) if none is free.
    ///
    /// # Errors
    ///
    /// Returns [`Se2Error::CapacityOverflow`] if growing the pool would
    /// overflow `usize`.
    pub(crate) fn new_label(&mut self) -> Result<usize> {
        if let Some(l) = self.community_sizes.iter().position(|s| s.is_free()) {
            self.community_sizes[l] = Slot::Reserved;
            self.n_labels += 1;
            self.max_label = self.max_label.max(l);
            return Ok(l);
        }

        let n_nodes = self.reference.len();
        let doubled = self
            .community_sizes
            .len()
            .checked_mul(2)
            .ok_or(Se2Error::CapacityOverflow { what: "partition label pool" })?;
        let new_capacity = doubled.max(n_nodes);
        if new_capacity <= self.community_sizes.len() {
            return Err(Se2Error::CapacityOverflow { what: "partition label pool" });
        }

        let l = self.community_sizes.len();
        self.community_sizes.resize(new_capacity, Slot::Free);
        self.community_sizes[l] = Slot::Reserved;
        self.n_labels += 1;
        self.max_label = self.max_label.max(l);
        Ok(l)
    }

    /// Rewrite every `stage[i] == c2` to `c1` (after swapping so the
    /// larger of the two survives), frees the other's slot.
    pub(crate) fn merge_labels(&mut self, c1: usize, c2: usize) {
        let (keep, drop) = if c1 >= c2 { (c1, c2) } else { (c2, c1) };
        if keep == drop {
            return;
        }

        for label in &mut self.stage {
            if *label == drop {
                *label = keep;
            }
        }

        self.community_sizes[drop] = Slot::Free;
        self.n_labels = self.n_labels.saturating_sub(1);

        while self.max_label > 0 && self.community_sizes[self.max_label].is_free() {
            self.max_label -= 1;
        }
    }

    /// Allocate a fresh label and write it into `stage[i]` for every `i`
    /// where `mask[i]` is `true`.
    ///
    /// # Errors
    ///
    /// Returns [`Se2Error::CapacityOverflow`] if allocation fails.
    pub(crate) fn relabel_mask(&mut self, mask: &[bool]) -> Result<usize> {
        let label = self.new_label()?;
        for (i, &selected) in mask.iter().enumerate() {
            if selected {
                self.stage[i] = label;
            }
        }
        Ok(label)
    }

    /// Copy `stage` into `reference`, then recount `community_sizes` and
    /// `n_labels` from the new `reference`. The label pool is trimmed to
    /// exactly `(highest occupied label) + 1`, so `max_label` always equals
    /// `community_sizes.len() - 1` immediately after a commit.
    pub(crate) fn commit_changes(&mut self) {
        self.reference.copy_from_slice(&self.stage);

        let max_label = self.reference.iter().copied().max().unwrap_or(0);
        let mut community_sizes = vec![Slot::Free; max_label + 1];
        for &label in &self.reference {
            community_sizes[label] = match community_sizes[label] {
                Slot::Occupied(count) => Slot::Occupied(count + 1),
                _ => Slot::Occupied(1),
            };
        }

        self.n_labels = community_sizes.iter().filter(|s| !s.is_free()).count();
        self.community_sizes = community_sizes;
        self.max_label = self.community_sizes.len() - 1;
    }

    /// Write the committed labelling into `dest`, reindexed so labels are
    /// dense and ascending in order of first appearance (the canonical
    /// form used for cross-partition comparison, e.g. NMI).
    pub(crate) fn store(&self, dest: &mut [usize]) {
        let mut remap = vec![None; self.max_label + 1];
        let mut next = 0usize;
        for (i, &label) in self.reference.iter().enumerate() {
            let canonical = *remap[label].get_or_insert_with(|| {
                let id = next;
                next += 1;
                id
            });
            dest[i] = canonical;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_label_never_reuses_an_occupied_slot() {
        let mut p = Partition::new(vec![0, 0, 1]);
        let before = p.n_labels();
        let l = p.new_label().expect("allocates");
        assert_eq!(p.community_size(l), 0);
        assert_eq!(p.n_labels(), before + 1);
    }

    #[test]
    fn merge_labels_reduces_label_count_and_preserves_node_count() {
        let mut p = Partition::new(vec![0, 1, 2, 0, 1]);
        p.commit_changes();
        let before_labels = p.n_labels();
        let before_nodes = p.n_nodes();
        p.merge_labels(0, 1);
        p.commit_changes();
        assert_eq!(p.n_labels(), before_labels - 1);
        assert_eq!(p.n_nodes(), before_nodes);
    }

    #[test]
    fn commit_changes_recounts_sizes_from_reference() {
        let mut p = Partition::new(vec![0, 0, 0]);
        p.add_to_stage(0, 1, 0.0);
        p.commit_changes();
        assert_eq!(p.label(0), 1);
        assert_eq!(p.community_size(1), 1);
        assert_eq!(p.community_size(0), 2);
        let total: usize = (0..=p.max_label()).map(|l| p.community_size(l)).sum();
        assert_eq!(total, p.n_nodes());
    }

    #[test]
    fn store_reindexes_densely_by_first_appearance() {
        let mut p = Partition::new(vec![5, 5, 3, 3, 5]);
        p.commit_changes();
        let mut dest = vec![0; 5];
        p.store(&mut dest);
        assert_eq!(dest, vec![0, 0, 1, 1, 0]);
    }

    #[test]
    fn store_is_idempotent_under_reindexing() {
        let mut p = Partition::new(vec![2, 0, 1, 1, 0]);
        p.commit_changes();
        let mut first = vec![0; 5];
        p.store(&mut first);

        let mut p2 = Partition::new(first.clone());
        p2.commit_changes();
        let mut second = vec![0; 5];
        p2.store(&mut second);
        assert_eq!(first, second);
    }

    #[test]
    fn relabel_mask_moves_only_selected_nodes() {
        let mut p = Partition::new(vec![0, 0, 0, 0]);
        p.commit_changes();
        let mask = vec![true, false, true, false];
        let label = p.relabel_mask(&mask).expect("allocates");
        p.commit_changes();
        assert_eq!(p.label(0), label);
        assert_eq!(p.label(2), label);
        assert_eq!(p.label(1), 0);
        assert_eq!(p.label(3), 0);
    }
}
