/*
 * SPDX-FileCopyrightText: 2024 Tommaso Fontana
 * SPDX-FileCopyrightText: 2024 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Label specificity scoring and the four community-update procedures.

use std::collections::HashMap;

use rand::Rng;

use crate::error::Result;
use crate::iterator::LabelIterator;
use crate::neighbors::NeighborView;
use crate::partition::Partition;

/// Score every node in `node_iter` against every label in `label_iter`
/// (reshuffled between nodes) and stage the highest-scoring label, then
/// commit. Returns whether any node's staged label differs from its prior
/// committed label.
///
/// The score of label `l` for node `i` is `o[l] - kin * g[l]`, where `o[l]`
/// is the weight `i` receives from neighbours currently labelled `l`,
/// `kin` is `i`'s total incoming weight, and `g[l]` is `l`'s share of the
/// whole graph's edge weight. Ties go to the later-seen label, which is
/// fair because the label iterator is randomised.
pub(crate) fn find_most_specific_labels(
    view: &impl NeighborView,
    partition: &mut Partition,
    node_iter: LabelIterator,
    mut label_iter: LabelIterator,
    rng: &mut impl Rng,
) -> bool {
    let global = global_label_distribution(view, partition);

    for node in node_iter {
        let mut local: HashMap<usize, f64> = HashMap::new();
        let mut kin = 0.0;
        for (j, &nei) in view.neighbors(node).iter().enumerate() {
            let w = view.edge_weight(node, j);
            kin += w;
            *local.entry(partition.label(nei)).or_insert(0.0) += w;
        }

        let mut best_label = partition.label(node);
        let mut best_score = f64::NEG_INFINITY;
        label_iter.reset();
        let labels: Vec<usize> = label_iter.clone().collect();
        for l in labels {
            let o = local.get(&l).copied().unwrap_or(0.0);
            let g = global.get(&l).copied().unwrap_or(0.0);
            let score = o - kin * g;
            if score >= best_score {
                best_score = score;
                best_label = l;
            }
        }

        partition.add_to_stage(node, best_label, best_score);
        label_iter.shuffle(rng);
    }

    let changed = (0..partition.n_nodes()).any(|i| partition.staged_label(i) != partition.label(i));
    partition.commit_changes();
    changed
}

fn global_label_distribution(view: &impl NeighborView, partition: &Partition) -> HashMap<usize, f64> {
    let total = view.total_weight();
    let mut g: HashMap<usize, f64> = HashMap::new();
    if total == 0.0 {
        return g;
    }

    for i in 0..view.vcount() {
        for (j, &nei) in view.neighbors(i).iter().enumerate() {
            let w = view.edge_weight(i, j);
            *g.entry(partition.label(nei)).or_insert(0.0) += w / total;
        }
    }
    g
}

/// Typical update: [`find_most_specific_labels`] over 90% of nodes, chosen
/// at random.
pub(crate) fn typical_mode(
    view: &impl NeighborView,
    partition: &mut Partition,
    rng: &mut impl Rng,
) -> bool {
    let nodes = LabelIterator::random_nodes(partition, 0.9, rng);
    let labels = LabelIterator::random_labels(partition, 0.0, rng);
    find_most_specific_labels(view, partition, nodes, labels, rng)
}

/// Nurture update: [`find_most_specific_labels`] over the worst-fitting 90%
/// of nodes by current specificity.
pub(crate) fn nurture_mode(
    view: &impl NeighborView,
    partition: &mut Partition,
    rng: &mut impl Rng,
) -> bool {
    let k = ((0.9 * partition.n_nodes() as f64).floor() as usize).min(partition.n_nodes());
    let nodes = LabelIterator::k_worst_fit_nodes(partition, k);
    let labels = LabelIterator::random_labels(partition, 0.0, rng);
    find_most_specific_labels(view, partition, nodes, labels, rng)
}

/// Split large, poorly-fitting communities into several fresh sub-labels.
///
/// For the worst-fitting 90% of nodes, every label whose population is at
/// least `min_community_size` gets `k = clamp(count_to_move / median, 2,
/// 10)` fresh labels allocated; each selected node still carrying that
/// label is reassigned to a uniformly random draw among them.
///
/// # Errors
///
/// Returns an error if the partition's label pool cannot grow further.
pub(crate) fn burst_large_communities(
    partition: &mut Partition,
    min_community_size: usize,
    rng: &mut impl Rng,
) -> Result<()> {
    let k = ((0.9 * partition.n_nodes() as f64).floor() as usize).min(partition.n_nodes());
    let worst: Vec<usize> = LabelIterator::k_worst_fit_nodes(partition, k).collect();

    let mut count_to_move: HashMap<usize, usize> = HashMap::new();
    for &node in &worst {
        let c = partition.label(node);
        if partition.community_size(c) >= min_community_size {
            *count_to_move.entry(c).or_insert(0) += 1;
        }
    }

    let median = partition.median_community_size();
    let mut fresh_labels: HashMap<usize, Vec<usize>> = HashMap::new();
    for (&c, &count) in &count_to_move {
        let split = if median > 0.0 {
            ((count as f64 / median).round() as i64).clamp(2, 10) as usize
        } else {
            2
        };
        let mut labels = Vec::with_capacity(split);
        for _ in 0..split {
            labels.push(partition.new_label()?);
        }
        fresh_labels.insert(c, labels);
    }

    for &node in &worst {
        let c = partition.label(node);
        if let Some(labels) = fresh_labels.get(&c) {
            let pick = labels[rng.gen_range(0..labels.len())];
            partition.add_to_stage(node, pick, partition.quality(node));
        }
    }

    partition.commit_changes();
    Ok(())
}

/// Merge pairs of communities whose connectivity exceeds what their sizes
/// would predict under a null model. Returns `true` when the pass is
/// stable (no merge happened), mirroring the convergence signal the
/// tracker watches for.
///
/// `max_prev_merge_threshold` is a running high-water mark the tracker
/// carries across steps; it is only ever raised here, never lowered.
///
/// # Errors
///
/// This function is infallible today but returns [`Result`] to match the
/// other mode procedures and leave room for a fallible cross-talk
/// computation in the future (e.g. should it grow to use checked
/// allocation for very large label pools).
pub(crate) fn merge_well_connected_communities(
    view: &impl NeighborView,
    partition: &mut Partition,
    max_prev_merge_threshold: &mut f64,
) -> Result<bool> {
    let total = view.total_weight();
    if total == 0.0 {
        return Ok(true);
    }

    let mut cross_talk: HashMap<(usize, usize), f64> = HashMap::new();
    for i in 0..view.vcount() {
        let b = partition.label(i);
        for (j, &nei) in view.neighbors(i).iter().enumerate() {
            let a = partition.label(nei);
            let w = view.edge_weight(i, j) / total;
            *cross_talk.entry((a, b)).or_insert(0.0) += w;
        }
    }

    let occupied: Vec<usize> = (0..=partition.max_label())
        .filter(|&l| partition.community_size(l) > 0)
        .collect();

    let mut row_sum: HashMap<usize, f64> = HashMap::new();
    let mut col_sum: HashMap<usize, f64> = HashMap::new();
    for (&(a, b), &w) in &cross_talk {
        *row_sum.entry(a).or_insert(0.0) += w;
        *col_sum.entry(b).or_insert(0.0) += w;
    }
    let r = |l: usize| row_sum.get(&l).copied().unwrap_or(0.0);
    let s = |l: usize| col_sum.get(&l).copied().unwrap_or(0.0);
    let c = |a: usize, b: usize| cross_talk.get(&(a, b)).copied().unwrap_or(0.0);

    let mut best_partner: HashMap<usize, usize> = HashMap::new();
    let mut best_delta: HashMap<usize, f64> = HashMap::new();
    for (idx, &a) in occupied.iter().enumerate() {
        for &b in occupied.iter().skip(idx + 1) {
            let delta = c(a, b) + c(b, a) - r(a) * s(b) - r(b) * s(a);
            if delta > best_delta.get(&a).copied().unwrap_or(0.0) {
                best_delta.insert(a, delta);
                best_partner.insert(a, b);
            }
            if delta > best_delta.get(&b).copied().unwrap_or(0.0) {
                best_delta.insert(b, delta);
                best_partner.insert(b, a);
            }
        }
    }

    let positive: Vec<usize> = occupied
        .iter()
        .copied()
        .filter(|l| best_delta.get(l).copied().unwrap_or(0.0) > 0.0)
        .collect();
    let p = positive.len();
    if p == 0 {
        return Ok(true);
    }

    let mut normalized: HashMap<usize, f64> = HashMap::new();
    let mut sum_t = 0.0;
    for &l in &positive {
        let partner = best_partner[&l];
        let denom = (partition.community_size(l) + partition.community_size(partner)) as f64;
        let norm = if denom > 0.0 { best_delta[&l] / denom } else { 0.0 };
        normalized.insert(l, norm);
        sum_t += norm;
    }
    let t = sum_t / p as f64;

    if t > *max_prev_merge_threshold {
        *max_prev_merge_threshold = t;
    }
    if t < 0.5 * *max_prev_merge_threshold {
        return Ok(true);
    }

    let mut all_norm: Vec<f64> = occupied
        .iter()
        .map(|l| normalized.get(l).copied().unwrap_or(0.0))
        .collect();
    all_norm.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median_delta = if all_norm.is_empty() {
        0.0
    } else {
        let mid = all_norm.len() / 2;
        if all_norm.len() % 2 == 0 {
            (all_norm[mid - 1] + all_norm[mid]) / 2.0
        } else {
            all_norm[mid]
        }
    };

    let mut sorted: Vec<usize> = positive;
    sorted.sort_by(|a, b| {
        normalized[b]
            .partial_cmp(&normalized[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut merged = std::collections::HashSet::new();
    let mut any_merge = false;
    for l in sorted {
        if normalized[&l] <= median_delta {
            break;
        }
        if merged.contains(&l) {
            continue;
        }
        let partner = best_partner[&l];
        if merged.contains(&partner) {
            continue;
        }
        if partition.community_size(l) < 2 || partition.community_size(partner) < 2 {
            continue;
        }

        partition.merge_labels(l, partner);
        merged.insert(l);
        merged.insert(partner);
        any_merge = true;
    }

    if any_merge {
        partition.commit_changes();
    }

    Ok(!any_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neighbors::OwnedNeighborView;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn two_cliques() -> OwnedNeighborView {
        // Two disjoint triangles, node 5 bridges them weakly.
        OwnedNeighborView::new(
            vec![
                vec![0, 1, 2],
                vec![0, 1, 2],
                vec![0, 1, 2],
                vec![3, 4, 5],
                vec![3, 4, 5],
                vec![3, 4, 5, 0],
            ],
            None,
        )
    }

    #[test]
    fn typical_mode_commits_and_reports_change() {
        let view = two_cliques();
        let mut partition = Partition::new(vec![0, 1, 2, 3, 4, 5]);
        let mut rng = SmallRng::seed_from_u64(1);
        let changed = typical_mode(&view, &mut partition, &mut rng);
        assert!(changed);
    }

    #[test]
    fn merge_returns_stable_when_graph_has_one_label() {
        let view = two_cliques();
        let mut partition = Partition::new(vec![0; 6]);
        partition.commit_changes();
        let mut threshold = 0.0;
        let stable = merge_well_connected_communities(&view, &mut partition, &mut threshold)
            .expect("infallible here");
        assert!(stable);
    }

    #[test]
    fn burst_large_communities_only_touches_eligible_labels() {
        let view = two_cliques();
        let mut partition = Partition::new(vec![0, 0, 0, 0, 0, 0]);
        partition.commit_changes();
        let mut rng = SmallRng::seed_from_u64(3);
        burst_large_communities(&mut partition, 2, &mut rng).expect("allocates");
        assert!(partition.n_labels() >= 2);
    }
}
