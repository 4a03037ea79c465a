/*
 * SPDX-FileCopyrightText: 2024 Tommaso Fontana
 * SPDX-FileCopyrightText: 2024 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Edge-weight normalisation and self-loop installation.

use log::{debug, info};

use crate::neighbors::{NeighborView, OwnedNeighborView};

const SKEWNESS_THRESHOLD: f64 = 2.0;

/// Normalise the weights of `view` in place and ensure every node has
/// exactly one self-loop, following the policy:
///
/// 1. Compute weight-distribution skewness; `>= 2.0` is "skewed".
/// 2. Divide every weight by the largest magnitude.
/// 3. Install exactly one self-loop per node (append if absent, dedupe if
///    present more than once).
/// 4. Weigh each self-loop: the mean signed link weight if skewed,
///    otherwise `1.0`.
/// 5. If skewed and no negative weights remain, blend every edge toward the
///    mean self-loop weight.
///
/// Unweighted graphs (`view.has_weights() == false`) skip every
/// weight-touching step but still receive self-loops.
pub(crate) fn reweigh(view: &mut OwnedNeighborView) {
    let weighted = view.has_weights();
    let is_skewed = weighted && skewness(view) >= SKEWNESS_THRESHOLD;

    if weighted {
        normalize(view);
    }

    install_self_loops(view, weighted, is_skewed);

    if weighted && is_skewed && !has_negatives(view) {
        add_offset(view);
    }
}

fn skewness(view: &OwnedNeighborView) -> f64 {
    let Some(weights) = view.weights_ref() else {
        return 0.0;
    };

    let n_edges = weights.iter().map(Vec::len).sum::<usize>();
    if n_edges == 0 {
        return 0.0;
    }

    let sum: f64 = weights.iter().flatten().sum();
    let avg = sum / n_edges as f64;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for w in weights.iter().flatten() {
        let value = w - avg;
        let value_sq = value * value;
        denominator += value_sq;
        numerator += value * value_sq;
    }

    denominator = denominator.sqrt();
    denominator = denominator * denominator * denominator;
    if denominator == 0.0 {
        return 0.0;
    }

    let mut skew = (numerator / n_edges as f64) / denominator;
    skew /= (n_edges as f64).sqrt();
    skew
}

fn normalize(view: &mut OwnedNeighborView) {
    let Some(weights) = view.weights_mut() else {
        return;
    };

    let max_magnitude = weights
        .iter()
        .flatten()
        .fold(0.0_f64, |acc, &w| acc.max(w.abs()));

    if max_magnitude == 0.0 {
        return;
    }

    for row in weights.iter_mut() {
        for w in row.iter_mut() {
            *w /= max_magnitude;
        }
    }
}

/// Ensure each node has exactly one self-loop. When `weighted`, also weighs
/// it: the mean signed link weight if `is_skewed`, otherwise `1.0`.
fn install_self_loops(view: &mut OwnedNeighborView, weighted: bool, is_skewed: bool) {
    let n_nodes = view.vcount();
    let mut diagonal_positions = vec![0usize; n_nodes];

    {
        let neighbors = view.neighbors_mut();
        for i in 0..n_nodes {
            let row = &mut neighbors[i];
            let mut found = false;
            let mut j = 0;
            while j < row.len() {
                if row[j] == i {
                    if found {
                        row.remove(j);
                        continue;
                    }
                    found = true;
                    diagonal_positions[i] = j;
                }
                j += 1;
            }

            if !found {
                row.push(i);
                diagonal_positions[i] = row.len() - 1;
            }
        }
    }

    if !weighted {
        return;
    }

    if let Some(weights) = view.weights_mut() {
        for (i, row) in weights.iter_mut().enumerate() {
            let target_len = row.len().max(diagonal_positions[i] + 1);
            row.resize(target_len, 0.0);
            row[diagonal_positions[i]] = 0.0;
        }
    }

    let diagonal_weights = if is_skewed {
        info!("high skew to edge weight distribution; reweighing main diagonal");
        mean_link_weight(view, &diagonal_positions)
    } else {
        vec![1.0; n_nodes]
    };

    if let Some(weights) = view.weights_mut() {
        for i in 0..n_nodes {
            weights[i][diagonal_positions[i]] = diagonal_weights[i];
        }
    }
}

fn mean_link_weight(view: &OwnedNeighborView, diagonal_positions: &[usize]) -> Vec<f64> {
    let n_nodes = view.vcount();
    let mut sums = vec![0.0_f64; n_nodes];
    let mut signs = vec![0_i64; n_nodes];

    for i in 0..n_nodes {
        for (j, &nei) in view.neighbors(i).iter().enumerate() {
            if j == diagonal_positions[i] && nei == i {
                continue;
            }
            let w = view.edge_weight(i, j);
            sums[nei] += w;
            signs[nei] += if w < 0.0 { -1 } else { 1 };
        }
    }

    for i in 0..n_nodes {
        if signs[i] != 0 {
            sums[i] /= signs[i] as f64;
        }
    }

    sums
}

fn has_negatives(view: &OwnedNeighborView) -> bool {
    (0..view.vcount()).any(|i| view.weights(i).iter().any(|&w| w < 0.0))
}

fn add_offset(view: &mut OwnedNeighborView) {
    debug!("adding small offset to all edges");

    let n_nodes = view.vcount();
    let mut offset = 0.0;
    for i in 0..n_nodes {
        for (j, &nei) in view.neighbors(i).iter().enumerate() {
            if nei == i {
                offset += view.edge_weight(i, j);
                break;
            }
        }
    }
    offset /= n_nodes as f64;

    if let Some(weights) = view.weights_mut() {
        for row in weights.iter_mut() {
            for w in row.iter_mut() {
                *w = (1.0 - offset) * *w + offset;
            }
        }
    }
}
