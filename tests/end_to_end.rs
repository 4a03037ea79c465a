//! End-to-end scenarios over small literal graphs, built directly rather
//! than read from any graph-library fixture format (out of scope, see
//! `spec.md` §1).

use speakeasy2::{speak_easy_2, OwnedNeighborView, Se2Options};

/// Build a symmetric, self-loop-free neighbour view from an undirected edge
/// list over `n` nodes.
fn symmetric_view(n: usize, edges: &[(usize, usize)]) -> OwnedNeighborView {
    let mut neighbors = vec![Vec::new(); n];
    for &(a, b) in edges {
        neighbors[a].push(b);
        neighbors[b].push(a);
    }
    OwnedNeighborView::new(neighbors, None)
}

/// Zachary's karate club: the canonical 34-node, 78-edge social network used
/// throughout the community-detection literature.
const KARATE_CLUB_EDGES: &[(usize, usize)] = &[
    (0, 1), (0, 2), (0, 3), (0, 4), (0, 5), (0, 6), (0, 7), (0, 8), (0, 10),
    (0, 11), (0, 12), (0, 13), (0, 17), (0, 19), (0, 21), (0, 31),
    (1, 2), (1, 3), (1, 7), (1, 13), (1, 17), (1, 19), (1, 21), (1, 30),
    (2, 3), (2, 7), (2, 8), (2, 9), (2, 13), (2, 27), (2, 28), (2, 32),
    (3, 7), (3, 12), (3, 13),
    (4, 6), (4, 10),
    (5, 6), (5, 10), (5, 16),
    (6, 16),
    (8, 30), (8, 32), (8, 33),
    (9, 33),
    (13, 33),
    (14, 32), (14, 33),
    (15, 32), (15, 33),
    (18, 32), (18, 33),
    (19, 33),
    (20, 32), (20, 33),
    (22, 32), (22, 33),
    (23, 25), (23, 27), (23, 29), (23, 32), (23, 33),
    (24, 25), (24, 27),
    (24, 31),
    (25, 31),
    (26, 29), (26, 33),
    (27, 33),
    (28, 31), (28, 33),
    (29, 32), (29, 33),
    (30, 32), (30, 33),
    (31, 32), (31, 33),
    (32, 33),
];

fn opts(seed: u64) -> Se2Options {
    let mut opts = Se2Options::default();
    opts.random_seed = seed;
    opts
}

#[test]
fn single_subcluster_level_yields_exactly_one_row_of_full_width() {
    let view = symmetric_view(34, KARATE_CLUB_EDGES);
    let mut options = opts(1234);
    options.subcluster = 1;
    options.independent_runs = 2;
    options.target_partitions = 2;
    options.discard_transient = 1;

    let membership = speak_easy_2(view, &options).expect("clustering completes");
    assert_eq!(membership.len(), 1);
    assert_eq!(membership[0].len(), 34);
}

#[test]
fn fully_disconnected_graph_yields_one_singleton_community_per_node() {
    let n = 20;
    let view = OwnedNeighborView::new((0..n).map(|i| vec![i]).collect(), None);
    let mut options = opts(1234);
    options.independent_runs = 3;
    options.target_partitions = 2;
    options.discard_transient = 1;

    let membership = speak_easy_2(view, &options).expect("clustering completes");
    assert_eq!(membership[0].len(), n);

    let mut distinct: Vec<usize> = membership[0].clone();
    distinct.sort_unstable();
    distinct.dedup();
    assert_eq!(
        distinct.len(),
        n,
        "every node isolated except its self-loop should remain its own community"
    );
}

#[test]
fn weighted_line_graph_collapses_to_few_communities() {
    // 1 -> 2 -> 3 -> ... -> 10, all edge weights 1.0.
    let n = 10;
    let mut neighbors = vec![Vec::new(); n];
    let mut weights = vec![Vec::new(); n];
    for i in 0..n - 1 {
        neighbors[i].push(i + 1);
        weights[i].push(1.0);
        neighbors[i + 1].push(i);
        weights[i + 1].push(1.0);
    }
    let view = OwnedNeighborView::new(neighbors, Some(weights));

    let mut options = opts(1234);
    options.independent_runs = 3;
    options.target_partitions = 2;
    options.discard_transient = 1;

    let membership = speak_easy_2(view, &options).expect("clustering completes");
    let mut distinct: Vec<usize> = membership[0].clone();
    distinct.sort_unstable();
    distinct.dedup();
    assert!(
        distinct.len() <= 2,
        "a single strongly-connected chain should not fragment into many communities, got {}",
        distinct.len()
    );
}

#[test]
fn minclust_floor_prevents_small_communities_from_sub_dividing() {
    // Two well-separated triangles bridged by one weak edge: with a high
    // minclust every community found at level 0 is too small to split
    // further, so level 1 should equal level 0 in shape.
    let edges = &[(0, 1), (0, 2), (1, 2), (3, 4), (3, 5), (4, 5), (2, 3)];
    let view = symmetric_view(6, edges);

    let mut options = opts(7);
    options.subcluster = 2;
    options.minclust = 100;
    options.independent_runs = 2;
    options.target_partitions = 2;
    options.discard_transient = 1;

    let membership = speak_easy_2(view, &options).expect("clustering completes");
    assert_eq!(membership.len(), 2);
    assert_eq!(membership[1].len(), 6);
}

#[test]
fn order_nodes_groups_every_level_by_ascending_community_label() {
    let view = symmetric_view(34, KARATE_CLUB_EDGES);
    let mut options = opts(1234);
    options.independent_runs = 2;
    options.target_partitions = 2;
    options.discard_transient = 1;

    let membership = speak_easy_2(view, &options).expect("clustering completes");
    let ordering = speakeasy2::order_nodes(&membership);
    for (level, order) in ordering.iter().enumerate() {
        let labels: Vec<usize> = order.iter().map(|&i| membership[level][i]).collect();
        assert!(labels.windows(2).all(|w| w[0] <= w[1]));
    }
}

#[cfg(feature = "slow_tests")]
#[test]
fn karate_club_three_levels_refine_a_two_community_split() {
    let view = symmetric_view(34, KARATE_CLUB_EDGES);
    let mut options = opts(1234);
    options.subcluster = 3;
    options.minclust = 2;

    let membership = speak_easy_2(view, &options).expect("clustering completes");
    assert_eq!(membership.len(), 3);
    for row in &membership {
        assert_eq!(row.len(), 34);
    }

    let mut top_level: Vec<usize> = membership[0].clone();
    top_level.sort_unstable();
    top_level.dedup();
    assert_eq!(
        top_level.len(),
        2,
        "karate club's well-known split is into two factions"
    );
}

#[cfg(feature = "slow_tests")]
#[test]
fn complete_graph_collapses_to_a_single_community() {
    let n = 10;
    let edges: Vec<(usize, usize)> = (0..n)
        .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
        .collect();
    let view = symmetric_view(n, &edges);

    let options = opts(1234);
    let membership = speak_easy_2(view, &options).expect("clustering completes");

    let mut distinct: Vec<usize> = membership[0].clone();
    distinct.sort_unstable();
    distinct.dedup();
    assert_eq!(distinct.len(), 1, "K10 is one densely connected community");
}

#[cfg(feature = "slow_tests")]
#[test]
fn planted_partition_recovers_four_known_blocks() {
    use rand::rngs::SmallRng;
    use rand::Rng;
    use rand::SeedableRng;

    let block_sizes = [16usize, 10, 8, 6];
    let n: usize = block_sizes.iter().sum();
    let mut block_of = vec![0usize; n];
    {
        let mut idx = 0;
        for (b, &size) in block_sizes.iter().enumerate() {
            for _ in 0..size {
                block_of[idx] = b;
                idx += 1;
            }
        }
    }

    let mut rng = SmallRng::seed_from_u64(1234);
    let mut edges = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            let p = if block_of[i] == block_of[j] {
                0.75
            } else {
                0.0833
            };
            if rng.gen_bool(p) {
                edges.push((i, j));
            }
        }
    }

    let view = symmetric_view(n, &edges);
    let options = opts(1234);
    let membership = speak_easy_2(view, &options).expect("clustering completes");

    let mut distinct: Vec<usize> = membership[0].clone();
    distinct.sort_unstable();
    distinct.dedup();
    assert_eq!(
        distinct.len(),
        4,
        "a clearly planted 4-block partition should recover 4 communities"
    );
}
