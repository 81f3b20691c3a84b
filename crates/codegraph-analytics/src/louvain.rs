use std::collections::HashMap;

use codegraph_graph::UndirectedProjection;

/// Deterministic linear congruential generator, seeded once per run. Used
/// only to pick a stable node-visiting order for local moving; it is not a
/// source of entropy.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0
    }
}

fn seeded_order(n: usize, seed: u64) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = Lcg(seed);
    for i in (1..n).rev() {
        let r = (rng.next() >> 33) as usize % (i + 1);
        order.swap(i, r);
    }
    order
}

struct LevelGraph {
    adjacency: Vec<Vec<(usize, f64)>>,
    self_loops: Vec<f64>,
}

fn local_moving(g: &LevelGraph, total_weight: f64, resolution: f64, seed: u64) -> Vec<usize> {
    let n = g.adjacency.len();
    let mut community_of: Vec<usize> = (0..n).collect();
    let degree: Vec<f64> = g
        .adjacency
        .iter()
        .zip(g.self_loops.iter())
        .map(|(adj, &loop_w)| adj.iter().map(|&(_, w)| w).sum::<f64>() + 2.0 * loop_w)
        .collect();
    let mut community_weight = degree.clone();
    let two_m = 2.0 * total_weight;
    if two_m <= 0.0 {
        return community_of;
    }

    let order = seeded_order(n, seed);
    for _pass in 0..50 {
        let mut improved = false;
        for &node in &order {
            let current = community_of[node];
            community_weight[current] -= degree[node];

            let mut neighbor_weight: HashMap<usize, f64> = HashMap::new();
            for &(nb, w) in &g.adjacency[node] {
                if nb == node {
                    continue;
                }
                *neighbor_weight.entry(community_of[nb]).or_insert(0.0) += w;
            }

            let k_i = degree[node];
            let mut best_comm = current;
            let mut best_gain = neighbor_weight.get(&current).copied().unwrap_or(0.0)
                - resolution * community_weight[current] * k_i / two_m;

            for (&comm, &w_to_comm) in &neighbor_weight {
                if comm == current {
                    continue;
                }
                let gain = w_to_comm - resolution * community_weight[comm] * k_i / two_m;
                if gain > best_gain {
                    best_gain = gain;
                    best_comm = comm;
                }
            }

            community_weight[best_comm] += k_i;
            if best_comm != current {
                community_of[node] = best_comm;
                improved = true;
            }
        }
        if !improved {
            break;
        }
    }

    community_of
}

fn aggregate(g: &LevelGraph, community_of: &[usize]) -> (LevelGraph, Vec<usize>) {
    let mut relabel: HashMap<usize, usize> = HashMap::new();
    let mut mapping = vec![0usize; community_of.len()];
    for (node, &comm) in community_of.iter().enumerate() {
        let next_id = relabel.len();
        let id = *relabel.entry(comm).or_insert(next_id);
        mapping[node] = id;
    }
    let k = relabel.len();

    let mut adjacency: Vec<HashMap<usize, f64>> = vec![HashMap::new(); k];
    let mut self_loops = vec![0.0f64; k];

    for (node, adj) in g.adjacency.iter().enumerate() {
        let cu = mapping[node];
        self_loops[cu] += g.self_loops[node];
        for &(nb, w) in adj {
            let cv = mapping[nb];
            if cu == cv {
                self_loops[cu] += w / 2.0;
            } else {
                *adjacency[cu].entry(cv).or_insert(0.0) += w;
            }
        }
    }

    let adjacency = adjacency
        .into_iter()
        .map(|m| m.into_iter().collect::<Vec<_>>())
        .collect();

    (LevelGraph { adjacency, self_loops }, mapping)
}

/// Multi-level Louvain community detection over the weighted undirected
/// projection. Deterministic given a fixed `seed`: the projection's edge
/// accumulation order is already stable (ascending `(caller_hash,
/// callee_hash)`, established when the projection is built from the
/// snapshot's edge rows), and this function's own node-visiting order is
/// seeded rather than OS-random.
pub fn louvain(proj: &UndirectedProjection, resolution: f64, seed: u64) -> Vec<usize> {
    let n = proj.node_count();
    if n == 0 {
        return Vec::new();
    }

    let mut level = LevelGraph {
        adjacency: proj.adjacency.iter().map(|adj| adj.iter().map(|&(u, w)| (u, w as f64)).collect()).collect(),
        self_loops: vec![0.0; n],
    };
    let mut node_to_level0: Vec<usize> = (0..n).collect();
    let mut final_community = vec![0usize; n];

    loop {
        let total_weight: f64 = level
            .adjacency
            .iter()
            .flat_map(|adj| adj.iter())
            .map(|&(_, w)| w)
            .sum::<f64>()
            / 2.0
            + level.self_loops.iter().sum::<f64>();

        let community_of = local_moving(&level, total_weight, resolution, seed);
        let distinct: std::collections::HashSet<usize> = community_of.iter().copied().collect();

        for (orig, &level_node) in node_to_level0.iter().enumerate() {
            final_community[orig] = community_of[level_node];
        }

        if distinct.len() == level.adjacency.len() {
            break;
        }

        let (next_level, mapping) = aggregate(&level, &community_of);
        node_to_level0 = node_to_level0.iter().map(|&ln| mapping[ln]).collect();
        level = next_level;
    }

    // Renumber final communities to a dense 0..k range for stable ids.
    let mut relabel: HashMap<usize, usize> = HashMap::new();
    for &c in &final_community {
        let next_id = relabel.len();
        relabel.entry(c).or_insert(next_id);
    }
    final_community.iter().map(|c| relabel[c]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_graph::{project_undirected, DiGraph};

    #[test]
    fn two_dense_clusters_split() {
        let g = DiGraph::build(
            ["a1", "a2", "a3", "b1", "b2", "b3"],
            [
                ("a1", "a2", 5),
                ("a2", "a3", 5),
                ("a3", "a1", 5),
                ("b1", "b2", 5),
                ("b2", "b3", 5),
                ("b3", "b1", 5),
                ("a1", "b1", 1),
            ],
        );
        let proj = project_undirected(&g);
        let communities = louvain(&proj, 1.0, 42);
        assert_eq!(communities[0], communities[1]);
        assert_eq!(communities[1], communities[2]);
        assert_eq!(communities[3], communities[4]);
        assert_eq!(communities[4], communities[5]);
        assert_ne!(communities[0], communities[3]);
    }
}
