use super::digraph::DiGraph;

/// An undirected weighted graph, built by summing edge multiplicity across
/// direction. Feeds Louvain community detection and clustering-coefficient
/// computation, neither of which cares about call direction.
#[derive(Debug, Clone)]
pub struct UndirectedProjection {
    pub adjacency: Vec<Vec<(usize, u32)>>,
}

impl UndirectedProjection {
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn neighbors(&self, idx: usize) -> &[(usize, u32)] {
        &self.adjacency[idx]
    }

    pub fn total_weight(&self) -> f64 {
        self.adjacency
            .iter()
            .flat_map(|adj| adj.iter())
            .map(|&(_, w)| w as f64)
            .sum::<f64>()
            / 2.0
    }
}

/// Builds the undirected projection of `g`: for every directed edge `(u, v,
/// w)`, both directions accumulate `w` into one undirected weight, and
/// parallel edges (whether originally forward, reverse, or both) are
/// summed rather than collapsed to one.
pub fn project_undirected(g: &DiGraph) -> UndirectedProjection {
    use std::collections::HashMap;

    let n = g.len();
    let mut weights: Vec<HashMap<usize, u32>> = vec![HashMap::new(); n];

    for u in g.node_indices() {
        for &(v, w) in g.successors(u) {
            if u == v {
                continue;
            }
            *weights[u].entry(v).or_insert(0) += w;
            *weights[v].entry(u).or_insert(0) += w;
        }
    }

    let adjacency = weights
        .into_iter()
        .map(|m| m.into_iter().collect::<Vec<_>>())
        .collect();

    UndirectedProjection { adjacency }
}
