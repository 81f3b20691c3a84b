use std::collections::{HashSet, VecDeque};

use codegraph_core::NodeFeatures;
use codegraph_graph::{project_undirected, DiGraph, UndirectedProjection};

use super::context::EnrichmentGraph;
use super::step::EnrichmentStep;

const EXACT_BETWEENNESS_LIMIT: usize = 3000;
const SAMPLE_SIZE: usize = 500;
const PAGERANK_DAMPING: f64 = 0.85;
const ITERATIONS: usize = 200;

/// Brandes' algorithm run only from `sources`; full betweenness when
/// `sources` is every node, sampled otherwise.
fn brandes_betweenness(g: &DiGraph, sources: &[usize]) -> Vec<f64> {
    let n = g.len();
    let mut betweenness = vec![0.0f64; n];

    for &s in sources {
        let mut sigma = vec![0.0f64; n];
        sigma[s] = 1.0;
        let mut dist = vec![-1i64; n];
        dist[s] = 0;
        let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut queue = VecDeque::new();
        queue.push_back(s);
        let mut order = Vec::new();

        while let Some(v) = queue.pop_front() {
            order.push(v);
            for &(w, _) in g.successors(v) {
                if dist[w] < 0 {
                    dist[w] = dist[v] + 1;
                    queue.push_back(w);
                }
                if dist[w] == dist[v] + 1 {
                    sigma[w] += sigma[v];
                    preds[w].push(v);
                }
            }
        }

        let mut delta = vec![0.0f64; n];
        for &w in order.iter().rev() {
            for &v in &preds[w] {
                delta[v] += (sigma[v] / sigma[w]) * (1.0 + delta[w]);
            }
            if w != s {
                betweenness[w] += delta[w];
            }
        }
    }

    betweenness
}

/// Normalized betweenness centrality: exact for graphs of at most
/// [`EXACT_BETWEENNESS_LIMIT`] nodes, sampled with `k = min(500, n)`
/// pivots otherwise.
pub fn betweenness_centrality(g: &DiGraph) -> Vec<f64> {
    let n = g.len();
    if n < 3 {
        return vec![0.0; n];
    }

    let (sources, scale): (Vec<usize>, f64) = if n <= EXACT_BETWEENNESS_LIMIT {
        ((0..n).collect(), 1.0)
    } else {
        let k = SAMPLE_SIZE.min(n);
        ((0..k).collect(), n as f64 / k as f64)
    };

    let raw = brandes_betweenness(g, &sources);
    let norm = 1.0 / ((n - 1) as f64 * (n - 2) as f64);
    raw.iter()
        .map(|&b| (b * norm * scale).clamp(0.0, 1.0))
        .collect()
}

/// PageRank with dangling-node mass redistribution, L1-normalized so the
/// result sums to 1 over all internal nodes.
pub fn pagerank(g: &DiGraph) -> Vec<f64> {
    let n = g.len();
    if n == 0 {
        return Vec::new();
    }

    let out_degree: Vec<f64> = (0..n).map(|i| g.successors(i).len() as f64).collect();
    let mut rank = vec![1.0 / n as f64; n];

    for _ in 0..ITERATIONS {
        let dangling_mass: f64 = (0..n)
            .filter(|&i| out_degree[i] == 0.0)
            .map(|i| rank[i])
            .sum();
        let base = (1.0 - PAGERANK_DAMPING) / n as f64 + PAGERANK_DAMPING * dangling_mass / n as f64;
        let mut next = vec![base; n];
        for u in 0..n {
            if out_degree[u] > 0.0 {
                let share = rank[u] / out_degree[u];
                for &(v, _) in g.successors(u) {
                    next[v] += PAGERANK_DAMPING * share;
                }
            }
        }
        rank = next;
    }

    let sum: f64 = rank.iter().sum();
    if sum > 0.0 {
        for r in rank.iter_mut() {
            *r /= sum;
        }
    }
    rank
}

/// HITS hub/authority scores. Returns all-zero vectors for both on
/// non-convergence (a zero-mass iteration), matching the "zeroed on
/// failure" enrichment semantics rather than propagating NaN.
pub fn hits(g: &DiGraph) -> (Vec<f64>, Vec<f64>) {
    let n = g.len();
    if n == 0 {
        return (Vec::new(), Vec::new());
    }

    let zeros = || (vec![0.0; n], vec![0.0; n]);
    let mut hub = vec![1.0 / n as f64; n];
    let mut auth = vec![1.0 / n as f64; n];

    for _ in 0..ITERATIONS {
        let mut new_auth = vec![0.0f64; n];
        for u in 0..n {
            for &(v, _) in g.successors(u) {
                new_auth[v] += hub[u];
            }
        }
        let auth_sum: f64 = new_auth.iter().sum();
        if auth_sum <= 0.0 || !auth_sum.is_finite() {
            return zeros();
        }
        for a in new_auth.iter_mut() {
            *a /= auth_sum;
        }

        let mut new_hub = vec![0.0f64; n];
        for u in 0..n {
            for &(v, _) in g.successors(u) {
                new_hub[u] += new_auth[v];
            }
        }
        let hub_sum: f64 = new_hub.iter().sum();
        if hub_sum <= 0.0 || !hub_sum.is_finite() {
            return zeros();
        }
        for h in new_hub.iter_mut() {
            *h /= hub_sum;
        }

        auth = new_auth;
        hub = new_hub;
    }

    if hub.iter().any(|x| !x.is_finite()) || auth.iter().any(|x| !x.is_finite()) {
        return zeros();
    }

    (hub, auth)
}

/// Local clustering coefficient on the unweighted undirected projection.
pub fn clustering_coefficients(proj: &UndirectedProjection) -> Vec<f64> {
    let n = proj.node_count();
    let adjacency_sets: Vec<HashSet<usize>> = (0..n)
        .map(|v| proj.neighbors(v).iter().map(|&(u, _)| u).collect())
        .collect();

    (0..n)
        .map(|v| {
            let neighbors: Vec<usize> = adjacency_sets[v].iter().copied().collect();
            let k = neighbors.len();
            if k < 2 {
                return 0.0;
            }
            let mut triangles = 0u64;
            for i in 0..neighbors.len() {
                for j in (i + 1)..neighbors.len() {
                    if adjacency_sets[neighbors[i]].contains(&neighbors[j]) {
                        triangles += 1;
                    }
                }
            }
            let possible = (k * (k - 1)) as f64 / 2.0;
            triangles as f64 / possible
        })
        .collect()
}

pub struct Centrality;

impl EnrichmentStep for Centrality {
    fn name(&self) -> &'static str {
        "centrality"
    }

    fn apply(&self, graph: &EnrichmentGraph, features: &mut [NodeFeatures]) -> anyhow::Result<()> {
        let betweenness = betweenness_centrality(&graph.digraph);
        let ranks = pagerank(&graph.digraph);
        let (hub, authority) = hits(&graph.digraph);
        let projection = project_undirected(&graph.digraph);
        let clustering = clustering_coefficients(&projection);

        for idx in 0..features.len() {
            features[idx].betweenness_centrality = betweenness[idx];
            features[idx].pagerank = ranks[idx];
            features[idx].hub_score = hub[idx];
            features[idx].authority_score = authority[idx];
            features[idx].clustering_coeff = clustering[idx];
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::{Edge, Kind, Node, Risk};

    fn node(hash: &str) -> Node {
        Node {
            hash: hash.to_string(),
            name: hash.to_string(),
            module: Some("m".to_string()),
            kind: Kind::Function,
            file_path: "f.py".to_string(),
            line_start: 1,
            line_end: 1,
            complexity: 1,
            caller_count: 1,
            callee_count: 1,
            risk: Risk::Low,
        }
    }

    #[test]
    fn pagerank_over_a_closed_triangle_is_uniform_and_sums_to_one() {
        let nodes = vec![node("a"), node("b"), node("c")];
        let edges = vec![
            Edge { caller_hash: "a".into(), callee_hash: "b".into(), call_count: 1 },
            Edge { caller_hash: "b".into(), callee_hash: "c".into(), call_count: 1 },
            Edge { caller_hash: "c".into(), callee_hash: "a".into(), call_count: 1 },
        ];
        let graph = EnrichmentGraph::build(nodes, &edges);
        let ranks = pagerank(&graph.digraph);
        let sum: f64 = ranks.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        for r in &ranks {
            assert!((r - 1.0 / 3.0).abs() < 1e-6);
        }
    }

    #[test]
    fn betweenness_is_zero_below_three_nodes() {
        let nodes = vec![node("a"), node("b")];
        let edges = vec![Edge { caller_hash: "a".into(), callee_hash: "b".into(), call_count: 1 }];
        let graph = EnrichmentGraph::build(nodes, &edges);
        assert_eq!(betweenness_centrality(&graph.digraph), vec![0.0, 0.0]);
    }

    #[test]
    fn bridge_node_in_a_path_has_the_highest_betweenness() {
        let nodes = vec![node("a"), node("b"), node("c")];
        let edges = vec![
            Edge { caller_hash: "a".into(), callee_hash: "b".into(), call_count: 1 },
            Edge { caller_hash: "b".into(), callee_hash: "c".into(), call_count: 1 },
        ];
        let graph = EnrichmentGraph::build(nodes, &edges);
        let scores = betweenness_centrality(&graph.digraph);
        assert!(scores[1] > scores[0]);
        assert!(scores[1] > scores[2]);
    }
}
