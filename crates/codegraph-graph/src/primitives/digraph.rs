use std::collections::HashMap;

/// A compact directed multigraph over a fixed node set, indexed by position
/// rather than by hash. Graph primitives are stateless and own no storage;
/// callers build one of these from whatever subset of nodes/edges the
/// operation at hand needs.
#[derive(Debug, Clone)]
pub struct DiGraph {
    hashes: Vec<String>,
    index: HashMap<String, usize>,
    forward: Vec<Vec<(usize, u32)>>,
    reverse: Vec<Vec<(usize, u32)>>,
}

impl DiGraph {
    /// Builds a graph over exactly `node_hashes` (in the given order, which
    /// becomes the node index). Edges whose endpoints are not in
    /// `node_hashes` are silently dropped — callers filter externals before
    /// calling this.
    pub fn build<'a>(
        node_hashes: impl IntoIterator<Item = &'a str>,
        edges: impl IntoIterator<Item = (&'a str, &'a str, u32)>,
    ) -> Self {
        let hashes: Vec<String> = node_hashes.into_iter().map(|s| s.to_string()).collect();
        let index: HashMap<String, usize> = hashes
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), i))
            .collect();
        let mut forward = vec![Vec::new(); hashes.len()];
        let mut reverse = vec![Vec::new(); hashes.len()];
        for (caller, callee, weight) in edges {
            if let (Some(&u), Some(&v)) = (index.get(caller), index.get(callee)) {
                forward[u].push((v, weight));
                reverse[v].push((u, weight));
            }
        }
        Self {
            hashes,
            index,
            forward,
            reverse,
        }
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    pub fn hash(&self, idx: usize) -> &str {
        &self.hashes[idx]
    }

    pub fn index_of(&self, hash: &str) -> Option<usize> {
        self.index.get(hash).copied()
    }

    pub fn node_indices(&self) -> impl Iterator<Item = usize> {
        0..self.hashes.len()
    }

    pub fn successors(&self, idx: usize) -> &[(usize, u32)] {
        &self.forward[idx]
    }

    pub fn predecessors(&self, idx: usize) -> &[(usize, u32)] {
        &self.reverse[idx]
    }

    pub fn edge_count(&self) -> usize {
        self.forward.iter().map(|adj| adj.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_with_an_endpoint_outside_the_node_set_are_dropped() {
        let g = DiGraph::build(["a", "b"], [("a", "b", 1), ("a", "ghost", 1)]);
        assert_eq!(g.len(), 2);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn successors_and_predecessors_agree_on_weight() {
        let g = DiGraph::build(["a", "b"], [("a", "b", 7)]);
        let a = g.index_of("a").unwrap();
        let b = g.index_of("b").unwrap();
        assert_eq!(g.successors(a), &[(b, 7)]);
        assert_eq!(g.predecessors(b), &[(a, 7)]);
        assert!(g.predecessors(a).is_empty());
    }

    #[test]
    fn node_order_is_preserved_as_the_index() {
        let g = DiGraph::build(["x", "y", "z"], []);
        assert_eq!(g.hash(0), "x");
        assert_eq!(g.hash(2), "z");
        assert_eq!(g.index_of("y"), Some(1));
        assert_eq!(g.index_of("missing"), None);
    }
}
