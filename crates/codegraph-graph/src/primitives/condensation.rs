use std::collections::HashSet;

use super::digraph::DiGraph;

/// The condensation DAG `C`: each SCC contracted to a single node. Ids are
/// assigned by first-discovery order in `sccs` (ascending), so downstream
/// deterministic-tie-break requirements (topological order, longest-path
/// DP) have a stable node ordering to fall back on.
pub struct Condensation {
    /// `scc_of[node_idx]` is this node's SCC/condensation-node id.
    pub scc_of: Vec<usize>,
    /// `members[scc_id]` lists the original node indices in that SCC.
    pub members: Vec<Vec<usize>>,
    pub forward: Vec<Vec<usize>>,
    pub reverse: Vec<Vec<usize>>,
}

impl Condensation {
    pub fn scc_count(&self) -> usize {
        self.members.len()
    }
}

pub fn build_condensation(g: &DiGraph, sccs: &[Vec<usize>]) -> Condensation {
    let mut scc_of = vec![0usize; g.len()];
    for (scc_id, members) in sccs.iter().enumerate() {
        for &node in members {
            scc_of[node] = scc_id;
        }
    }

    let scc_count = sccs.len();
    let mut forward: Vec<HashSet<usize>> = vec![HashSet::new(); scc_count];
    let mut reverse: Vec<HashSet<usize>> = vec![HashSet::new(); scc_count];

    for u in g.node_indices() {
        let su = scc_of[u];
        for &(v, _) in g.successors(u) {
            let sv = scc_of[v];
            if su != sv {
                forward[su].insert(sv);
                reverse[sv].insert(su);
            }
        }
    }

    Condensation {
        scc_of,
        members: sccs.to_vec(),
        forward: forward.into_iter().map(|s| s.into_iter().collect()).collect(),
        reverse: reverse.into_iter().map(|s| s.into_iter().collect()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::scc::tarjan_scc;

    #[test]
    fn a_two_node_cycle_condenses_to_a_single_scc_with_no_self_edges() {
        let g = DiGraph::build(["a", "b"], [("a", "b", 1), ("b", "a", 1)]);
        let sccs = tarjan_scc(&g);
        let condensation = build_condensation(&g, &sccs);
        assert_eq!(condensation.scc_count(), 1);
        assert!(condensation.forward[0].is_empty());
        assert!(condensation.reverse[0].is_empty());
    }

    #[test]
    fn acyclic_chain_condenses_to_one_scc_per_node_linked_in_order() {
        let g = DiGraph::build(["a", "b", "c"], [("a", "b", 1), ("b", "c", 1)]);
        let sccs = tarjan_scc(&g);
        let condensation = build_condensation(&g, &sccs);
        assert_eq!(condensation.scc_count(), 3);
        let a_scc = condensation.scc_of[g.index_of("a").unwrap()];
        let b_scc = condensation.scc_of[g.index_of("b").unwrap()];
        assert!(condensation.forward[a_scc].contains(&b_scc));
    }
}
