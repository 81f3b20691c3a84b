use super::condensation::Condensation;

/// `depth[v]` = length of the longest path from any source to `v` in the
/// condensation DAG. O(V+E) given a topological order.
pub fn longest_path_depths(c: &Condensation, order: &[usize]) -> Vec<u32> {
    let mut depth = vec![0u32; c.scc_count()];
    for &u in order {
        for &v in &c.forward[u] {
            depth[v] = depth[v].max(depth[u] + 1);
        }
    }
    depth
}

/// `reverse_depth[v]` = length of the longest path from `v` to any sink.
/// Computed by walking the topological order backwards so every
/// successor's value is final before `v` is finalized.
pub fn longest_path_reverse_depths(c: &Condensation, order: &[usize]) -> Vec<u32> {
    let mut reverse_depth = vec![0u32; c.scc_count()];
    for &u in order.iter().rev() {
        for &v in &c.forward[u] {
            reverse_depth[u] = reverse_depth[u].max(reverse_depth[v] + 1);
        }
    }
    reverse_depth
}

/// Lifts per-SCC depths to per-node depths: every member of an SCC shares
/// its condensation node's depth.
pub fn lift_to_nodes(c: &Condensation, scc_values: &[u32]) -> Vec<u32> {
    let mut node_values = vec![0u32; c.scc_of.len()];
    for (node, &scc_id) in c.scc_of.iter().enumerate() {
        node_values[node] = scc_values[scc_id];
    }
    node_values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{build_condensation, scc::tarjan_scc, toposort::topological_order, DiGraph};

    #[test]
    fn a_three_node_chain_has_depths_0_1_2_and_reverse_depths_2_1_0() {
        let g = DiGraph::build(["a", "b", "c"], [("a", "b", 1), ("b", "c", 1)]);
        let sccs = tarjan_scc(&g);
        let condensation = build_condensation(&g, &sccs);
        let order = topological_order(&condensation);
        let depths = lift_to_nodes(&condensation, &longest_path_depths(&condensation, &order));
        let reverse = lift_to_nodes(&condensation, &longest_path_reverse_depths(&condensation, &order));

        let a = g.index_of("a").unwrap();
        let b = g.index_of("b").unwrap();
        let c = g.index_of("c").unwrap();
        assert_eq!(depths[a], 0);
        assert_eq!(depths[b], 1);
        assert_eq!(depths[c], 2);
        assert_eq!(reverse[a], 2);
        assert_eq!(reverse[c], 0);
    }
}
