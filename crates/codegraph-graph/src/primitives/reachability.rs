use super::condensation::Condensation;

type Bitset = Vec<u64>;

fn bitset_words(n: usize) -> usize {
    n.div_ceil(64)
}

fn set_bit(bits: &mut Bitset, i: usize) {
    bits[i / 64] |= 1u64 << (i % 64);
}

fn or_into(dst: &mut Bitset, src: &Bitset) {
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d |= s;
    }
}

fn iter_set_bits(bits: &Bitset) -> impl Iterator<Item = usize> + '_ {
    bits.iter().enumerate().flat_map(|(word_idx, word)| {
        (0..64).filter_map(move |bit| {
            if word & (1u64 << bit) != 0 {
                Some(word_idx * 64 + bit)
            } else {
                None
            }
        })
    })
}

/// For each condensation node, the inclusive (self + reachable) node count,
/// via a reverse-topological bitset DP. Descendant set of a sink is just
/// itself; a non-sink's set is the union of its successors' sets plus
/// itself.
pub fn descendant_node_counts(
    c: &Condensation,
    order: &[usize],
    scc_sizes: &[u32],
) -> Vec<u32> {
    let n = c.scc_count();
    let words = bitset_words(n);
    let mut descendants: Vec<Bitset> = vec![vec![0u64; words]; n];

    for &u in order.iter().rev() {
        set_bit(&mut descendants[u], u);
        let succs = c.forward[u].clone();
        for v in succs {
            let src = descendants[v].clone();
            or_into(&mut descendants[u], &src);
        }
    }

    descendants
        .iter()
        .map(|bits| iter_set_bits(bits).map(|scc| scc_sizes[scc]).sum())
        .collect()
}

/// Symmetric to [`descendant_node_counts`], walking predecessors instead of
/// successors and processing the topological order forward.
pub fn ancestor_node_counts(c: &Condensation, order: &[usize], scc_sizes: &[u32]) -> Vec<u32> {
    let n = c.scc_count();
    let words = bitset_words(n);
    let mut ancestors: Vec<Bitset> = vec![vec![0u64; words]; n];

    for &u in order {
        set_bit(&mut ancestors[u], u);
        let preds = c.reverse[u].clone();
        for p in preds {
            let src = ancestors[p].clone();
            or_into(&mut ancestors[u], &src);
        }
    }

    ancestors
        .iter()
        .map(|bits| iter_set_bits(bits).map(|scc| scc_sizes[scc]).sum())
        .collect()
}

/// Converts inclusive per-SCC counts into strict per-node transitive
/// counts: subtract the node's own SCC size (excluding the node itself and
/// its cycle-mates) and lift the per-SCC value to every member node.
pub fn strict_transitive_counts(c: &Condensation, scc_sizes: &[u32], inclusive: &[u32]) -> Vec<u32> {
    let strict_per_scc: Vec<u32> = inclusive
        .iter()
        .zip(scc_sizes.iter())
        .map(|(&incl, &size)| incl.saturating_sub(size))
        .collect();

    let mut per_node = vec![0u32; c.scc_of.len()];
    for (node, &scc_id) in c.scc_of.iter().enumerate() {
        per_node[node] = strict_per_scc[scc_id];
    }
    per_node
}
