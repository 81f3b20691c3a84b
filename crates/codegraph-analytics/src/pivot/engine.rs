use std::collections::HashMap;

use codegraph_core::Edge;
use serde::Serialize;

use super::dims::{Dimension, ResolvedDim, SimpleDim};
use super::measures::{Measure, MeasureType};
use super::row::PivotRow;

const SYMBOL_LIMIT: usize = 500;
const SYMBOL_EDGE_LIMIT: usize = 2000;

#[derive(Debug, Clone, Default, Serialize)]
pub struct PivotNode {
    pub key: Vec<(String, String)>,
    pub depth: u8,
    pub values: HashMap<String, Option<f64>>,
    pub children: Vec<PivotNode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PivotResult {
    pub rows: Vec<PivotNode>,
    pub dimensions: Vec<String>,
    pub measures: Vec<String>,
    pub measure_types: HashMap<String, MeasureType>,
    pub has_enriched: bool,
    pub graph_edges: Vec<GraphEdge>,
    pub leaf_graph_edges: Vec<GraphEdge>,
    pub symbol_total: Option<usize>,
}

/// Dimensions that support induced-subgraph edge emission, mirroring the
/// `_DIM_SRC`/`_DIM_TGT` mapping: plain identity dims plus the one enriched
/// categorical dim backed by a single column.
fn supports_edges(dimension: &Dimension) -> bool {
    matches!(
        dimension,
        Dimension::Simple(
            SimpleDim::Module
                | SimpleDim::Risk
                | SimpleDim::Kind
                | SimpleDim::Symbol
                | SimpleDim::CommunityDominantMod
        )
    )
}

fn induced_edges(dim: &ResolvedDim, rows: &[PivotRow], edges: &[Edge]) -> Vec<GraphEdge> {
    if !supports_edges(&dim.dimension) {
        return Vec::new();
    }
    let by_hash: HashMap<&str, &PivotRow> = rows.iter().map(|r| (r.node.hash.as_str(), r)).collect();
    let mut counts: HashMap<(String, String), u32> = HashMap::new();
    for e in edges {
        let (Some(&caller), Some(&callee)) =
            (by_hash.get(e.caller_hash.as_str()), by_hash.get(e.callee_hash.as_str()))
        else {
            continue;
        };
        let source = dim.key(caller);
        let target = dim.key(callee);
        if source == target {
            continue;
        }
        *counts.entry((source, target)).or_insert(0) += 1;
    }
    let mut out: Vec<GraphEdge> =
        counts.into_iter().map(|((source, target), weight)| GraphEdge { source, target, weight: weight as f64 }).collect();
    out.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap());
    out
}

fn symbol_key(row: &PivotRow) -> String {
    format!("{}::{}", row.node.module_or_external(), row.node.name)
}

fn symbol_grain(rows: &[PivotRow], measures: &[Measure], edges: &[Edge], has_enriched: bool) -> PivotResult {
    let valid: Vec<&Measure> = measures.iter().filter(|m| !m.requires_enriched() || has_enriched).collect();
    let dimensions = vec!["symbol".to_string()];
    if valid.is_empty() {
        return PivotResult {
            rows: Vec::new(),
            dimensions,
            measures: Vec::new(),
            measure_types: HashMap::new(),
            has_enriched,
            graph_edges: Vec::new(),
            leaf_graph_edges: Vec::new(),
            symbol_total: Some(0),
        };
    }

    let total = rows.len();
    let mut ordered: Vec<&PivotRow> = rows.iter().collect();
    ordered.sort_by(|a, b| {
        b.node.caller_count.cmp(&a.node.caller_count).then_with(|| a.node.name.cmp(&b.node.name))
    });
    ordered.truncate(SYMBOL_LIMIT);

    let pivot_rows: Vec<PivotNode> = ordered
        .iter()
        .map(|r| {
            let values = valid.iter().map(|m| (m.token(), m.symbol_value(r))).collect();
            PivotNode { key: vec![("symbol".to_string(), symbol_key(r))], depth: 0, values, children: Vec::new() }
        })
        .collect();

    let subset: Vec<PivotRow> = ordered.iter().map(|r| **r).collect();
    let by_hash: HashMap<&str, &PivotRow> = subset.iter().map(|r| (r.node.hash.as_str(), r)).collect();
    let mut raw_edges: Vec<GraphEdge> = edges
        .iter()
        .filter_map(|e| {
            let caller = by_hash.get(e.caller_hash.as_str())?;
            let callee = by_hash.get(e.callee_hash.as_str())?;
            Some(GraphEdge { source: symbol_key(caller), target: symbol_key(callee), weight: e.call_count as f64 })
        })
        .collect();
    raw_edges.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap());
    raw_edges.truncate(SYMBOL_EDGE_LIMIT);

    PivotResult {
        rows: pivot_rows,
        dimensions,
        measures: valid.iter().map(|m| m.token()).collect(),
        measure_types: valid.iter().map(|m| (m.token(), m.measure_type())).collect(),
        has_enriched,
        graph_edges: raw_edges,
        leaf_graph_edges: Vec::new(),
        symbol_total: Some(total),
    }
}

fn group_by<'a>(dim: &ResolvedDim, rows: &[&'a PivotRow<'a>]) -> std::collections::BTreeMap<String, Vec<&'a PivotRow<'a>>> {
    let mut groups: std::collections::BTreeMap<String, Vec<&PivotRow>> = std::collections::BTreeMap::new();
    for &row in rows {
        groups.entry(dim.key(row)).or_default().push(row);
    }
    groups
}

fn measure_values(measures: &[&Measure], rows: &[&PivotRow]) -> HashMap<String, Option<f64>> {
    let owned: Vec<PivotRow> = rows.iter().map(|r| **r).collect();
    measures.iter().map(|m| (m.token(), m.group_value(&owned))).collect()
}

fn symbol_count_of(node: &PivotNode) -> f64 {
    node.values.get("symbol_count").copied().flatten().unwrap_or(0.0)
}

/// Runs the full pivot over an already-filtered set of symbol rows.
///
/// `rows` should already exclude external aggregates (see `build_rows`);
/// `edges` is the full internal call-edge set for the same snapshot.
pub fn pivot(rows: &[PivotRow], dimensions: &[Dimension], measures: &[Measure], edges: &[Edge]) -> PivotResult {
    let has_enriched = rows.iter().any(|r| r.features.is_some());

    let is_symbol_only =
        dimensions.len() == 1 && matches!(dimensions[0], Dimension::Simple(SimpleDim::Symbol));
    if dimensions.is_empty() || is_symbol_only {
        return symbol_grain(rows, measures, edges, has_enriched);
    }

    let resolved: Vec<ResolvedDim> = dimensions
        .iter()
        .filter(|d| !d.requires_enriched() || has_enriched)
        .map(|d| ResolvedDim::resolve(*d, rows))
        .collect();
    let valid_measures: Vec<&Measure> = measures.iter().filter(|m| !m.requires_enriched() || has_enriched).collect();

    let dim_tokens: Vec<String> = resolved.iter().map(|d| d.token()).collect();

    if resolved.is_empty() || valid_measures.is_empty() {
        return PivotResult {
            rows: Vec::new(),
            dimensions: dim_tokens,
            measures: Vec::new(),
            measure_types: HashMap::new(),
            has_enriched,
            graph_edges: Vec::new(),
            leaf_graph_edges: Vec::new(),
            symbol_total: None,
        };
    }

    let row_refs: Vec<&PivotRow> = rows.iter().collect();
    let measure_tokens: Vec<String> = valid_measures.iter().map(|m| m.token()).collect();
    let measure_types: HashMap<String, MeasureType> =
        valid_measures.iter().map(|m| (m.token(), m.measure_type())).collect();

    let mut top_rows: Vec<PivotNode> = if resolved.len() == 1 {
        let groups = group_by(&resolved[0], &row_refs);
        groups
            .into_iter()
            .map(|(key, members)| PivotNode {
                key: vec![(resolved[0].token(), key)],
                depth: 0,
                values: measure_values(&valid_measures, &members),
                children: Vec::new(),
            })
            .collect()
    } else {
        let d0 = &resolved[0];
        let d1 = &resolved[1];
        let parent_groups = group_by(d0, &row_refs);

        parent_groups
            .into_iter()
            .map(|(pk, members)| {
                let leaf_groups = group_by(d1, &members);
                let mut children: Vec<PivotNode> = leaf_groups
                    .into_iter()
                    .map(|(lk, leaf_members)| PivotNode {
                        key: vec![(d0.token(), pk.clone()), (d1.token(), lk)],
                        depth: 1,
                        values: measure_values(&valid_measures, &leaf_members),
                        children: Vec::new(),
                    })
                    .collect();
                children.sort_by(|a, b| symbol_count_of(b).partial_cmp(&symbol_count_of(a)).unwrap());
                PivotNode {
                    key: vec![(d0.token(), pk)],
                    depth: 0,
                    values: measure_values(&valid_measures, &members),
                    children,
                }
            })
            .collect()
    };

    top_rows.sort_by(|a, b| symbol_count_of(b).partial_cmp(&symbol_count_of(a)).unwrap());

    let graph_edges = induced_edges(&resolved[0], rows, edges);
    let leaf_graph_edges = if resolved.len() >= 2 { induced_edges(&resolved[1], rows, edges) } else { Vec::new() };

    PivotResult {
        rows: top_rows,
        dimensions: dim_tokens,
        measures: measure_tokens,
        measure_types,
        has_enriched,
        graph_edges,
        leaf_graph_edges,
        symbol_total: None,
    }
}

/// Distinct values a dimension takes across `rows`, sorted. Lets a caller
/// populate a filter chip/picker without running a full pivot, mirroring
/// `fetch_dim_values`.
pub fn available_values(dimension: Dimension, rows: &[PivotRow]) -> Vec<String> {
    let resolved = ResolvedDim::resolve(dimension, rows);
    let mut values: Vec<String> = rows.iter().map(|r| resolved.key(r)).collect();
    values.sort();
    values.dedup();
    values
}
