use std::collections::HashMap;

use codegraph_core::{Edge, Node};
use codegraph_graph::{project_undirected, DiGraph};
use serde::Serialize;

use crate::louvain::louvain;

const LOUVAIN_SEED: u64 = 42;
const MISALIGNED_CAP: usize = 200;
const TOP_MODULES: usize = 6;
const PURITY_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Serialize)]
pub struct CommunitySummary {
    pub community_id: usize,
    pub size: usize,
    pub dominant_module: String,
    pub purity: f64,
    pub top_modules: Vec<(String, usize)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MisalignedNode {
    pub hash: String,
    pub module: String,
    pub community_id: usize,
    pub dominant_module: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterCommunityEdge {
    pub source: usize,
    pub target: usize,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommunitiesReport {
    pub communities: Vec<CommunitySummary>,
    pub misaligned: Vec<MisalignedNode>,
    pub edges: Vec<InterCommunityEdge>,
}

pub fn communities(nodes: &[Node], edges: &[Edge], resolution: f64) -> CommunitiesReport {
    let hashes: Vec<&str> = nodes.iter().map(|n| n.hash.as_str()).collect();
    let graph = DiGraph::build(
        hashes.iter().copied(),
        edges.iter().map(|e| (e.caller_hash.as_str(), e.callee_hash.as_str(), e.call_count)),
    );
    let projection = project_undirected(&graph);
    let community_of = louvain(&projection, resolution, LOUVAIN_SEED);

    let mut members_by_community: HashMap<usize, Vec<usize>> = HashMap::new();
    for (idx, &comm) in community_of.iter().enumerate() {
        members_by_community.entry(comm).or_default().push(idx);
    }
    members_by_community.retain(|_, members| members.len() > 1);

    let mut summaries = Vec::new();
    let mut dominant_by_community: HashMap<usize, String> = HashMap::new();
    let mut purity_by_community: HashMap<usize, f64> = HashMap::new();

    let mut community_ids: Vec<usize> = members_by_community.keys().copied().collect();
    community_ids.sort();

    for comm in community_ids {
        let members = &members_by_community[&comm];
        let mut module_counts: HashMap<&str, usize> = HashMap::new();
        for &idx in members {
            *module_counts.entry(nodes[idx].module_or_external()).or_insert(0) += 1;
        }
        let mut ranked: Vec<(&str, usize)> = module_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

        let (dominant_module, dominant_count) = ranked.first().map(|&(m, c)| (m.to_string(), c)).unwrap_or_default();
        let purity = dominant_count as f64 / members.len() as f64;

        dominant_by_community.insert(comm, dominant_module.clone());
        purity_by_community.insert(comm, purity);

        summaries.push(CommunitySummary {
            community_id: comm,
            size: members.len(),
            dominant_module,
            purity,
            top_modules: ranked
                .into_iter()
                .take(TOP_MODULES)
                .map(|(m, c)| (m.to_string(), c))
                .collect(),
        });
    }

    let mut misaligned = Vec::new();
    for (idx, &comm) in community_of.iter().enumerate() {
        if !members_by_community.contains_key(&comm) {
            continue;
        }
        let purity = purity_by_community[&comm];
        let dominant_module = &dominant_by_community[&comm];
        if nodes[idx].module_or_external() != dominant_module && purity >= PURITY_THRESHOLD {
            misaligned.push(MisalignedNode {
                hash: nodes[idx].hash.clone(),
                module: nodes[idx].module_or_external().to_string(),
                community_id: comm,
                dominant_module: dominant_module.clone(),
            });
            if misaligned.len() >= MISALIGNED_CAP {
                break;
            }
        }
    }

    let mut inter_edge_weight: HashMap<(usize, usize), f64> = HashMap::new();
    for u in graph.node_indices() {
        let cu = community_of[u];
        if !members_by_community.contains_key(&cu) {
            continue;
        }
        for &(v, weight) in graph.successors(u) {
            let cv = community_of[v];
            if cu != cv && members_by_community.contains_key(&cv) {
                *inter_edge_weight.entry((cu, cv)).or_insert(0.0) += weight as f64;
            }
        }
    }
    let max_weight = inter_edge_weight.values().copied().fold(0.0f64, f64::max).max(1.0);
    let mut edges: Vec<InterCommunityEdge> = inter_edge_weight
        .into_iter()
        .map(|((source, target), weight)| InterCommunityEdge {
            source,
            target,
            weight: weight / max_weight,
        })
        .collect();
    edges.sort_by(|a, b| a.source.cmp(&b.source).then(a.target.cmp(&b.target)));

    summaries.sort_by(|a, b| b.size.cmp(&a.size).then(a.community_id.cmp(&b.community_id)));

    CommunitiesReport {
        communities: summaries,
        misaligned,
        edges,
    }
}
