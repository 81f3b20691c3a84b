use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentinel module name used for edges/aggregates that cross into external code.
pub const EXTERNAL_MODULE: &str = "__external__";

/// Prefix identifying an external-symbol hash. External symbols are filtered
/// from all internal analyses; their hash is treated opaquely.
pub const EXTERNAL_HASH_PREFIX: &str = "ext:";

pub fn is_external_hash(hash: &str) -> bool {
    hash.starts_with(EXTERNAL_HASH_PREFIX)
}

/// Extracts the content-fingerprint portion of a node hash: the suffix after
/// the first `:`. `ext:` hashes compare whole, per the diff content-hash rule.
pub fn content_fingerprint(hash: &str) -> &str {
    if is_external_hash(hash) {
        hash
    } else {
        hash.split_once(':').map(|(_, rest)| rest).unwrap_or(hash)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Risk {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Risk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Risk::Low => "low",
            Risk::Medium => "medium",
            Risk::High => "high",
            Risk::Critical => "critical",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Risk {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Risk::Low),
            "medium" => Ok(Risk::Medium),
            "high" => Ok(Risk::High),
            "critical" => Ok(Risk::Critical),
            other => Err(format!("unknown risk level: {other}")),
        }
    }
}

/// Symbol kind. The raw snapshot may carry kinds the indexer invented;
/// unrecognized values are preserved via `Other` rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Function,
    Method,
    Class,
    Module,
    Other(String),
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Kind::Function => "function",
            Kind::Method => "method",
            Kind::Class => "class",
            Kind::Module => "module",
            Kind::Other(s) => s.as_str(),
        };
        write!(f, "{s}")
    }
}

impl FromStr for Kind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "function" => Kind::Function,
            "method" => Kind::Method,
            "class" => Kind::Class,
            "module" => Kind::Module,
            other => Kind::Other(other.to_string()),
        })
    }
}

/// A symbol (node) in the call graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub hash: String,
    pub name: String,
    /// Dotted or slash path; `None` for symbols the indexer couldn't place,
    /// `Some(EXTERNAL_MODULE)` for external aggregates.
    pub module: Option<String>,
    pub kind: Kind,
    pub file_path: String,
    pub line_start: u32,
    pub line_end: u32,
    pub complexity: u32,
    pub caller_count: u32,
    pub callee_count: u32,
    pub risk: Risk,
}

impl Node {
    pub fn is_external(&self) -> bool {
        is_external_hash(&self.hash)
    }

    pub fn module_or_external(&self) -> &str {
        self.module.as_deref().unwrap_or(EXTERNAL_MODULE)
    }
}

/// A directed call edge between two symbols, with call-site multiplicity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub caller_hash: String,
    pub callee_hash: String,
    pub call_count: u32,
}

/// Module-level aggregate edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleEdge {
    pub caller_module: String,
    pub callee_module: String,
    pub edge_count: u32,
}

/// The ~25 computed per-symbol structural fields produced by enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeFeatures {
    pub hash: String,
    pub scc_id: i64,
    pub scc_size: u32,
    pub scc_cross_module: bool,
    pub topological_depth: u32,
    pub reverse_topological_depth: u32,
    pub transitive_callers: u32,
    pub transitive_callees: u32,
    pub betweenness_centrality: f64,
    pub pagerank: f64,
    pub hub_score: f64,
    pub authority_score: f64,
    pub clustering_coeff: f64,
    pub xmod_fan_in: u32,
    pub xmod_fan_out: u32,
    pub xmod_call_ratio: f64,
    pub dominant_callee_mod: Option<String>,
    pub dominant_callee_frac: f64,
    pub utility_score: f64,
    pub stability_rank: f64,
    pub complexity_pct: f64,
    pub middleman_score: f64,
    pub community_id: i64,
    pub community_dominant_mod: Option<String>,
    pub community_alignment: bool,
}

impl NodeFeatures {
    /// All-zero/default feature row for `hash`, the starting point each
    /// enrichment step fills in. A step that never successfully runs
    /// leaves its fields at these defaults, which is how enrichment
    /// degrades rather than fails on a single non-convergent step.
    pub fn zeroed(hash: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            scc_id: 0,
            scc_size: 1,
            scc_cross_module: false,
            topological_depth: 0,
            reverse_topological_depth: 0,
            transitive_callers: 0,
            transitive_callees: 0,
            betweenness_centrality: 0.0,
            pagerank: 0.0,
            hub_score: 0.0,
            authority_score: 0.0,
            clustering_coeff: 0.0,
            xmod_fan_in: 0,
            xmod_fan_out: 0,
            xmod_call_ratio: 0.0,
            dominant_callee_mod: None,
            dominant_callee_frac: 0.0,
            utility_score: 0.0,
            stability_rank: 0.5,
            complexity_pct: 0.0,
            middleman_score: 0.0,
            community_id: -1,
            community_dominant_mod: None,
            community_alignment: false,
        }
    }
}

/// Per-repo load-bearing declarations, overriding heuristic classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBearingConfig {
    #[serde(default)]
    pub declared_nodes: Vec<String>,
    #[serde(default)]
    pub declared_modules: Vec<String>,
}

impl LoadBearingConfig {
    pub fn declares_node(&self, hash: &str) -> bool {
        self.declared_nodes.iter().any(|h| h == hash)
    }

    pub fn declares_module(&self, module: &str) -> bool {
        self.declared_modules
            .iter()
            .any(|substr| module.contains(substr.as_str()))
    }
}

/// Identifies a snapshot (and, for diffs, the pair of snapshots) under
/// analysis. Opaque to the core beyond being a lookup key for the store.
pub type RepoId = String;
