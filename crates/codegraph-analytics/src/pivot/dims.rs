use codegraph_core::{Node, NodeFeatures, Risk};

use super::row::PivotRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpleDim {
    Module,
    Risk,
    Kind,
    Symbol,
    Dead,
    HighRisk,
    InCycle,
    CommunityDominantMod,
    CommunityAlignment,
}

impl SimpleDim {
    fn parse(token: &str) -> Option<Self> {
        Some(match token {
            "module" => Self::Module,
            "risk" => Self::Risk,
            "kind" => Self::Kind,
            "symbol" => Self::Symbol,
            "dead" => Self::Dead,
            "high_risk" => Self::HighRisk,
            "in_cycle" => Self::InCycle,
            "community_dominant_mod" => Self::CommunityDominantMod,
            "community_alignment" => Self::CommunityAlignment,
            _ => return None,
        })
    }

    fn token(self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Risk => "risk",
            Self::Kind => "kind",
            Self::Symbol => "symbol",
            Self::Dead => "dead",
            Self::HighRisk => "high_risk",
            Self::InCycle => "in_cycle",
            Self::CommunityDominantMod => "community_dominant_mod",
            Self::CommunityAlignment => "community_alignment",
        }
    }

    fn requires_enriched(self) -> bool {
        matches!(self, Self::InCycle | Self::CommunityDominantMod | Self::CommunityAlignment)
    }

    /// Resolves this dimension's string key for a single row. Enriched
    /// dims are only ever called on a row with a feature set; the caller
    /// already filtered on `requires_enriched`.
    fn key(self, row: &PivotRow) -> String {
        match self {
            Self::Module => row.node.module_or_external().to_string(),
            Self::Risk => row.node.risk.to_string(),
            Self::Kind => row.node.kind.to_string(),
            Self::Symbol => format!("{}::{}", row.node.module_or_external(), row.node.name),
            Self::Dead => if row.node.caller_count == 0 { "dead" } else { "alive" }.to_string(),
            Self::HighRisk => {
                if matches!(row.node.risk, Risk::High | Risk::Critical) {
                    "high-risk".to_string()
                } else {
                    "normal".to_string()
                }
            }
            Self::InCycle => {
                let scc_size = row.features.map(|f| f.scc_size).unwrap_or(1);
                if scc_size > 1 { "in-cycle".to_string() } else { "clean".to_string() }
            }
            Self::CommunityDominantMod => row
                .features
                .and_then(|f| f.community_dominant_mod.clone())
                .unwrap_or_default(),
            Self::CommunityAlignment => {
                let aligned = row.features.map(|f| f.community_alignment).unwrap_or(true);
                if aligned { "aligned".to_string() } else { "misaligned".to_string() }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketField {
    CallerCount,
    CalleeCount,
    Complexity,
    DeadRatio,
    HighRiskRatio,
    InCycleRatio,
    PageRank,
    Utility,
    XmodFanIn,
    Betweenness,
}

impl BucketField {
    fn parse(token: &str) -> Option<Self> {
        Some(match token {
            "caller_count" => Self::CallerCount,
            "callee_count" => Self::CalleeCount,
            "complexity" => Self::Complexity,
            "dead_ratio" => Self::DeadRatio,
            "high_risk_ratio" => Self::HighRiskRatio,
            "in_cycle_ratio" => Self::InCycleRatio,
            "pagerank" => Self::PageRank,
            "utility" => Self::Utility,
            "xmod_fan_in" => Self::XmodFanIn,
            "betweenness" => Self::Betweenness,
            _ => return None,
        })
    }

    fn token(self) -> &'static str {
        match self {
            Self::CallerCount => "caller_count",
            Self::CalleeCount => "callee_count",
            Self::Complexity => "complexity",
            Self::DeadRatio => "dead_ratio",
            Self::HighRiskRatio => "high_risk_ratio",
            Self::InCycleRatio => "in_cycle_ratio",
            Self::PageRank => "pagerank",
            Self::Utility => "utility",
            Self::XmodFanIn => "xmod_fan_in",
            Self::Betweenness => "betweenness",
        }
    }

    fn requires_enriched(self) -> bool {
        matches!(self, Self::InCycleRatio | Self::PageRank | Self::Utility | Self::XmodFanIn | Self::Betweenness)
    }

    /// Raw numeric value this field resolves to for one row; `None` when
    /// the row has no feature set and the field needs one.
    pub fn value(self, node: &Node, features: Option<&NodeFeatures>) -> Option<f64> {
        match self {
            Self::CallerCount => Some(node.caller_count as f64),
            Self::CalleeCount => Some(node.callee_count as f64),
            Self::Complexity => Some(node.complexity as f64),
            Self::DeadRatio => Some(if node.caller_count == 0 { 0.0 } else { 1.0 }),
            Self::HighRiskRatio => {
                Some(if matches!(node.risk, Risk::High | Risk::Critical) { 1.0 } else { 0.0 })
            }
            Self::InCycleRatio => features.map(|f| if f.scc_size > 1 { 1.0 } else { 0.0 }),
            Self::PageRank => features.map(|f| f.pagerank),
            Self::Utility => features.map(|f| f.utility_score),
            Self::XmodFanIn => features.map(|f| f.xmod_fan_in as f64),
            Self::Betweenness => features.map(|f| f.betweenness_centrality),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketMode {
    Median,
    Quartile,
    Decile,
}

impl BucketMode {
    fn parse(token: &str) -> Option<Self> {
        Some(match token {
            "median" => Self::Median,
            "quartile" => Self::Quartile,
            "decile" => Self::Decile,
            _ => return None,
        })
    }

    fn bucket_count(self) -> usize {
        match self {
            Self::Median => 2,
            Self::Quartile => 4,
            Self::Decile => 10,
        }
    }

    fn labels(self) -> Vec<String> {
        match self {
            Self::Median => vec!["low".to_string(), "high".to_string()],
            Self::Quartile => (1..=4).map(|i| format!("Q{i}")).collect(),
            Self::Decile => (1..=10).map(|i| format!("D{i}")).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Simple(SimpleDim),
    Bucketed(BucketField, BucketMode),
}

impl Dimension {
    pub fn parse(token: &str) -> Option<Self> {
        if let Some((field, mode)) = token.split_once(':') {
            let field = BucketField::parse(field)?;
            let mode = BucketMode::parse(mode)?;
            return Some(Self::Bucketed(field, mode));
        }
        SimpleDim::parse(token).map(Self::Simple)
    }

    pub fn token(&self) -> String {
        match self {
            Self::Simple(d) => d.token().to_string(),
            Self::Bucketed(f, m) => {
                let mode = match m {
                    BucketMode::Median => "median",
                    BucketMode::Quartile => "quartile",
                    BucketMode::Decile => "decile",
                };
                format!("{}:{}", f.token(), mode)
            }
        }
    }

    pub fn requires_enriched(&self) -> bool {
        match self {
            Self::Simple(d) => d.requires_enriched(),
            Self::Bucketed(f, _) => f.requires_enriched(),
        }
    }
}

/// `N-1` nearest-rank cut-points over `field`'s values across `rows`,
/// matching the source's `vals[len(vals) * i / n_buckets]` indexing
/// exactly (no interpolation).
pub fn compute_cutpoints(field: BucketField, rows: &[PivotRow], n_buckets: usize) -> Vec<f64> {
    let mut values: Vec<f64> = rows.iter().filter_map(|r| field.value(r.node, r.features)).collect();
    if values.is_empty() {
        return Vec::new();
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap());
    (1..n_buckets).map(|i| values[values.len() * i / n_buckets]).collect()
}

fn bucket_label(value: f64, cutpoints: &[f64], labels: &[String]) -> String {
    if cutpoints.is_empty() {
        return labels.last().cloned().unwrap_or_default();
    }
    for (i, &cut) in cutpoints.iter().enumerate() {
        if value < cut {
            return labels[i].clone();
        }
    }
    labels.last().cloned().unwrap_or_default()
}

/// A dimension that has been resolved against the current snapshot: its
/// original token, and (for bucketed dims) precomputed cut-points.
pub struct ResolvedDim {
    pub dimension: Dimension,
    cutpoints: Vec<f64>,
    labels: Vec<String>,
}

impl ResolvedDim {
    pub fn resolve(dimension: Dimension, rows: &[PivotRow]) -> Self {
        let (cutpoints, labels) = match dimension {
            Dimension::Bucketed(field, mode) => {
                (compute_cutpoints(field, rows, mode.bucket_count()), mode.labels())
            }
            Dimension::Simple(_) => (Vec::new(), Vec::new()),
        };
        ResolvedDim { dimension, cutpoints, labels }
    }

    pub fn token(&self) -> String {
        self.dimension.token()
    }

    pub fn key(&self, row: &PivotRow) -> String {
        match self.dimension {
            Dimension::Simple(d) => d.key(row),
            Dimension::Bucketed(field, _) => match field.value(row.node, row.features) {
                Some(v) => bucket_label(v, &self.cutpoints, &self.labels),
                None => self.labels.last().cloned().unwrap_or_default(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::{Kind, NodeFeatures, Risk};

    fn node(hash: &str, module: &str, caller_count: u32) -> Node {
        Node {
            hash: hash.to_string(),
            name: hash.to_string(),
            module: Some(module.to_string()),
            kind: Kind::Function,
            file_path: "f.py".to_string(),
            line_start: 1,
            line_end: 1,
            complexity: 1,
            caller_count,
            callee_count: 1,
            risk: Risk::Low,
        }
    }

    fn row<'a>(node: &'a Node, features: Option<&'a NodeFeatures>) -> PivotRow<'a> {
        PivotRow { node, features }
    }

    #[test]
    fn parse_round_trips_simple_and_bucketed_tokens() {
        assert_eq!(Dimension::parse("module"), Some(Dimension::Simple(SimpleDim::Module)));
        assert_eq!(Dimension::parse("utility:quartile").unwrap().token(), "utility:quartile");
        assert_eq!(Dimension::parse("not_a_dim"), None);
        assert_eq!(Dimension::parse("utility:not_a_mode"), None);
    }

    #[test]
    fn dead_dimension_keys_on_zero_caller_count() {
        let alive = node("a", "m", 1);
        let dead = node("b", "m", 0);
        let dim = SimpleDim::Dead;
        assert_eq!(dim.key(&row(&alive, None)), "alive");
        assert_eq!(dim.key(&row(&dead, None)), "dead");
    }

    #[test]
    fn in_cycle_dimension_requires_features_and_defaults_to_clean() {
        let n = node("a", "m", 1);
        let mut features = NodeFeatures::zeroed("a");
        features.scc_size = 3;
        let dim = SimpleDim::InCycle;
        assert_eq!(dim.key(&row(&n, Some(&features))), "in-cycle");
        assert_eq!(dim.key(&row(&n, None)), "clean");
    }

    #[test]
    fn compute_cutpoints_uses_nearest_rank_indexing() {
        let n0 = node("a", "m", 0);
        let n1 = node("b", "m", 10);
        let n2 = node("c", "m", 20);
        let n3 = node("d", "m", 30);
        let rows = vec![row(&n0, None), row(&n1, None), row(&n2, None), row(&n3, None)];
        let cuts = compute_cutpoints(BucketField::CallerCount, &rows, 2);
        assert_eq!(cuts, vec![20.0]);
    }

    #[test]
    fn compute_cutpoints_on_empty_rows_is_empty() {
        assert!(compute_cutpoints(BucketField::CallerCount, &[], 4).is_empty());
    }

    #[test]
    fn resolved_bucketed_dim_assigns_median_labels_either_side_of_cutpoint() {
        let low = node("a", "m", 0);
        let high = node("b", "m", 100);
        let rows = vec![row(&low, None), row(&high, None)];
        let resolved = ResolvedDim::resolve(Dimension::Bucketed(BucketField::CallerCount, BucketMode::Median), &rows);
        assert_eq!(resolved.key(&rows[0]), "low");
        assert_eq!(resolved.key(&rows[1]), "high");
    }
}
