use codegraph_core::Risk;
use serde::Serialize;

use super::row::PivotRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureType {
    Int,
    Float,
    Ratio,
}

impl MeasureType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Ratio => "ratio",
        }
    }
}

impl Serialize for MeasureType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialMeasure {
    SymbolCount,
    DeadRatio,
    HighRiskRatio,
    InCycleRatio,
}

impl SpecialMeasure {
    fn parse(token: &str) -> Option<Self> {
        Some(match token {
            "symbol_count" => Self::SymbolCount,
            "dead_ratio" => Self::DeadRatio,
            "high_risk_ratio" => Self::HighRiskRatio,
            "in_cycle_ratio" => Self::InCycleRatio,
            _ => return None,
        })
    }

    fn token(self) -> &'static str {
        match self {
            Self::SymbolCount => "symbol_count",
            Self::DeadRatio => "dead_ratio",
            Self::HighRiskRatio => "high_risk_ratio",
            Self::InCycleRatio => "in_cycle_ratio",
        }
    }

    fn requires_enriched(self) -> bool {
        matches!(self, Self::InCycleRatio)
    }

    fn measure_type(self) -> MeasureType {
        match self {
            Self::SymbolCount => MeasureType::Int,
            _ => MeasureType::Ratio,
        }
    }

    /// Per-row value, used at symbol grain (no aggregation).
    fn symbol_value(self, row: &PivotRow) -> Option<f64> {
        match self {
            Self::SymbolCount => Some(1.0),
            Self::DeadRatio => Some(if row.node.caller_count == 0 { 1.0 } else { 0.0 }),
            Self::HighRiskRatio => {
                Some(if matches!(row.node.risk, Risk::High | Risk::Critical) { 1.0 } else { 0.0 })
            }
            Self::InCycleRatio => row.features.map(|f| if f.scc_size > 1 { 1.0 } else { 0.0 }),
        }
    }

    /// Aggregated value over a whole group.
    fn group_value(self, rows: &[PivotRow]) -> Option<f64> {
        if rows.is_empty() {
            return Some(0.0);
        }
        match self {
            Self::SymbolCount => Some(rows.len() as f64),
            Self::DeadRatio => {
                let dead = rows.iter().filter(|r| r.node.caller_count == 0).count();
                Some(round3(dead as f64 / rows.len() as f64))
            }
            Self::HighRiskRatio => {
                let high = rows.iter().filter(|r| matches!(r.node.risk, Risk::High | Risk::Critical)).count();
                Some(round3(high as f64 / rows.len() as f64))
            }
            Self::InCycleRatio => {
                if rows.iter().any(|r| r.features.is_none()) && rows.iter().all(|r| r.features.is_none()) {
                    return None;
                }
                let in_cycle = rows.iter().filter(|r| r.features.map(|f| f.scc_size > 1).unwrap_or(false)).count();
                Some(round3(in_cycle as f64 / rows.len() as f64))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureField {
    CallerCount,
    CalleeCount,
    Complexity,
    Utility,
    PageRank,
    XmodFanIn,
    TopoDepth,
    Betweenness,
}

impl MeasureField {
    fn parse(token: &str) -> Option<Self> {
        Some(match token {
            "caller_count" => Self::CallerCount,
            "callee_count" => Self::CalleeCount,
            "complexity" => Self::Complexity,
            "utility" => Self::Utility,
            "pagerank" => Self::PageRank,
            "xmod_fan_in" => Self::XmodFanIn,
            "topo_depth" => Self::TopoDepth,
            "betweenness" => Self::Betweenness,
            _ => return None,
        })
    }

    fn token(self) -> &'static str {
        match self {
            Self::CallerCount => "caller_count",
            Self::CalleeCount => "callee_count",
            Self::Complexity => "complexity",
            Self::Utility => "utility",
            Self::PageRank => "pagerank",
            Self::XmodFanIn => "xmod_fan_in",
            Self::TopoDepth => "topo_depth",
            Self::Betweenness => "betweenness",
        }
    }

    fn requires_enriched(self) -> bool {
        matches!(self, Self::Utility | Self::PageRank | Self::XmodFanIn | Self::TopoDepth | Self::Betweenness)
    }

    fn base_type(self) -> MeasureType {
        match self {
            Self::CallerCount | Self::CalleeCount | Self::Complexity | Self::XmodFanIn | Self::TopoDepth => {
                MeasureType::Int
            }
            Self::Utility | Self::PageRank | Self::Betweenness => MeasureType::Float,
        }
    }

    pub fn value(self, row: &PivotRow) -> Option<f64> {
        match self {
            Self::CallerCount => Some(row.node.caller_count as f64),
            Self::CalleeCount => Some(row.node.callee_count as f64),
            Self::Complexity => Some(row.node.complexity as f64),
            Self::Utility => row.features.map(|f| f.utility_score),
            Self::PageRank => row.features.map(|f| f.pagerank),
            Self::XmodFanIn => row.features.map(|f| f.xmod_fan_in as f64),
            Self::TopoDepth => row.features.map(|f| f.topological_depth as f64),
            Self::Betweenness => row.features.map(|f| f.betweenness_centrality),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Agg {
    Avg,
    Min,
    Max,
    Sum,
    Count,
    StdDev,
}

impl Agg {
    fn parse(token: &str) -> Option<Self> {
        Some(match token {
            "avg" => Self::Avg,
            "min" => Self::Min,
            "max" => Self::Max,
            "sum" => Self::Sum,
            "count" => Self::Count,
            "stddev" => Self::StdDev,
            _ => return None,
        })
    }

    fn token(self) -> &'static str {
        match self {
            Self::Avg => "avg",
            Self::Min => "min",
            Self::Max => "max",
            Self::Sum => "sum",
            Self::Count => "count",
            Self::StdDev => "stddev",
        }
    }

    /// Population standard deviation; 0.0 for fewer than two samples,
    /// matching the source's custom `stddev_pop` aggregate.
    fn apply(self, values: &[f64]) -> f64 {
        match self {
            Self::Count => values.len() as f64,
            Self::Sum => values.iter().sum(),
            Self::Min => values.iter().cloned().fold(f64::INFINITY, f64::min),
            Self::Max => values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            Self::Avg => round4(values.iter().sum::<f64>() / values.len() as f64),
            Self::StdDev => {
                if values.len() < 2 {
                    return 0.0;
                }
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
                round4(variance.sqrt())
            }
        }
    }
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Special(SpecialMeasure),
    Dynamic(MeasureField, Agg),
}

impl Measure {
    pub fn parse(token: &str) -> Option<Self> {
        if let Some((field, agg)) = token.split_once(':') {
            let field = MeasureField::parse(field)?;
            let agg = Agg::parse(agg)?;
            return Some(Self::Dynamic(field, agg));
        }
        SpecialMeasure::parse(token).map(Self::Special)
    }

    pub fn token(&self) -> String {
        match self {
            Self::Special(s) => s.token().to_string(),
            Self::Dynamic(f, a) => format!("{}_{}", f.token(), a.token()),
        }
    }

    pub fn requires_enriched(&self) -> bool {
        match self {
            Self::Special(s) => s.requires_enriched(),
            Self::Dynamic(f, _) => f.requires_enriched(),
        }
    }

    pub fn measure_type(&self) -> MeasureType {
        match self {
            Self::Special(s) => s.measure_type(),
            Self::Dynamic(f, a) => match a {
                Agg::Count => MeasureType::Int,
                Agg::Avg | Agg::StdDev => MeasureType::Float,
                _ => f.base_type(),
            },
        }
    }

    /// Evaluated at symbol grain (zero dimensions): one value per row, no
    /// aggregation. `None` if the row can't supply it (enriched field
    /// missing), in which case the caller drops the whole measure.
    pub fn symbol_value(&self, row: &PivotRow) -> Option<f64> {
        match self {
            Self::Special(s) => s.symbol_value(row),
            Self::Dynamic(f, _) => f.value(row),
        }
    }

    /// Evaluated over a group of rows (pivot grain).
    pub fn group_value(&self, rows: &[PivotRow]) -> Option<f64> {
        match self {
            Self::Special(s) => s.group_value(rows),
            Self::Dynamic(f, agg) => {
                let values: Vec<f64> = rows.iter().filter_map(|r| f.value(r)).collect();
                if values.is_empty() && !matches!(agg, Agg::Count) {
                    return Some(0.0);
                }
                Some(agg.apply(&values))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::{Kind, NodeFeatures};

    fn node(hash: &str, caller_count: u32, risk: Risk) -> codegraph_core::Node {
        codegraph_core::Node {
            hash: hash.to_string(),
            name: hash.to_string(),
            module: Some("m".to_string()),
            kind: Kind::Function,
            file_path: "f.py".to_string(),
            line_start: 1,
            line_end: 1,
            complexity: 4,
            caller_count,
            callee_count: 1,
            risk,
        }
    }

    fn row<'a>(node: &'a codegraph_core::Node, features: Option<&'a NodeFeatures>) -> PivotRow<'a> {
        PivotRow { node, features }
    }

    #[test]
    fn parse_round_trips_special_and_dynamic_tokens() {
        assert_eq!(Measure::parse("symbol_count"), Some(Measure::Special(SpecialMeasure::SymbolCount)));
        assert_eq!(Measure::parse("complexity:avg").unwrap().token(), "complexity_avg");
        assert_eq!(Measure::parse("garbage"), None);
        assert_eq!(Measure::parse("complexity:not_an_agg"), None);
    }

    #[test]
    fn dead_ratio_group_value_is_the_fraction_with_no_callers() {
        let a = node("a", 0, Risk::Low);
        let b = node("b", 1, Risk::Low);
        let rows = vec![row(&a, None), row(&b, None)];
        let measure = Measure::Special(SpecialMeasure::DeadRatio);
        assert_eq!(measure.group_value(&rows), Some(0.5));
    }

    #[test]
    fn high_risk_ratio_counts_high_and_critical() {
        let a = node("a", 1, Risk::High);
        let b = node("b", 1, Risk::Critical);
        let c = node("c", 1, Risk::Low);
        let rows = vec![row(&a, None), row(&b, None), row(&c, None)];
        let measure = Measure::Special(SpecialMeasure::HighRiskRatio);
        assert_eq!(measure.group_value(&rows), Some(round3(2.0 / 3.0)));
    }

    #[test]
    fn dynamic_avg_aggregates_complexity_across_rows() {
        let a = node("a", 1, Risk::Low);
        let b = node("b", 1, Risk::Low);
        let rows = vec![row(&a, None), row(&b, None)];
        let measure = Measure::Dynamic(MeasureField::Complexity, Agg::Avg);
        assert_eq!(measure.group_value(&rows), Some(4.0));
    }

    #[test]
    fn dynamic_stddev_of_a_single_sample_is_zero() {
        let a = node("a", 1, Risk::Low);
        let rows = vec![row(&a, None)];
        let measure = Measure::Dynamic(MeasureField::Complexity, Agg::StdDev);
        assert_eq!(measure.group_value(&rows), Some(0.0));
    }

    #[test]
    fn enriched_measure_with_no_feature_rows_defaults_to_zero() {
        let a = node("a", 1, Risk::Low);
        let rows = vec![row(&a, None)];
        let measure = Measure::Dynamic(MeasureField::PageRank, Agg::Avg);
        assert_eq!(measure.group_value(&rows), Some(0.0));
    }

    #[test]
    fn symbol_count_type_is_int_while_ratios_are_ratio() {
        assert_eq!(Measure::Special(SpecialMeasure::SymbolCount).measure_type().as_str(), "int");
        assert_eq!(Measure::Special(SpecialMeasure::DeadRatio).measure_type().as_str(), "ratio");
    }
}
