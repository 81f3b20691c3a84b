pub mod blast_radius;
pub mod centrality;
pub mod communities;
pub mod coupling;
pub mod cycles;
pub mod dead_code;
pub mod diff;
pub mod load_bearing;
pub mod patterns;
pub mod triage;

pub use blast_radius::{blast_radius, AffectedNode, BlastRadiusReport};
pub use centrality::{centrality, CentralityRank};
pub use communities::{communities, CommunitiesReport, CommunitySummary, InterCommunityEdge, MisalignedNode};
pub use coupling::{coupling, ModuleCoupling};
pub use cycles::{cycles, BreakSuggestion, CycleReport};
pub use dead_code::{classify_node, dead_code, ClassifiedNode, DeadCodeReport, DeadCodeTier, FileGroup};
pub use diff::{diff, diff_graph, diff_status_map, DiffEdge, DiffGraph, DiffStatus, DiffSummary, EdgeStatus};
pub use load_bearing::{load_bearing, DeclarationKind, LoadBearingNode, LoadBearingReport};
pub use patterns::{detect_all_patterns, PatternInstance, PatternResult};
pub use triage::{triage, DeadFileStat, HighCentralityCandidate, Severity, TriageInputs, TriageIssue, TriageReport};
