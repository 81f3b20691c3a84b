use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use codegraph_analytics::{
    adapters::{
        dead_file_stats, high_centrality_candidates, high_centrality_nodes, module_edges_detail,
        module_graph, node_detail, nodes_table, overview, subgraph, CallDetail, ModuleGraph,
        NodeDetail, NodesTablePage, Overview, SortField,
    },
    diff_coordinator::{
        annotate_group_edges, annotate_pivot, annotate_symbol_edges, symbol_statuses, AnnotatedEdge,
    },
    kernels::{
        blast_radius as blast_radius_kernel, centrality as centrality_kernel,
        communities as communities_kernel, coupling as coupling_kernel, cycles as cycles_kernel,
        dead_code as dead_code_kernel, diff as diff_kernel, diff_graph as diff_graph_kernel,
        diff_status_map as diff_status_map_kernel, load_bearing as load_bearing_kernel,
        triage as triage_kernel, BlastRadiusReport, CentralityRank, CommunitiesReport,
        CycleReport, DeadCodeReport, DiffGraph, DiffStatus, DiffSummary, LoadBearingReport,
        ModuleCoupling, TriageInputs, TriageReport,
    },
    pivot::{available_values, build_rows, pivot, Dimension, Measure, PivotResult, ResolvedDim},
};
use codegraph_core::{
    Edge, LoadBearingConfig, ModuleEdge, Node, NodeFeatures, Result as CoreResult,
};
use codegraph_graph::{EdgeFilters, ModuleEdgeFilters, NodeFilters, SnapshotStore};
use serde::{Deserialize, Serialize};

use crate::{ApiError, ApiResult, AppState};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

fn load_internal(store: &SnapshotStore) -> CoreResult<(Vec<Node>, Vec<Edge>)> {
    let nodes = store.nodes(&NodeFilters { kinds: None, include_external: false })?;
    let edges = store.edges(&EdgeFilters { include_external: false })?;
    Ok((nodes, edges))
}

fn load_all_nodes(store: &SnapshotStore) -> CoreResult<Vec<Node>> {
    store.nodes(&NodeFilters { kinds: None, include_external: true })
}

fn load_features(store: &SnapshotStore) -> CoreResult<Vec<NodeFeatures>> {
    if store.has_features() {
        store.node_features(None)
    } else {
        Ok(Vec::new())
    }
}

pub async fn overview_handler(
    State(state): State<AppState>,
    Path(repo_id): Path<String>,
) -> ApiResult<Json<Overview>> {
    let store = state.open_snapshot(&repo_id)?;
    let (nodes, edges) = load_internal(&store)?;
    Ok(Json(overview(&nodes, &edges)))
}

pub async fn modules_handler(
    State(state): State<AppState>,
    Path(repo_id): Path<String>,
) -> ApiResult<Json<Vec<ModuleCoupling>>> {
    let store = state.open_snapshot(&repo_id)?;
    let nodes = load_all_nodes(&store)?;
    let module_edges = store.module_edges(&ModuleEdgeFilters { include_external: false })?;
    Ok(Json(coupling_kernel(&module_edges, &nodes)))
}

pub async fn module_edges_handler(
    State(state): State<AppState>,
    Path(repo_id): Path<String>,
) -> ApiResult<Json<Vec<ModuleEdge>>> {
    let store = state.open_snapshot(&repo_id)?;
    let module_edges = store.module_edges(&ModuleEdgeFilters { include_external: false })?;
    Ok(Json(module_edges))
}

#[derive(Deserialize)]
pub struct ModuleEdgesDetailQuery {
    pub src: String,
    pub tgt: String,
    pub limit: Option<usize>,
}

pub async fn module_edges_detail_handler(
    State(state): State<AppState>,
    Path(repo_id): Path<String>,
    Query(params): Query<ModuleEdgesDetailQuery>,
) -> ApiResult<Json<Vec<CallDetail>>> {
    let store = state.open_snapshot(&repo_id)?;
    let (nodes, edges) = load_internal(&store)?;
    let limit = params.limit.unwrap_or(100);
    Ok(Json(module_edges_detail(&nodes, &edges, &params.src, &params.tgt, limit)))
}

#[derive(Deserialize)]
pub struct GraphQuery {
    pub module: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Serialize)]
pub struct GraphResponse {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

pub async fn graph_handler(
    State(state): State<AppState>,
    Path(repo_id): Path<String>,
    Query(params): Query<GraphQuery>,
) -> ApiResult<Json<GraphResponse>> {
    let store = state.open_snapshot(&repo_id)?;
    let (nodes, edges) = load_internal(&store)?;
    let limit = params.limit.unwrap_or(200);
    let offset = params.offset.unwrap_or(0);
    let (nodes, edges) = subgraph(&nodes, &edges, params.module.as_deref(), limit, offset);
    Ok(Json(GraphResponse { nodes, edges }))
}

pub async fn node_detail_handler(
    State(state): State<AppState>,
    Path((repo_id, hash)): Path<(String, String)>,
) -> ApiResult<Json<NodeDetail>> {
    let store = state.open_snapshot(&repo_id)?;
    let nodes = load_all_nodes(&store)?;
    let edges = store.edges(&EdgeFilters { include_external: true })?;
    Ok(Json(node_detail(&nodes, &edges, &hash, &repo_id)?))
}

#[derive(Deserialize)]
pub struct BlastRadiusQuery {
    pub max_depth: Option<u32>,
}

pub async fn blast_radius_handler(
    State(state): State<AppState>,
    Path((repo_id, hash)): Path<(String, String)>,
    Query(params): Query<BlastRadiusQuery>,
) -> ApiResult<Json<BlastRadiusReport>> {
    let store = state.open_snapshot(&repo_id)?;
    let (nodes, edges) = load_internal(&store)?;
    let report = blast_radius_kernel(&repo_id, &nodes, &edges, &hash, params.max_depth)?;
    Ok(Json(report))
}

#[derive(Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

pub async fn dead_code_handler(
    State(state): State<AppState>,
    Path(repo_id): Path<String>,
    Query(params): Query<LimitQuery>,
) -> ApiResult<Json<DeadCodeReport>> {
    let store = state.open_snapshot(&repo_id)?;
    let (nodes, _edges) = load_internal(&store)?;
    let total = nodes.len();
    let mut zero_caller: Vec<Node> = nodes.into_iter().filter(|n| n.caller_count == 0).collect();
    if let Some(limit) = params.limit {
        zero_caller.truncate(limit);
    }
    Ok(Json(dead_code_kernel(&zero_caller, total)))
}

#[derive(Deserialize)]
pub struct TopNQuery {
    pub top_n: Option<usize>,
}

pub async fn centrality_handler(
    State(state): State<AppState>,
    Path(repo_id): Path<String>,
    Query(params): Query<TopNQuery>,
) -> ApiResult<Json<Vec<CentralityRank>>> {
    let store = state.open_snapshot(&repo_id)?;
    let (nodes, edges) = load_internal(&store)?;
    Ok(Json(centrality_kernel(&nodes, &edges, params.top_n.unwrap_or(50))))
}

pub async fn cycles_handler(
    State(state): State<AppState>,
    Path(repo_id): Path<String>,
    Query(params): Query<TopNQuery>,
) -> ApiResult<Json<Vec<CycleReport>>> {
    let store = state.open_snapshot(&repo_id)?;
    let (nodes, edges) = load_internal(&store)?;
    Ok(Json(cycles_kernel(&nodes, &edges, params.top_n)))
}

#[derive(Deserialize)]
pub struct ResolutionQuery {
    pub resolution: Option<f64>,
}

pub async fn communities_handler(
    State(state): State<AppState>,
    Path(repo_id): Path<String>,
    Query(params): Query<ResolutionQuery>,
) -> ApiResult<Json<CommunitiesReport>> {
    let store = state.open_snapshot(&repo_id)?;
    let (nodes, edges) = load_internal(&store)?;
    Ok(Json(communities_kernel(&nodes, &edges, params.resolution.unwrap_or(1.0))))
}

#[derive(Deserialize)]
pub struct LoadBearingQuery {
    pub threshold: Option<u32>,
}

pub async fn load_bearing_handler(
    State(state): State<AppState>,
    Path(repo_id): Path<String>,
    Query(params): Query<LoadBearingQuery>,
) -> ApiResult<Json<LoadBearingReport>> {
    let store = state.open_snapshot(&repo_id)?;
    let (nodes, edges) = load_internal(&store)?;
    let config = state.config_store.read(&repo_id)?;
    let candidates = high_centrality_nodes(&nodes, &edges, params.threshold.unwrap_or(3));
    Ok(Json(load_bearing_kernel(&candidates, &config)))
}

#[derive(Deserialize)]
pub struct DeclareRequest {
    pub hash: Option<String>,
    pub module: Option<String>,
    #[serde(default)]
    pub remove: bool,
}

pub async fn load_bearing_declare_handler(
    State(state): State<AppState>,
    Path(repo_id): Path<String>,
    Json(body): Json<DeclareRequest>,
) -> ApiResult<Json<LoadBearingConfig>> {
    if body.hash.is_none() && body.module.is_none() {
        return Err(ApiError::BadRequest("one of `hash` or `module` is required".to_string()));
    }
    let config = state.config_store.declare(
        &repo_id,
        body.hash.as_deref(),
        body.module.as_deref(),
        body.remove,
    )?;
    Ok(Json(config))
}

#[derive(Deserialize)]
pub struct ModuleGraphQuery {
    pub depth: Option<usize>,
}

pub async fn module_graph_handler(
    State(state): State<AppState>,
    Path(repo_id): Path<String>,
    Query(params): Query<ModuleGraphQuery>,
) -> ApiResult<Json<ModuleGraph>> {
    let store = state.open_snapshot(&repo_id)?;
    let nodes = load_all_nodes(&store)?;
    let module_edges = store.module_edges(&ModuleEdgeFilters { include_external: false })?;
    let mut graph = module_graph(&nodes, &module_edges);
    if let Some(depth) = params.depth {
        graph.modules.retain(|m| m.module.split(['.', '/']).count() <= depth);
        let kept: std::collections::HashSet<&str> =
            graph.modules.iter().map(|m| m.module.as_str()).collect();
        graph.edges.retain(|e| {
            kept.contains(e.caller_module.as_str()) && kept.contains(e.callee_module.as_str())
        });
    }
    Ok(Json(graph))
}

#[derive(Deserialize)]
pub struct DiffPairQuery {
    pub a: String,
    pub b: String,
}

fn internal_pair(state: &AppState, a: &str, b: &str) -> ApiResult<(Vec<Node>, Vec<Edge>, Vec<Node>, Vec<Edge>)> {
    let store_a = state.open_snapshot(a)?;
    let store_b = state.open_snapshot(b)?;
    let (nodes_a, edges_a) = load_internal(&store_a)?;
    let (nodes_b, edges_b) = load_internal(&store_b)?;
    Ok((nodes_a, edges_a, nodes_b, edges_b))
}

pub async fn diff_handler(
    State(state): State<AppState>,
    Query(params): Query<DiffPairQuery>,
) -> ApiResult<Json<DiffSummary>> {
    let (nodes_a, _, nodes_b, _) = internal_pair(&state, &params.a, &params.b)?;
    Ok(Json(diff_kernel(&nodes_a, &nodes_b)))
}

#[derive(Deserialize)]
pub struct DiffGraphQuery {
    pub a: String,
    pub b: String,
    pub max_context: Option<usize>,
    pub max_nodes: Option<usize>,
}

pub async fn diff_graph_handler(
    State(state): State<AppState>,
    Query(params): Query<DiffGraphQuery>,
) -> ApiResult<Json<DiffGraph>> {
    let (nodes_a, edges_a, nodes_b, edges_b) = internal_pair(&state, &params.a, &params.b)?;
    Ok(Json(diff_graph_kernel(
        &nodes_a,
        &edges_a,
        &nodes_b,
        &edges_b,
        params.max_context.unwrap_or(10),
        params.max_nodes.unwrap_or(400),
    )))
}

pub async fn diff_status_map_handler(
    State(state): State<AppState>,
    Query(params): Query<DiffPairQuery>,
) -> ApiResult<Json<HashMap<String, DiffStatus>>> {
    let (nodes_a, _, nodes_b, _) = internal_pair(&state, &params.a, &params.b)?;
    Ok(Json(diff_status_map_kernel(&nodes_a, &nodes_b)))
}

#[derive(Deserialize)]
pub struct PivotQuery {
    pub dimensions: Option<String>,
    pub measures: Option<String>,
    pub kinds: Option<String>,
    pub compare_to: Option<String>,
}

#[derive(Serialize)]
pub struct PivotResponse {
    #[serde(flatten)]
    pub result: PivotResult,
    pub edge_status: Option<Vec<AnnotatedEdge>>,
}

pub async fn pivot_handler(
    State(state): State<AppState>,
    Path(repo_id): Path<String>,
    Query(params): Query<PivotQuery>,
) -> ApiResult<Json<PivotResponse>> {
    let store = state.open_snapshot(&repo_id)?;
    let mut nodes = load_all_nodes(&store)?;
    nodes.retain(|n| !n.is_external());
    if let Some(kinds) = &params.kinds {
        let wanted: Vec<String> = kinds.split(',').map(|s| s.trim().to_lowercase()).collect();
        nodes.retain(|n| wanted.iter().any(|k| k == &n.kind.to_string()));
    }
    let features = load_features(&store)?;
    let edges = store.edges(&EdgeFilters { include_external: false })?;
    let rows = build_rows(&nodes, &features);

    let dimensions: Vec<Dimension> = params
        .dimensions
        .as_deref()
        .unwrap_or("")
        .split(',')
        .filter(|s| !s.is_empty())
        .map(|tok| {
            Dimension::parse(tok)
                .ok_or_else(|| ApiError::BadRequest(format!("unknown dimension '{tok}'")))
        })
        .collect::<ApiResult<_>>()?;
    let measures: Vec<Measure> = params
        .measures
        .as_deref()
        .unwrap_or("symbol_count")
        .split(',')
        .filter(|s| !s.is_empty())
        .map(|tok| {
            Measure::parse(tok).ok_or_else(|| ApiError::BadRequest(format!("unknown measure '{tok}'")))
        })
        .collect::<ApiResult<_>>()?;

    let mut result = pivot(&rows, &dimensions, &measures, &edges);

    let edge_status = match &params.compare_to {
        Some(compare_to) => {
            let other_store = state.open_snapshot(compare_to)?;
            let other_nodes = load_all_nodes(&other_store)?;
            let status = symbol_statuses(&nodes, &other_nodes);
            annotate_pivot(&mut result, &dimensions, &rows, &status);
            let top_level = if dimensions.is_empty() {
                annotate_symbol_edges(&result.graph_edges, &status)
            } else {
                let resolved = ResolvedDim::resolve(dimensions[0], &rows);
                annotate_group_edges(&result.graph_edges, &resolved, &rows, &status)
            };
            Some(top_level)
        }
        None => None,
    };

    Ok(Json(PivotResponse { result, edge_status }))
}

#[derive(Deserialize)]
pub struct MinConfidenceQuery {
    pub min_confidence: Option<f64>,
}

pub async fn patterns_handler(
    State(state): State<AppState>,
    Path(repo_id): Path<String>,
    Query(params): Query<MinConfidenceQuery>,
) -> ApiResult<Json<Vec<codegraph_analytics::kernels::PatternResult>>> {
    let store = state.open_snapshot(&repo_id)?;
    let (nodes, edges) = load_internal(&store)?;
    Ok(Json(codegraph_analytics::kernels::detect_all_patterns(
        &nodes,
        &edges,
        params.min_confidence.unwrap_or(0.5),
    )))
}

pub async fn triage_handler(
    State(state): State<AppState>,
    Path(repo_id): Path<String>,
) -> ApiResult<Json<TriageReport>> {
    let store = state.open_snapshot(&repo_id)?;
    let (nodes, edges) = load_internal(&store)?;
    let module_edges = store.module_edges(&ModuleEdgeFilters { include_external: false })?;
    let config = state.config_store.read(&repo_id)?;

    let high_centrality = high_centrality_candidates(&nodes, &edges, 5);
    let dead_files = dead_file_stats(&nodes);
    let inputs = TriageInputs {
        high_centrality_nodes: &high_centrality,
        module_edges: &module_edges,
        call_graph_nodes: &nodes,
        call_graph_edges: &edges,
        dead_file_stats: &dead_files,
    };
    Ok(Json(triage_kernel(&inputs, &config)))
}

#[derive(Deserialize)]
pub struct NodesTableQuery {
    pub module: Option<String>,
    pub sort: Option<String>,
    #[serde(default)]
    pub descending: bool,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

pub async fn nodes_table_handler(
    State(state): State<AppState>,
    Path(repo_id): Path<String>,
    Query(params): Query<NodesTableQuery>,
) -> ApiResult<Json<NodesTablePage>> {
    let store = state.open_snapshot(&repo_id)?;
    let nodes = load_all_nodes(&store)?;
    let sort = match params.sort.as_deref() {
        Some(token) => SortField::parse(token)
            .ok_or_else(|| ApiError::BadRequest(format!("unknown sort field '{token}'")))?,
        None => SortField::CallerCount,
    };
    Ok(Json(nodes_table(
        &nodes,
        params.module.as_deref(),
        sort,
        params.descending,
        params.limit.unwrap_or(100),
        params.offset.unwrap_or(0),
    )))
}

#[derive(Deserialize)]
pub struct PivotValuesQuery {
    pub dimension: String,
    pub kinds: Option<String>,
}

pub async fn pivot_values_handler(
    State(state): State<AppState>,
    Path(repo_id): Path<String>,
    Query(params): Query<PivotValuesQuery>,
) -> ApiResult<Json<Vec<String>>> {
    let store = state.open_snapshot(&repo_id)?;
    let mut nodes = load_all_nodes(&store)?;
    nodes.retain(|n| !n.is_external());
    if let Some(kinds) = &params.kinds {
        let wanted: Vec<String> = kinds.split(',').map(|s| s.trim().to_lowercase()).collect();
        nodes.retain(|n| wanted.iter().any(|k| k == &n.kind.to_string()));
    }
    let features = load_features(&store)?;
    let rows = build_rows(&nodes, &features);
    let dimension = Dimension::parse(&params.dimension)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown dimension '{}'", params.dimension)))?;
    Ok(Json(available_values(dimension, &rows)))
}
