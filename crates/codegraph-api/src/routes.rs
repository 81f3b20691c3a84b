use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{handlers, AppState};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/repos/{repo_id}/overview", get(handlers::overview_handler))
        .route("/repos/{repo_id}/modules", get(handlers::modules_handler))
        .route("/repos/{repo_id}/coupling", get(handlers::modules_handler))
        .route("/repos/{repo_id}/module-edges", get(handlers::module_edges_handler))
        .route(
            "/repos/{repo_id}/module-edges/detail",
            get(handlers::module_edges_detail_handler),
        )
        .route("/repos/{repo_id}/graph", get(handlers::graph_handler))
        .route("/repos/{repo_id}/nodes", get(handlers::nodes_table_handler))
        .route("/repos/{repo_id}/pivot/values", get(handlers::pivot_values_handler))
        .route("/repos/{repo_id}/nodes/{hash}", get(handlers::node_detail_handler))
        .route(
            "/repos/{repo_id}/nodes/{hash}/blast-radius",
            get(handlers::blast_radius_handler),
        )
        .route("/repos/{repo_id}/dead-code", get(handlers::dead_code_handler))
        .route("/repos/{repo_id}/centrality", get(handlers::centrality_handler))
        .route("/repos/{repo_id}/cycles", get(handlers::cycles_handler))
        .route("/repos/{repo_id}/communities", get(handlers::communities_handler))
        .route("/repos/{repo_id}/load-bearing", get(handlers::load_bearing_handler))
        .route(
            "/repos/{repo_id}/load-bearing/declare",
            post(handlers::load_bearing_declare_handler),
        )
        .route("/repos/{repo_id}/module-graph", get(handlers::module_graph_handler))
        .route("/repos/{repo_id}/pivot", get(handlers::pivot_handler))
        .route("/repos/{repo_id}/patterns", get(handlers::patterns_handler))
        .route("/repos/{repo_id}/triage", get(handlers::triage_handler))
        .route("/diff", get(handlers::diff_handler))
        .route("/diff/graph", get(handlers::diff_graph_handler))
        .route("/diff/status-map", get(handlers::diff_status_map_handler))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(TraceLayer::new_for_http())
}
