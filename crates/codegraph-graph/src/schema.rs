//! DDL for the bit-stable snapshot schema. `nodes`/`edges`/`module_edges`
//! match what the indexer writes; `node_features` is derived-only and is
//! created (and replaced) by enrichment, never by the indexer.

pub const CREATE_NODES: &str = r#"
CREATE TABLE IF NOT EXISTS nodes (
    hash          TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    module        TEXT,
    file_path     TEXT NOT NULL,
    line_start    INTEGER NOT NULL,
    line_end      INTEGER NOT NULL,
    kind          TEXT NOT NULL,
    risk          TEXT NOT NULL,
    complexity    INTEGER NOT NULL,
    caller_count  INTEGER NOT NULL,
    callee_count  INTEGER NOT NULL
)
"#;

pub const CREATE_EDGES: &str = r#"
CREATE TABLE IF NOT EXISTS edges (
    caller_hash TEXT NOT NULL,
    callee_hash TEXT NOT NULL,
    call_count  INTEGER NOT NULL
)
"#;

pub const CREATE_EDGES_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_edges_caller ON edges(caller_hash)";
pub const CREATE_EDGES_INDEX_CALLEE: &str =
    "CREATE INDEX IF NOT EXISTS idx_edges_callee ON edges(callee_hash)";

pub const CREATE_MODULE_EDGES: &str = r#"
CREATE TABLE IF NOT EXISTS module_edges (
    caller_module TEXT NOT NULL,
    callee_module TEXT NOT NULL,
    edge_count    INTEGER NOT NULL
)
"#;

/// `node_features` carries the 25 enrichment fields of the spec's feature
/// table. Dropped and recreated wholesale on every enrichment run, not
/// incrementally updated — enrichment is a whole-snapshot recomputation.
pub const CREATE_NODE_FEATURES: &str = r#"
CREATE TABLE IF NOT EXISTS node_features (
    hash                     TEXT PRIMARY KEY,
    scc_id                   INTEGER NOT NULL,
    scc_size                 INTEGER NOT NULL,
    scc_cross_module         INTEGER NOT NULL,
    topological_depth        INTEGER NOT NULL,
    reverse_topological_depth INTEGER NOT NULL,
    transitive_callers       INTEGER NOT NULL,
    transitive_callees       INTEGER NOT NULL,
    betweenness_centrality   REAL NOT NULL,
    pagerank                 REAL NOT NULL,
    hub_score                REAL NOT NULL,
    authority_score          REAL NOT NULL,
    clustering_coeff         REAL NOT NULL,
    xmod_fan_in              INTEGER NOT NULL,
    xmod_fan_out             INTEGER NOT NULL,
    xmod_call_ratio          REAL NOT NULL,
    dominant_callee_mod      TEXT,
    dominant_callee_frac     REAL NOT NULL,
    utility_score            REAL NOT NULL,
    stability_rank           REAL NOT NULL,
    complexity_pct           REAL NOT NULL,
    middleman_score          REAL NOT NULL,
    community_id             INTEGER NOT NULL,
    community_dominant_mod   TEXT,
    community_alignment      INTEGER NOT NULL
)
"#;

/// Applied to every freshly opened connection, raw or derived.
pub fn init_base_schema(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute(CREATE_NODES, [])?;
    conn.execute(CREATE_EDGES, [])?;
    conn.execute(CREATE_EDGES_INDEX, [])?;
    conn.execute(CREATE_EDGES_INDEX_CALLEE, [])?;
    conn.execute(CREATE_MODULE_EDGES, [])?;
    Ok(())
}

/// Applied only when writing a derived (enriched) snapshot.
pub fn init_features_schema(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute(CREATE_NODE_FEATURES, [])?;
    Ok(())
}
