use std::path::{Path, PathBuf};
use std::str::FromStr;

use codegraph_core::{CodeGraphError, Edge, Kind, ModuleEdge, Node, NodeFeatures, Result, Risk};
use rusqlite::Connection;

use crate::schema;

/// Optional filters applied when listing nodes. `None` fields mean
/// unfiltered; `include_external = false` (the default) drops `ext:`-hash
/// rows, matching the "external symbols filtered from internal analyses"
/// invariant.
#[derive(Debug, Clone, Default)]
pub struct NodeFilters {
    pub kinds: Option<Vec<String>>,
    pub include_external: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EdgeFilters {
    pub include_external: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ModuleEdgeFilters {
    pub include_external: bool,
}

/// A read-only handle over one repo's relational snapshot. Opens the
/// derived (`{repo_id}.enriched.db`) snapshot when present, else the raw
/// one, mirroring the indexer's own preference.
pub struct SnapshotStore {
    conn: Connection,
    repo_id: String,
    has_features: bool,
}

impl SnapshotStore {
    /// Opens the snapshot for `repo_id` under `data_dir`. Fails with
    /// `SnapshotNotFound` if neither file exists.
    pub fn open(data_dir: &Path, repo_id: &str) -> Result<Self> {
        let enriched_path = data_dir.join(format!("{repo_id}.enriched.db"));
        let raw_path = data_dir.join(format!("{repo_id}.db"));

        let (path, has_features) = if enriched_path.exists() {
            (enriched_path, true)
        } else if raw_path.exists() {
            (raw_path, false)
        } else {
            return Err(CodeGraphError::SnapshotNotFound {
                repo_id: repo_id.to_string(),
            });
        };

        Self::open_path(&path, repo_id, has_features)
    }

    fn open_path(path: &Path, repo_id: &str, has_features: bool) -> Result<Self> {
        let conn = Connection::open(path)?;
        schema::init_base_schema(&conn)?;
        if has_features {
            schema::init_features_schema(&conn)?;
        }
        Ok(Self {
            conn,
            repo_id: repo_id.to_string(),
            has_features,
        })
    }

    /// Opens (creating if absent) a writable derived snapshot at
    /// `{repo_id}.enriched.db`, used by the enrichment pipeline. Schema for
    /// both the base tables and `node_features` is applied unconditionally
    /// so enrichment can run against a freshly created file.
    pub fn open_for_enrichment(data_dir: &Path, repo_id: &str) -> Result<Self> {
        let path = data_dir.join(format!("{repo_id}.enriched.db.tmp"));
        let conn = Connection::open(&path)?;
        schema::init_base_schema(&conn)?;
        schema::init_features_schema(&conn)?;
        Ok(Self {
            conn,
            repo_id: repo_id.to_string(),
            has_features: true,
        })
    }

    pub fn repo_id(&self) -> &str {
        &self.repo_id
    }

    pub fn has_features(&self) -> bool {
        self.has_features
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn corrupt(&self, operation: &str, detail: impl ToString) -> CodeGraphError {
        CodeGraphError::SnapshotCorrupt {
            repo_id: self.repo_id.clone(),
            operation: operation.to_string(),
            detail: detail.to_string(),
        }
    }

    pub fn nodes(&self, filters: &NodeFilters) -> Result<Vec<Node>> {
        let mut sql = String::from(
            "SELECT hash, name, module, file_path, line_start, line_end, kind, risk, \
             complexity, caller_count, callee_count FROM nodes",
        );
        let mut clauses = Vec::new();
        if !filters.include_external {
            clauses.push("hash NOT LIKE 'ext:%'".to_string());
        }
        if let Some(kinds) = &filters.kinds {
            if kinds.is_empty() {
                return Ok(Vec::new());
            }
            let list = kinds
                .iter()
                .map(|k| format!("'{}'", k.replace('\'', "''")))
                .collect::<Vec<_>>()
                .join(", ");
            clauses.push(format!("kind IN ({list})"));
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| self.corrupt("nodes", e))?;
        let rows = stmt
            .query_map([], |row| {
                let kind_str: String = row.get(6)?;
                let risk_str: String = row.get(7)?;
                Ok(Node {
                    hash: row.get(0)?,
                    name: row.get(1)?,
                    module: row.get(2)?,
                    file_path: row.get(3)?,
                    line_start: row.get(4)?,
                    line_end: row.get(5)?,
                    kind: Kind::from_str(&kind_str).unwrap(),
                    risk: Risk::from_str(&risk_str).unwrap_or(Risk::Low),
                    complexity: row.get(8)?,
                    caller_count: row.get(9)?,
                    callee_count: row.get(10)?,
                })
            })
            .map_err(|e| self.corrupt("nodes", e))?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| self.corrupt("nodes", e))
    }

    pub fn edges(&self, filters: &EdgeFilters) -> Result<Vec<Edge>> {
        let mut sql = String::from("SELECT caller_hash, callee_hash, call_count FROM edges");
        if !filters.include_external {
            sql.push_str(" WHERE caller_hash NOT LIKE 'ext:%' AND callee_hash NOT LIKE 'ext:%'");
        }
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| self.corrupt("edges", e))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Edge {
                    caller_hash: row.get(0)?,
                    callee_hash: row.get(1)?,
                    call_count: row.get(2)?,
                })
            })
            .map_err(|e| self.corrupt("edges", e))?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| self.corrupt("edges", e))
    }

    pub fn module_edges(&self, filters: &ModuleEdgeFilters) -> Result<Vec<ModuleEdge>> {
        let mut sql =
            String::from("SELECT caller_module, callee_module, edge_count FROM module_edges");
        if !filters.include_external {
            sql.push_str(
                " WHERE caller_module != '__external__' AND callee_module != '__external__'",
            );
        }
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| self.corrupt("module_edges", e))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ModuleEdge {
                    caller_module: row.get(0)?,
                    callee_module: row.get(1)?,
                    edge_count: row.get(2)?,
                })
            })
            .map_err(|e| self.corrupt("module_edges", e))?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| self.corrupt("module_edges", e))
    }

    /// Present only on derived snapshots. Callers must branch on
    /// `has_features()` first; calling this on a raw snapshot raises
    /// `SchemaMissing`.
    pub fn node_features(&self, hashes: Option<&[String]>) -> Result<Vec<NodeFeatures>> {
        if !self.has_features {
            return Err(CodeGraphError::SchemaMissing {
                repo_id: self.repo_id.clone(),
                operation: "node_features".to_string(),
                table: "node_features".to_string(),
            });
        }

        let mut sql = String::from(
            "SELECT hash, scc_id, scc_size, scc_cross_module, topological_depth, \
             reverse_topological_depth, transitive_callers, transitive_callees, \
             betweenness_centrality, pagerank, hub_score, authority_score, \
             clustering_coeff, xmod_fan_in, xmod_fan_out, xmod_call_ratio, \
             dominant_callee_mod, dominant_callee_frac, utility_score, stability_rank, \
             complexity_pct, middleman_score, community_id, community_dominant_mod, \
             community_alignment FROM node_features",
        );
        if let Some(hashes) = hashes {
            if hashes.is_empty() {
                return Ok(Vec::new());
            }
            let list = hashes
                .iter()
                .map(|h| format!("'{}'", h.replace('\'', "''")))
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(&format!(" WHERE hash IN ({list})"));
        }

        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| self.corrupt("node_features", e))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(NodeFeatures {
                    hash: row.get(0)?,
                    scc_id: row.get(1)?,
                    scc_size: row.get(2)?,
                    scc_cross_module: row.get::<_, i64>(3)? != 0,
                    topological_depth: row.get(4)?,
                    reverse_topological_depth: row.get(5)?,
                    transitive_callers: row.get(6)?,
                    transitive_callees: row.get(7)?,
                    betweenness_centrality: row.get(8)?,
                    pagerank: row.get(9)?,
                    hub_score: row.get(10)?,
                    authority_score: row.get(11)?,
                    clustering_coeff: row.get(12)?,
                    xmod_fan_in: row.get(13)?,
                    xmod_fan_out: row.get(14)?,
                    xmod_call_ratio: row.get(15)?,
                    dominant_callee_mod: row.get(16)?,
                    dominant_callee_frac: row.get(17)?,
                    utility_score: row.get(18)?,
                    stability_rank: row.get(19)?,
                    complexity_pct: row.get(20)?,
                    middleman_score: row.get(21)?,
                    community_id: row.get(22)?,
                    community_dominant_mod: row.get(23)?,
                    community_alignment: row.get::<_, i64>(24)? != 0,
                })
            })
            .map_err(|e| self.corrupt("node_features", e))?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| self.corrupt("node_features", e))
    }

    /// Single node lookup, for `node_detail`. `NodeNotFound` on a miss.
    pub fn node(&self, hash: &str) -> Result<Node> {
        self.nodes(&NodeFilters {
            kinds: None,
            include_external: true,
        })?
        .into_iter()
        .find(|n| n.hash == hash)
        .ok_or_else(|| CodeGraphError::NodeNotFound {
            repo_id: self.repo_id.clone(),
            hash: hash.to_string(),
        })
    }

    /// Writes the node_features table atomically: all rows are deleted and
    /// replaced inside one transaction, matching the enrichment
    /// idempotence invariant.
    pub fn replace_node_features(&mut self, rows: &[NodeFeatures]) -> Result<()> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| self.corrupt("replace_node_features", e))?;
        tx.execute("DELETE FROM node_features", [])
            .map_err(|e| CodeGraphError::Sqlite(e))?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO node_features (
                        hash, scc_id, scc_size, scc_cross_module, topological_depth,
                        reverse_topological_depth, transitive_callers, transitive_callees,
                        betweenness_centrality, pagerank, hub_score, authority_score,
                        clustering_coeff, xmod_fan_in, xmod_fan_out, xmod_call_ratio,
                        dominant_callee_mod, dominant_callee_frac, utility_score, stability_rank,
                        complexity_pct, middleman_score, community_id, community_dominant_mod,
                        community_alignment
                    ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?20,?21,?22,?23,?24,?25)",
                )
                .map_err(|e| CodeGraphError::Sqlite(e))?;
            for f in rows {
                stmt.execute(rusqlite::params![
                    f.hash,
                    f.scc_id,
                    f.scc_size,
                    f.scc_cross_module as i64,
                    f.topological_depth,
                    f.reverse_topological_depth,
                    f.transitive_callers,
                    f.transitive_callees,
                    f.betweenness_centrality,
                    f.pagerank,
                    f.hub_score,
                    f.authority_score,
                    f.clustering_coeff,
                    f.xmod_fan_in,
                    f.xmod_fan_out,
                    f.xmod_call_ratio,
                    f.dominant_callee_mod,
                    f.dominant_callee_frac,
                    f.utility_score,
                    f.stability_rank,
                    f.complexity_pct,
                    f.middleman_score,
                    f.community_id,
                    f.community_dominant_mod,
                    f.community_alignment as i64,
                ])
                .map_err(|e| CodeGraphError::Sqlite(e))?;
            }
        }
        tx.commit().map_err(|e| CodeGraphError::Sqlite(e))?;
        self.has_features = true;
        Ok(())
    }

    /// Copies `nodes`/`edges`/`module_edges` verbatim from a raw snapshot,
    /// the first step of an enrichment run against a fresh derived file.
    pub fn clone_base_tables_from(&mut self, raw: &SnapshotStore) -> Result<()> {
        let nodes = raw.nodes(&NodeFilters {
            kinds: None,
            include_external: true,
        })?;
        let edges = raw.edges(&EdgeFilters {
            include_external: true,
        })?;
        let module_edges = raw.module_edges(&ModuleEdgeFilters {
            include_external: true,
        })?;

        let tx = self
            .conn
            .transaction()
            .map_err(|e| self.corrupt("clone_base_tables_from", e))?;
        tx.execute("DELETE FROM nodes", [])
            .map_err(CodeGraphError::Sqlite)?;
        tx.execute("DELETE FROM edges", [])
            .map_err(CodeGraphError::Sqlite)?;
        tx.execute("DELETE FROM module_edges", [])
            .map_err(CodeGraphError::Sqlite)?;
        {
            let mut node_stmt = tx
                .prepare(
                    "INSERT INTO nodes (hash, name, module, file_path, line_start, line_end, \
                     kind, risk, complexity, caller_count, callee_count) \
                     VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)",
                )
                .map_err(CodeGraphError::Sqlite)?;
            for n in &nodes {
                node_stmt
                    .execute(rusqlite::params![
                        n.hash,
                        n.name,
                        n.module,
                        n.file_path,
                        n.line_start,
                        n.line_end,
                        n.kind.to_string(),
                        n.risk.to_string(),
                        n.complexity,
                        n.caller_count,
                        n.callee_count,
                    ])
                    .map_err(CodeGraphError::Sqlite)?;
            }
            let mut edge_stmt = tx
                .prepare(
                    "INSERT INTO edges (caller_hash, callee_hash, call_count) VALUES (?1,?2,?3)",
                )
                .map_err(CodeGraphError::Sqlite)?;
            for e in &edges {
                edge_stmt
                    .execute(rusqlite::params![e.caller_hash, e.callee_hash, e.call_count])
                    .map_err(CodeGraphError::Sqlite)?;
            }
            let mut mod_stmt = tx
                .prepare(
                    "INSERT INTO module_edges (caller_module, callee_module, edge_count) \
                     VALUES (?1,?2,?3)",
                )
                .map_err(CodeGraphError::Sqlite)?;
            for m in &module_edges {
                mod_stmt
                    .execute(rusqlite::params![m.caller_module, m.callee_module, m.edge_count])
                    .map_err(CodeGraphError::Sqlite)?;
            }
        }
        tx.commit().map_err(CodeGraphError::Sqlite)?;
        Ok(())
    }

    /// Renames the `.tmp` derived file into place, the "rename on
    /// completion" atomic-publish step so readers see either the pre- or
    /// post-enrichment state, never a partial one.
    pub fn publish_enriched(self, data_dir: &Path, repo_id: &str) -> Result<()> {
        drop(self.conn);
        let tmp_path = data_dir.join(format!("{repo_id}.enriched.db.tmp"));
        let final_path = data_dir.join(format!("{repo_id}.enriched.db"));
        std::fs::rename(&tmp_path, &final_path)?;
        Ok(())
    }

    pub fn close(self) {
        drop(self.conn);
    }
}

/// Checks whether `repo_id` has any snapshot at all under `data_dir`.
pub fn snapshot_exists(data_dir: &Path, repo_id: &str) -> bool {
    data_dir.join(format!("{repo_id}.enriched.db")).exists()
        || data_dir.join(format!("{repo_id}.db")).exists()
}

/// Helper mirroring the original's `get_db` preference order, exposed for
/// callers (e.g. the CLI) that want the path without opening a connection.
pub fn resolve_snapshot_path(data_dir: &Path, repo_id: &str) -> Option<(PathBuf, bool)> {
    let enriched = data_dir.join(format!("{repo_id}.enriched.db"));
    if enriched.exists() {
        return Some((enriched, true));
    }
    let raw = data_dir.join(format!("{repo_id}.db"));
    if raw.exists() {
        return Some((raw, false));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(store: &SnapshotStore) {
        store
            .conn
            .execute(
                "INSERT INTO nodes (hash, name, module, file_path, line_start, line_end, kind, \
                 risk, complexity, caller_count, callee_count) VALUES \
                 ('a', 'foo', 'pkg.a', 'a.py', 1, 5, 'function', 'low', 2, 1, 0), \
                 ('ext:b', 'bar', '__external__', '<ext>', 0, 0, 'function', 'low', 0, 1, 0)",
                [],
            )
            .unwrap();
        store
            .conn
            .execute(
                "INSERT INTO edges (caller_hash, callee_hash, call_count) VALUES ('a', 'ext:b', 3)",
                [],
            )
            .unwrap();
    }

    #[test]
    fn open_prefers_enriched_over_raw() {
        let dir = tempfile::tempdir().unwrap();
        Connection::open(dir.path().join("repo.db")).unwrap();
        Connection::open(dir.path().join("repo.enriched.db")).unwrap();
        let store = SnapshotStore::open(dir.path(), "repo").unwrap();
        assert!(store.has_features());
    }

    #[test]
    fn open_missing_repo_raises_snapshot_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = SnapshotStore::open(dir.path(), "missing").unwrap_err();
        assert!(matches!(err, CodeGraphError::SnapshotNotFound { .. }));
    }

    #[test]
    fn nodes_excludes_external_unless_requested() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open_for_enrichment(dir.path(), "repo").unwrap();
        seed(&store);

        let internal = store.nodes(&NodeFilters { kinds: None, include_external: false }).unwrap();
        assert_eq!(internal.len(), 1);
        assert_eq!(internal[0].hash, "a");

        let all = store.nodes(&NodeFilters { kinds: None, include_external: true }).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn node_features_without_enrichment_raises_schema_missing() {
        let dir = tempfile::tempdir().unwrap();
        Connection::open(dir.path().join("repo.db")).unwrap();
        let store = SnapshotStore::open(dir.path(), "repo").unwrap();
        let err = store.node_features(None).unwrap_err();
        assert!(matches!(err, CodeGraphError::SchemaMissing { .. }));
    }

    #[test]
    fn node_lookup_missing_hash_raises_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open_for_enrichment(dir.path(), "repo").unwrap();
        seed(&store);
        let err = store.node("missing").unwrap_err();
        assert!(matches!(err, CodeGraphError::NodeNotFound { .. }));
        assert_eq!(store.node("a").unwrap().name, "foo");
    }

    #[test]
    fn clone_base_tables_and_publish_enriched_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let raw = SnapshotStore::open(dir.path(), "repo").unwrap_err();
        assert!(matches!(raw, CodeGraphError::SnapshotNotFound { .. }));

        Connection::open(dir.path().join("repo.db")).unwrap();
        let raw = SnapshotStore::open(dir.path(), "repo").unwrap();
        seed(&raw);

        let mut derived = SnapshotStore::open_for_enrichment(dir.path(), "repo").unwrap();
        derived.clone_base_tables_from(&raw).unwrap();
        derived.publish_enriched(dir.path(), "repo").unwrap();

        let reopened = SnapshotStore::open(dir.path(), "repo").unwrap();
        assert!(reopened.has_features());
        assert_eq!(reopened.nodes(&NodeFilters::default()).unwrap().len(), 1);
    }
}
