use clap::{Parser, Subcommand};
use codegraph_analytics::{enrich, EnrichmentGraph};
use codegraph_core::{CodeGraphError, NodeFeatures, Result as CoreResult, ServerConfig};
use codegraph_graph::{EdgeFilters, NodeFilters, SnapshotStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Offline enrichment over repo snapshots: computes the derived
/// `node_features` table and publishes it alongside the raw snapshot.
#[derive(Parser)]
#[command(name = "codegraph-analytics-cli", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run enrichment for one or more repos.
    Enrich {
        /// repo_id to enrich. Omit when using --all.
        repo_id: Option<String>,
        /// Enrich every repo with a raw snapshot under data_dir.
        #[arg(long)]
        all: bool,
    },
}

fn discover_repo_ids(data_dir: &std::path::Path) -> CoreResult<Vec<String>> {
    let mut ids = Vec::new();
    let entries = std::fs::read_dir(data_dir).map_err(CodeGraphError::Io)?;
    for entry in entries {
        let entry = entry.map_err(CodeGraphError::Io)?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if let Some(repo_id) = name.strip_suffix(".db") {
            if !repo_id.is_empty() {
                ids.push(repo_id.to_string());
            }
        }
    }
    ids.sort();
    ids.dedup();
    Ok(ids)
}

fn enrich_one(data_dir: &std::path::Path, repo_id: &str) -> CoreResult<()> {
    tracing::info!(repo_id, "enriching snapshot");
    let raw = SnapshotStore::open(data_dir, repo_id)?;
    let nodes = raw.nodes(&NodeFilters { kinds: None, include_external: true })?;
    let edges = raw.edges(&EdgeFilters { include_external: true })?;

    let mut derived = SnapshotStore::open_for_enrichment(data_dir, repo_id)?;
    derived.clone_base_tables_from(&raw)?;

    let graph = EnrichmentGraph::build(nodes, &edges);
    let features: Vec<NodeFeatures> = enrich(&graph);
    derived.replace_node_features(&features)?;
    derived.publish_enriched(data_dir, repo_id)?;

    tracing::info!(repo_id, symbols = features.len(), "enrichment complete");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "codegraph_analytics_cli=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load()?;

    match cli.command {
        Command::Enrich { repo_id, all } => {
            if all {
                for repo_id in discover_repo_ids(&config.data_dir)? {
                    enrich_one(&config.data_dir, &repo_id)?;
                }
            } else {
                let repo_id = repo_id.ok_or_else(|| CodeGraphError::InvalidArgument {
                    operation: "enrich".to_string(),
                    detail: "a repo_id is required unless --all is passed".to_string(),
                })?;
                enrich_one(&config.data_dir, &repo_id)?;
            }
        }
    }

    Ok(())
}
