use std::net::SocketAddr;
use std::str::FromStr;

use codegraph_api::{create_router, AppState};
use codegraph_core::ServerConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::load()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("codegraph_api=info,tower_http=info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))
        .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], config.port)));

    let state = AppState::new(config);
    let router = create_router(state);

    tracing::info!(%addr, "starting codegraph-api");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
