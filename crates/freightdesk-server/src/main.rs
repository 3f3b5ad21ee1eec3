use anyhow::Context;
use freightdesk_core::catalog;
use freightdesk_server::{app, config::ServerConfig, AppState};
use freightdesk_storage::InMemoryExecutor;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = ServerConfig::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&cfg.log_filter).context("invalid RUST_LOG filter")?)
        .init();

    let registry = catalog::logistics()?;
    let store = InMemoryExecutor::new();
    if let Some(path) = &cfg.seed_path {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading seed file {}", path.display()))?;
        let seed = serde_json::from_str(&raw)
            .with_context(|| format!("parsing seed file {}", path.display()))?;
        let loaded = store.load_seed(seed)?;
        info!(rows = loaded, path = %path.display(), "seed loaded");
    }
    for entity in registry.iter() {
        info!(entity = %entity.name, fields = entity.schema.len(), "entity registered");
    }

    let state = AppState::new(registry, store).with_max_range_span(cfg.max_range_span);
    let listener = tokio::net::TcpListener::bind(cfg.bind_addr)
        .await
        .with_context(|| format!("binding {}", cfg.bind_addr))?;
    info!("http listening on {}", cfg.bind_addr);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
