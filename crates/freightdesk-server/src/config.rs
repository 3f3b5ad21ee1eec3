use anyhow::Context;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub log_filter: String,
    /// Largest `end - start + 1` a client may request.
    pub max_range_span: Option<u64>,
    /// JSON file `{ "<entity>": [rows...] }` loaded at start.
    pub seed_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            log_filter: "info".into(),
            max_range_span: None,
            seed_path: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut cfg = Self::default();
        if let Some(addr) = lookup("BIND_ADDR") {
            cfg.bind_addr = addr
                .parse()
                .with_context(|| format!("BIND_ADDR is not a socket address: {addr}"))?;
        }
        if let Some(filter) = lookup("RUST_LOG").filter(|f| !f.is_empty()) {
            cfg.log_filter = filter;
        }
        if let Some(span) = lookup("MAX_RANGE_SPAN") {
            let span: u64 = span
                .parse()
                .with_context(|| format!("MAX_RANGE_SPAN is not a positive integer: {span}"))?;
            anyhow::ensure!(span > 0, "MAX_RANGE_SPAN must be positive");
            cfg.max_range_span = Some(span);
        }
        cfg.seed_path = lookup("SEED_PATH").filter(|p| !p.is_empty()).map(PathBuf::from);
        Ok(cfg)
    }
}
