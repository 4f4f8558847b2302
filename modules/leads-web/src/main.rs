use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use leads_common::Config;
use leads_web::{router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("leads_web=info".parse()?)
                .add_directive("leads_ingest=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    config.log_keys();

    let leads_root = std::fs::canonicalize(&config.leads_path)
        .unwrap_or_else(|_| config.leads_path.clone());
    let addr = format!("{}:{}", config.host, config.port);
    let port = config.port;

    let app = router(Arc::new(AppState::new(config)));

    info!("Contractor leads dashboard starting on {addr}");
    info!("Reading leads from {}", leads_root.display());
    info!("Admin URL: http://localhost:{port}/admin");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
