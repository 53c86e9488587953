use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use seoboard_server::{state::AppState, upstream::HttpSnapshotSource};

#[tokio::main]
async fn main() -> Result<()> {
    // Structured JSON logging. Level controlled via RUST_LOG env var.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("seoboard=info".parse()?)
                .add_directive("seoboard_server=info".parse()?)
                .add_directive("seoboard_core=info".parse()?),
        )
        .json()
        .init();

    let cfg = seoboard_core::config::Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    let source = Arc::new(HttpSnapshotSource::new(
        &cfg.upstream_url,
        cfg.fetch_timeout(),
    )?);

    let addr = format!("0.0.0.0:{}", cfg.port);
    let state = Arc::new(AppState::new(cfg.clone(), source));
    let app = seoboard_server::app::build_app(state);

    info!(
        port = cfg.port,
        upstream = %cfg.upstream_url,
        depth = cfg.default_depth,
        "seoboard listening on {}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    Ok(())
}
