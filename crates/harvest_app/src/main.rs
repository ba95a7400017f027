//! Process entry point: configuration, logging, and the HTTP listener.

mod config;
mod logging;
mod routes;

use anyhow::Context;
use harvest_logging::harvest_info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A .env file is optional; deployments usually set the variables directly.
    let _ = dotenvy::dotenv();
    logging::initialize(logging::LogDestination::Both);

    let config = config::AppConfig::from_env()?;
    harvest_info!("Starting harvest listener with {:?}", config);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = routes::router(config);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("could not bind {addr}"))?;
    harvest_info!("Listening on {}", addr);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
