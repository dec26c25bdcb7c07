use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, fmt};

use lessonforge::config::AppConfig;
use lessonforge::server::{AppState, build_router};
use lessonforge::services::llm::LlmClient;
use lessonforge::services::logger::ActivityLogger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    // Read configuration once; a missing credential fails here, before any
    // bind or network attempt.
    let config = AppConfig::from_env()?;

    let llm_client = Arc::new(LlmClient::new(config.llm.clone())?);
    let logger = Arc::new(ActivityLogger::new(&config.log_path));

    let app = build_router(AppState { llm_client, logger });

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
