use anyhow::{Context, Result};
use flashcard_service::{build_app, config::AppConfig, logging::init_logging, run_server, AppState};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_logging();

    let config = AppConfig::from_env();
    if !config.has_api_key() {
        error!("API key is missing: set OPENAI_API_KEY; generation requests will fail until it is provided");
    }

    info!(
        port = config.port,
        model = %config.model,
        max_retries = config.max_retries,
        "starting flashcard service"
    );

    let app = build_app(AppState::from_config(&config));
    run_server(app, config.port)
        .await
        .with_context(|| format!("flashcard service failed on port {}", config.port))
}
