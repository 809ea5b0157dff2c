pub mod api;
pub mod completion;
pub mod config;
pub mod error;
pub mod flashcard;
pub mod generator;
pub mod logging;
pub mod prompt;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::info;

use crate::completion::OpenAiClient;
use crate::config::AppConfig;
use crate::generator::FlashcardGenerator;

pub use crate::completion::{CompletionClient, CompletionConfig, CompletionError};
pub use crate::error::GenerationError;
pub use crate::flashcard::{Flashcard, FlashcardSet};
pub use crate::generator::GenerationPolicy;

#[derive(Debug, Clone)]
pub struct AppState {
    pub generator: Arc<FlashcardGenerator>,
}

impl AppState {
    pub fn new(generator: FlashcardGenerator) -> Self {
        Self {
            generator: Arc::new(generator),
        }
    }

    /// Wires the production OpenAI client and the configured retry policy.
    pub fn from_config(config: &AppConfig) -> Self {
        let client = OpenAiClient::new(config.completion_config());
        Self::new(FlashcardGenerator::new(
            Arc::new(client),
            config.generation_policy(),
        ))
    }
}

/// The full application: API routes plus tracing, CORS and security headers.
pub fn build_app(state: AppState) -> Router {
    api::router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .layer(SetResponseHeaderLayer::if_not_present(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                header::X_FRAME_OPTIONS,
                HeaderValue::from_static("SAMEORIGIN"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                header::REFERRER_POLICY,
                HeaderValue::from_static("no-referrer"),
            )),
    )
}

pub async fn run_server(app: Router, port: u16) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(addr = %listener.local_addr()?, "flashcard service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
