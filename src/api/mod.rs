mod handlers;
mod models;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub use handlers::{generate_flashcards, health, not_found};
pub use models::{ErrorResponse, GenerateRequest, HealthResponse};

pub const GENERATE_PATH: &str = "/api/generate-flashcards";
pub const HEALTH_PATH: &str = "/health";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(GENERATE_PATH, post(generate_flashcards))
        .route(HEALTH_PATH, get(health))
        .fallback(not_found)
        .with_state(state)
}
