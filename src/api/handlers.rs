use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::error::GenerationError;
use crate::flashcard::FlashcardSet;
use crate::AppState;

use super::models::{ErrorResponse, GenerateRequest, HealthResponse};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

impl IntoResponse for GenerationError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::MalformedOutput { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        api_error(status, self.to_string()).into_response()
    }
}

pub async fn generate_flashcards(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<FlashcardSet>, Response> {
    let Json(payload) = payload.map_err(|rejection| {
        debug!(reason = %rejection.body_text(), "rejected generation request body");
        api_error(
            StatusCode::BAD_REQUEST,
            "Request body must be JSON of the form {\"notes\": \"...\"}",
        )
        .into_response()
    })?;

    state
        .generator
        .generate(&payload.notes)
        .await
        .map(Json)
        .map_err(IntoResponse::into_response)
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "flashcard service is running",
    })
}

pub async fn not_found() -> Response {
    api_error(StatusCode::NOT_FOUND, "Not found").into_response()
}
