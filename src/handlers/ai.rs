//! AI-assisted handlers: product-description generation (admin) and
//! the public customer chatbot.
//!
//! External-model failures never leak detail; both endpoints answer
//! with a 503 and a static apology.

use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use garde::Validate;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;
use utoipa::ToSchema;

use crate::ai::assist;
use crate::errors::ApiError;
use crate::AppState;

/// Static apology returned when the model is unreachable.
const CHAT_APOLOGY: &str = "Sorry, I'm having trouble right now.";

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GenerateDescriptionRequest {
    #[serde(default)]
    #[garde(length(min = 1))]
    pub name: String,
    #[serde(default)]
    #[garde(length(min = 1))]
    pub category: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChatRequest {
    #[serde(default)]
    #[garde(length(min = 1))]
    pub message: String,
}

/// `POST /api/admin/ai/generate-description` -- Generate marketing copy
/// for a product from its name and category.
#[utoipa::path(
    post,
    path = "/api/admin/ai/generate-description",
    tag = "AI",
    operation_id = "GenerateProductDescription",
    responses(
        (status = 200, description = "Generated description"),
        (status = 400, description = "Missing name or category"),
        (status = 401, description = "Missing or invalid token"),
        (status = 503, description = "Generative endpoint failure")
    )
)]
pub async fn generate_description(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GenerateDescriptionRequest>,
) -> Result<Response, ApiError> {
    super::validate_payload(&payload)?;

    let description = assist::generate_description(
        state.model.as_ref(),
        payload.name.trim(),
        payload.category.trim(),
    )
    .await
    .map_err(|e| {
        warn!("description generation failed: {e:#}");
        ApiError::ServiceUnavailable {
            message: "Failed to generate description".to_string(),
        }
    })?;

    Ok(Json(json!({ "success": true, "description": description })).into_response())
}

/// `POST /api/chat` -- Answer a free-text customer message.
#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "AI",
    operation_id = "CustomerChat",
    responses(
        (status = 200, description = "Chatbot reply"),
        (status = 400, description = "Empty message"),
        (status = 503, description = "Generative endpoint failure")
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    super::validate_payload(&payload)?;

    let reply = assist::answer_customer(
        state.store.as_ref(),
        state.model.as_ref(),
        payload.message.trim(),
    )
    .await
    .map_err(|e| {
        warn!("chat reply failed: {e:#}");
        ApiError::ServiceUnavailable {
            message: CHAT_APOLOGY.to_string(),
        }
    })?;

    Ok(Json(json!({ "reply": reply })).into_response())
}
