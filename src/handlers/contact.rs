//! Contact-form handlers: public submission, admin-only listing.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

use crate::errors::ApiError;
use crate::store::store::now_rfc3339;
use crate::store::ContactMessageRecord;
use crate::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Basic email shape check: one `@`, a dot in the domain, no
/// whitespace anywhere, every segment non-empty.
pub fn is_valid_email(email: &str) -> bool {
    if email.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// `POST /api/contact` -- Public contact-form submission.
#[utoipa::path(
    post,
    path = "/api/contact",
    tag = "Contact",
    operation_id = "SubmitContactMessage",
    responses(
        (status = 201, description = "Message stored"),
        (status = 400, description = "Missing fields or invalid email")
    )
)]
pub async fn submit_message(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ContactRequest>,
) -> Result<Response, ApiError> {
    let (Some(name), Some(email), Some(message)) = (
        super::supplied(&payload.name),
        super::supplied(&payload.email),
        super::supplied(&payload.message),
    ) else {
        return Err(ApiError::bad_request("All fields are required"));
    };

    if !is_valid_email(email) {
        return Err(ApiError::bad_request("Invalid email format"));
    }

    let record = ContactMessageRecord {
        id: uuid::Uuid::new_v4().to_string(),
        name: name.to_string(),
        email: email.to_string(),
        message: message.to_string(),
        created_at: now_rfc3339(),
    };
    state.store.insert_contact_message(record).await?;

    info!("contact message received from {email}");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Thank you! We'll get back to you soon.",
        })),
    )
        .into_response())
}

/// `GET /api/contact/messages` -- Admin listing, newest first.
#[utoipa::path(
    get,
    path = "/api/contact/messages",
    tag = "Contact",
    operation_id = "ListContactMessages",
    responses(
        (status = 200, description = "Message list"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list_messages(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let messages = state.store.list_contact_messages().await?;
    Ok(Json(messages).into_response())
}
