//! Admin authentication and profile handlers.
//!
//! Login verifies credentials and issues a 7-day bearer token.  Both
//! profile mutations re-verify the current password before writing;
//! neither uses optimistic concurrency, so two concurrent sessions can
//! race and silently overwrite each other.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

use crate::auth::{self, AdminIdentity, MIN_PASSWORD_LENGTH};
use crate::errors::ApiError;
use crate::store::store::now_rfc3339;
use crate::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUsernameRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub current_password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    #[serde(default)]
    pub current_password: Option<String>,
    #[serde(default)]
    pub new_password: Option<String>,
}

/// `POST /api/admin/login` -- Verify credentials and issue a token.
#[utoipa::path(
    post,
    path = "/api/admin/login",
    tag = "Admin",
    operation_id = "AdminLogin",
    responses(
        (status = 200, description = "Token issued"),
        (status = 400, description = "Missing username or password"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let (Some(username), Some(password)) = (
        super::supplied(&payload.username),
        payload.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::bad_request("Username and password are required"));
    };

    let admin = state
        .store
        .get_admin_by_username(username)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    if !auth::verify_password(password, &admin.password_hash)? {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = auth::issue_token(
        &admin.id,
        &admin.username,
        &state.config.auth.jwt_secret,
        state.config.auth.token_ttl_days,
    )?;

    info!("admin {} logged in", admin.username);
    Ok(Json(json!({
        "success": true,
        "token": token,
        "admin": { "id": admin.id, "username": admin.username },
    }))
    .into_response())
}

/// `PUT /api/admin/profile` -- Change the admin's username.
#[utoipa::path(
    put,
    path = "/api/admin/profile",
    tag = "Admin",
    operation_id = "UpdateAdminUsername",
    responses(
        (status = 200, description = "Username updated"),
        (status = 400, description = "Missing fields or username taken"),
        (status = 401, description = "Wrong current password"),
        (status = 404, description = "Admin record missing")
    )
)]
pub async fn update_username(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AdminIdentity>,
    Json(payload): Json<UpdateUsernameRequest>,
) -> Result<Response, ApiError> {
    let (Some(username), Some(current_password)) = (
        super::supplied(&payload.username),
        payload.current_password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::bad_request(
            "Username and current password are required",
        ));
    };

    let mut admin = state
        .store
        .get_admin(&identity.id)
        .await?
        .ok_or(ApiError::NotFound { resource: "Admin" })?;

    if !auth::verify_password(current_password, &admin.password_hash)? {
        return Err(ApiError::unauthorized("Current password is incorrect"));
    }

    // Uniqueness check against other admins.
    if let Some(existing) = state.store.get_admin_by_username(username).await? {
        if existing.id != admin.id {
            return Err(ApiError::bad_request("Username already taken"));
        }
    }

    admin.username = username.to_string();
    admin.updated_at = now_rfc3339();
    state.store.update_admin(admin.clone()).await?;

    info!("admin {} renamed to {}", identity.username, admin.username);
    Ok(Json(json!({
        "success": true,
        "message": "Username updated successfully",
        "username": admin.username,
    }))
    .into_response())
}

/// `PUT /api/admin/profile/password` -- Change the admin's password.
#[utoipa::path(
    put,
    path = "/api/admin/profile/password",
    tag = "Admin",
    operation_id = "UpdateAdminPassword",
    responses(
        (status = 200, description = "Password updated"),
        (status = 400, description = "Missing fields or new password too short"),
        (status = 401, description = "Wrong current password"),
        (status = 404, description = "Admin record missing")
    )
)]
pub async fn update_password(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AdminIdentity>,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<Response, ApiError> {
    let (Some(current_password), Some(new_password)) = (
        payload.current_password.as_deref().filter(|p| !p.is_empty()),
        payload.new_password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::bad_request(
            "Current and new password are required",
        ));
    };

    if new_password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::bad_request(format!(
            "New password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let mut admin = state
        .store
        .get_admin(&identity.id)
        .await?
        .ok_or(ApiError::NotFound { resource: "Admin" })?;

    if !auth::verify_password(current_password, &admin.password_hash)? {
        return Err(ApiError::unauthorized("Current password is incorrect"));
    }

    admin.password_hash = auth::hash_password(new_password)?;
    admin.updated_at = now_rfc3339();
    state.store.update_admin(admin).await?;

    info!("admin {} changed their password", identity.username);
    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Password updated successfully",
        })),
    )
        .into_response())
}
