//! Vacancy CRUD handlers.
//!
//! The public listing only returns active vacancies; creation and
//! mutation are admin-only.  Updates are partial: absent fields keep
//! prior values, and an explicit `isActive: false` is applied.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

use crate::errors::ApiError;
use crate::store::store::now_rfc3339;
use crate::store::VacancyRecord;
use crate::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateVacancyRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVacancyRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// `GET /api/vacancies` -- List active vacancies, newest first.
#[utoipa::path(
    get,
    path = "/api/vacancies",
    tag = "Vacancies",
    operation_id = "ListVacancies",
    responses((status = 200, description = "Active vacancies"))
)]
pub async fn list_vacancies(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let vacancies = state.store.list_vacancies(true).await?;
    Ok(Json(vacancies).into_response())
}

/// `POST /api/vacancies` -- Create a vacancy (active by default).
#[utoipa::path(
    post,
    path = "/api/vacancies",
    tag = "Vacancies",
    operation_id = "CreateVacancy",
    responses(
        (status = 201, description = "Vacancy created"),
        (status = 400, description = "Missing title or description")
    )
)]
pub async fn create_vacancy(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateVacancyRequest>,
) -> Result<Response, ApiError> {
    let (Some(title), Some(description)) = (
        super::supplied(&payload.title),
        super::supplied(&payload.description),
    ) else {
        return Err(ApiError::bad_request("Title and description are required"));
    };

    let now = now_rfc3339();
    let vacancy = VacancyRecord {
        id: uuid::Uuid::new_v4().to_string(),
        title: title.to_string(),
        description: description.to_string(),
        is_active: true,
        created_at: now.clone(),
        updated_at: now,
    };
    state.store.insert_vacancy(vacancy.clone()).await?;

    info!("vacancy {} created ({})", vacancy.id, vacancy.title);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "vacancy": vacancy })),
    )
        .into_response())
}

/// `PUT /api/vacancies/{id}` -- Partially update a vacancy.
#[utoipa::path(
    put,
    path = "/api/vacancies/{id}",
    tag = "Vacancies",
    operation_id = "UpdateVacancy",
    params(("id" = String, Path, description = "Vacancy id")),
    responses(
        (status = 200, description = "Vacancy updated"),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "No such vacancy")
    )
)]
pub async fn update_vacancy(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateVacancyRequest>,
) -> Result<Response, ApiError> {
    super::validate_id(&id)?;

    let mut vacancy = state
        .store
        .get_vacancy(&id)
        .await?
        .ok_or(ApiError::NotFound { resource: "Vacancy" })?;

    if let Some(title) = super::supplied(&payload.title) {
        vacancy.title = title.to_string();
    }
    if let Some(description) = super::supplied(&payload.description) {
        vacancy.description = description.to_string();
    }
    if let Some(is_active) = payload.is_active {
        vacancy.is_active = is_active;
    }
    vacancy.updated_at = now_rfc3339();

    state.store.update_vacancy(vacancy.clone()).await?;

    info!("vacancy {} updated", vacancy.id);
    Ok(Json(json!({ "success": true, "vacancy": vacancy })).into_response())
}

/// `DELETE /api/vacancies/{id}` -- Delete a vacancy.
#[utoipa::path(
    delete,
    path = "/api/vacancies/{id}",
    tag = "Vacancies",
    operation_id = "DeleteVacancy",
    params(("id" = String, Path, description = "Vacancy id")),
    responses(
        (status = 200, description = "Vacancy deleted"),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "No such vacancy")
    )
)]
pub async fn delete_vacancy(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    super::validate_id(&id)?;
    if !state.store.delete_vacancy(&id).await? {
        return Err(ApiError::NotFound { resource: "Vacancy" });
    }
    info!("vacancy {id} deleted");
    Ok(Json(json!({ "success": true, "message": "Vacancy deleted" })).into_response())
}
