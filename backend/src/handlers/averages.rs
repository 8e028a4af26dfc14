//! Saved average-price HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::average::{AverageService, SaveAverageInput};
use crate::AppState;

pub async fn list_averages(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<impl IntoResponse> {
    let service = AverageService::new(state.require_db()?);
    let averages = service.list_averages(user.user_id).await?;
    Ok(Json(serde_json::json!({ "averages": averages })))
}

pub async fn save_average(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<SaveAverageInput>,
) -> AppResult<impl IntoResponse> {
    let service = AverageService::new(state.require_db()?);
    let saved = service.save_average(user.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn delete_average(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = AverageService::new(state.require_db()?);
    let deleted = service.delete_average(user.user_id, id).await?;
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}
