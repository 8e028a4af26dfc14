//! Calculation history HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, SubsecRound, Utc};
use serde::Deserialize;
use uuid::Uuid;

use shared::export;
use shared::history::{HistoryCsvRow, HistoryFilter, HistoryInsights};
use shared::models::CalculationResult;

use super::calculator::{csv_attachment, ComputeInput};
use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::AppState;

/// Query parameters for listing history
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub search: Option<String>,
    pub grade: Option<String>,
    pub farmer_name: Option<String>,
    pub buyer_name: Option<String>,
    #[serde(default)]
    pub profit_only: bool,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// `csv` for a download instead of JSON
    pub format: Option<String>,
}

impl HistoryQuery {
    fn filter(&self) -> HistoryFilter {
        HistoryFilter {
            search: self.search.clone(),
            grade: self.grade.clone(),
            farmer_name: self.farmer_name.clone(),
            buyer_name: self.buyer_name.clone(),
            profit_only: self.profit_only,
            start: self.start,
            end: self.end,
        }
    }
}

/// List the current user's calculations, newest first
pub async fn list_calculations(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Response> {
    let history = state.history.list(user.user_id).await?;
    let calculations = query.filter().apply(&history);

    if query.format.as_deref() == Some("csv") {
        let rows: Vec<HistoryCsvRow> = calculations.iter().map(HistoryCsvRow::from).collect();
        let csv = export::to_csv(&rows)?;
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"anar-history.csv\""),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(serde_json::json!({ "calculations": calculations })).into_response())
    }
}

/// Save a computed result as-is, apart from a timestamp cut to microseconds
pub async fn save_calculation(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(mut result): Json<CalculationResult>,
) -> AppResult<impl IntoResponse> {
    result.timestamp = result.timestamp.trunc_subsecs(6);
    let id = state.history.save(user.user_id, &result).await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// Compute from raw inputs and save in one step
pub async fn compute_and_save(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<ComputeInput>,
) -> AppResult<impl IntoResponse> {
    let result = input.compute();
    state.history.save(user.user_id, &result).await?;
    tracing::info!(user_id = %user.user_id, calculation_id = %result.id, "Saved new calculation");
    Ok((StatusCode::CREATED, Json(result)))
}

pub async fn get_calculation(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CalculationResult>> {
    state
        .history
        .get(user.user_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Calculation".to_string()))
}

pub async fn delete_calculation(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let deleted = state.history.delete(user.user_id, id).await?;
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}

/// Grade table of one saved calculation as CSV
pub async fn export_calculation(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let result = state
        .history
        .get(user.user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Calculation".to_string()))?;
    csv_attachment(&result)
}

/// Best/worst grades, grade notes and the profit series
pub async fn get_insights(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<HistoryInsights>> {
    let history = state.history.list(user.user_id).await?;
    let calculations = query.filter().apply(&history);
    Ok(Json(HistoryInsights::from_history(&calculations)))
}
