//! Real trade HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use shared::models::{NewTradeInput, TradeStats};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::TradeService;
use crate::AppState;

pub async fn list_trades(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<impl IntoResponse> {
    let service = TradeService::new(state.require_db()?);
    let trades = service.list_trades(user.user_id).await?;
    Ok(Json(serde_json::json!({ "trades": trades })))
}

pub async fn create_trade(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<NewTradeInput>,
) -> AppResult<impl IntoResponse> {
    let service = TradeService::new(state.require_db()?);
    let trade = service.create_trade(user.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(trade)))
}

pub async fn delete_trade(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(trade_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = TradeService::new(state.require_db()?);
    let deleted = service.delete_trade(user.user_id, trade_id).await?;
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}

#[derive(Serialize)]
pub struct TradeStatsResponse {
    #[serde(flatten)]
    pub stats: TradeStats,
    pub share_message: String,
}

pub async fn get_trade_stats(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<TradeStatsResponse>> {
    let service = TradeService::new(state.require_db()?);
    let stats = service.get_stats(user.user_id).await?;
    let share_message = stats.share_message();
    Ok(Json(TradeStatsResponse {
        stats,
        share_message,
    }))
}
