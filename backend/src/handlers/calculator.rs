//! Stateless calculator endpoints
//!
//! Nothing here touches storage; the browser can call these before sign-in.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use shared::alerts::{evaluate_alerts, Alert};
use shared::export;
use shared::models::{
    default_grades, AverageSummary, CalculationContext, CalculationResult, CostSettings,
    GradeEntry, PriceEntry, PriceSpread, SafeBuyAdvice, SafeBuyComparison,
};

use crate::error::AppResult;
use crate::services::average::summarize;
use crate::AppState;

#[derive(Serialize)]
pub struct DefaultsResponse {
    pub settings: CostSettings,
    pub grades: Vec<GradeEntry>,
}

/// Default cost settings and the sample grade set
pub async fn get_defaults() -> Json<DefaultsResponse> {
    Json(DefaultsResponse {
        settings: CostSettings::default(),
        grades: default_grades(),
    })
}

/// Input for a calculation
#[derive(Debug, Deserialize)]
pub struct ComputeInput {
    #[serde(default)]
    pub grades: Vec<GradeEntry>,
    #[serde(default)]
    pub settings: CostSettings,
    #[serde(default)]
    pub context: CalculationContext,
}

impl ComputeInput {
    pub fn compute(&self) -> CalculationResult {
        shared::compute_result(&self.grades, &self.settings, &self.context)
    }
}

pub async fn compute(Json(input): Json<ComputeInput>) -> Json<CalculationResult> {
    let result = input.compute();
    tracing::debug!(
        calculation_id = %result.id,
        total_boxes = result.total_boxes,
        profit = %result.profit,
        "Computed calculation"
    );
    Json(result)
}

#[derive(Serialize)]
pub struct SafeBuyResponse {
    pub advice: SafeBuyAdvice,
    pub comparison: SafeBuyComparison,
}

/// Safe buy advice using the configured factor
pub async fn safe_buy(
    State(state): State<AppState>,
    Json(result): Json<CalculationResult>,
) -> Json<SafeBuyResponse> {
    let advice = shared::compute_safe_buy_with_factor(&result, state.config.advisor.safe_buy_factor);
    let comparison = SafeBuyComparison::new(&result, &advice);
    Json(SafeBuyResponse { advice, comparison })
}

#[derive(Debug, Deserialize)]
pub struct AlertsInput {
    pub result: Option<CalculationResult>,
    #[serde(default)]
    pub grades: Vec<GradeEntry>,
}

pub async fn alerts(Json(input): Json<AlertsInput>) -> Json<Vec<Alert>> {
    Json(evaluate_alerts(input.result.as_ref(), &input.grades))
}

/// CSV download of a result's grade table
pub async fn export_result(Json(result): Json<CalculationResult>) -> AppResult<Response> {
    csv_attachment(&result)
}

pub(crate) fn csv_attachment(result: &CalculationResult) -> AppResult<Response> {
    let csv = export::grades_csv(result)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export::export_filename(chrono::Utc::now())
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct AverageInput {
    pub entries: Vec<PriceEntry>,
}

#[derive(Serialize)]
pub struct AverageResponse {
    pub summary: AverageSummary,
    pub spread: Option<PriceSpread>,
}

/// Weighted average price with spread figures
pub async fn compute_average(Json(input): Json<AverageInput>) -> AppResult<Json<AverageResponse>> {
    let summary = summarize(&input.entries)?;
    let spread = PriceSpread::from_entries(&input.entries, summary.average_price);
    Ok(Json(AverageResponse { summary, spread }))
}
