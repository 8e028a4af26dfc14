//! Saved average-price calculations

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use shared::models::{AverageSummary, PriceEntry, SavedAverage};

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct AverageService {
    db: PgPool,
}

/// Input for saving an average calculation
#[derive(Debug, Deserialize)]
pub struct SaveAverageInput {
    pub entries: Vec<PriceEntry>,
}

#[derive(Debug, sqlx::FromRow)]
struct AverageRow {
    id: Uuid,
    user_id: Uuid,
    entries: Json<Vec<PriceEntry>>,
    average_price: Decimal,
    total_weight: Decimal,
    total_value: Decimal,
    created_at: DateTime<Utc>,
}

impl From<AverageRow> for SavedAverage {
    fn from(row: AverageRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            entries: row.entries.0,
            average_price: row.average_price,
            total_weight: row.total_weight,
            total_value: row.total_value,
            created_at: row.created_at,
        }
    }
}

/// Compute the summary or explain why it cannot be computed
pub fn summarize(entries: &[PriceEntry]) -> AppResult<AverageSummary> {
    shared::validate_price_entries(entries).map_err(|msg| AppError::Validation {
        field: "entries".to_string(),
        message: msg.to_string(),
    })?;
    AverageSummary::from_entries(entries)
        .ok_or_else(|| AppError::ValidationError("No valid price entries".to_string()))
}

impl AverageService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list_averages(&self, user_id: Uuid) -> AppResult<Vec<SavedAverage>> {
        let rows = sqlx::query_as::<_, AverageRow>(
            r#"
            SELECT id, user_id, entries, average_price, total_weight, total_value, created_at
            FROM average_calculations
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(SavedAverage::from).collect())
    }

    /// Only valid entries are stored
    pub async fn save_average(&self, user_id: Uuid, input: SaveAverageInput) -> AppResult<SavedAverage> {
        let summary = summarize(&input.entries)?;
        let entries: Vec<PriceEntry> = input.entries.into_iter().filter(PriceEntry::is_valid).collect();

        let row = sqlx::query_as::<_, AverageRow>(
            r#"
            INSERT INTO average_calculations (id, user_id, entries, average_price, total_weight, total_value)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, entries, average_price, total_weight, total_value, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(Json(&entries))
        .bind(summary.average_price)
        .bind(summary.total_weight)
        .bind(summary.total_value)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    pub async fn delete_average(&self, user_id: Uuid, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM average_calculations WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
