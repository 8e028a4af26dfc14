//! PostgreSQL-backed calculation history

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use shared::models::{CalculationResult, GradeEntry};

use super::HistoryStore;
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct PostgresHistoryStore {
    db: PgPool,
}

/// One row of the `calculations` table
#[derive(Debug, sqlx::FromRow)]
struct CalculationRow {
    id: Uuid,
    timestamp: DateTime<Utc>,
    farmer_name: Option<String>,
    buyer_name: Option<String>,
    farmer_contact: Option<String>,
    buyer_contact: Option<String>,
    trip_id: Option<String>,
    notes: Option<String>,
    grades: Json<Vec<GradeEntry>>,
    total_boxes: i64,
    gross_sale: Decimal,
    commission_amt: Decimal,
    net_sale: Decimal,
    total_cost: Decimal,
    profit: Decimal,
    total_transport_cost: Decimal,
    total_packing_cost: Decimal,
    total_labour_cost: Decimal,
    total_utility_cost: Decimal,
    commission: Decimal,
    transport: Decimal,
    packing: Decimal,
    labour: Decimal,
    miscellaneous: Decimal,
    farmer_rate_kg: Decimal,
    kg_per_box: Decimal,
}

impl TryFrom<CalculationRow> for CalculationResult {
    type Error = AppError;

    fn try_from(row: CalculationRow) -> Result<Self, Self::Error> {
        let total_boxes = u32::try_from(row.total_boxes).map_err(|_| {
            AppError::Internal(format!("Stored box count out of range: {}", row.total_boxes))
        })?;

        Ok(Self {
            id: row.id,
            timestamp: row.timestamp,
            farmer_name: row.farmer_name,
            buyer_name: row.buyer_name,
            farmer_contact: row.farmer_contact,
            buyer_contact: row.buyer_contact,
            trip_id: row.trip_id,
            notes: row.notes,
            grades: row.grades.0,
            total_boxes,
            gross_sale: row.gross_sale,
            commission_amt: row.commission_amt,
            net_sale: row.net_sale,
            total_cost: row.total_cost,
            profit: row.profit,
            total_transport_cost: row.total_transport_cost,
            total_packing_cost: row.total_packing_cost,
            total_labour_cost: row.total_labour_cost,
            total_utility_cost: row.total_utility_cost,
            commission: row.commission,
            transport: row.transport,
            packing: row.packing,
            labour: row.labour,
            miscellaneous: row.miscellaneous,
            farmer_rate_kg: row.farmer_rate_kg,
            kg_per_box: row.kg_per_box,
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    id, timestamp, farmer_name, buyer_name, farmer_contact, buyer_contact,
    trip_id, notes, grades, total_boxes, gross_sale, commission_amt, net_sale,
    total_cost, profit, total_transport_cost, total_packing_cost,
    total_labour_cost, total_utility_cost, commission, transport, packing,
    labour, miscellaneous, farmer_rate_kg, kg_per_box
"#;

impl PostgresHistoryStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl HistoryStore for PostgresHistoryStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn save(&self, user_id: Uuid, result: &CalculationResult) -> AppResult<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO calculations (
                id, user_id, timestamp, farmer_name, buyer_name, farmer_contact,
                buyer_contact, trip_id, notes, grades, total_boxes, gross_sale,
                commission_amt, net_sale, total_cost, profit, total_transport_cost,
                total_packing_cost, total_labour_cost, total_utility_cost,
                commission, transport, packing, labour, miscellaneous,
                farmer_rate_kg, kg_per_box
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                    $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27)
            ON CONFLICT (id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(result.id)
        .bind(user_id)
        .bind(result.timestamp)
        .bind(&result.farmer_name)
        .bind(&result.buyer_name)
        .bind(&result.farmer_contact)
        .bind(&result.buyer_contact)
        .bind(&result.trip_id)
        .bind(&result.notes)
        .bind(Json(&result.grades))
        .bind(i64::from(result.total_boxes))
        .bind(result.gross_sale)
        .bind(result.commission_amt)
        .bind(result.net_sale)
        .bind(result.total_cost)
        .bind(result.profit)
        .bind(result.total_transport_cost)
        .bind(result.total_packing_cost)
        .bind(result.total_labour_cost)
        .bind(result.total_utility_cost)
        .bind(result.commission)
        .bind(result.transport)
        .bind(result.packing)
        .bind(result.labour)
        .bind(result.miscellaneous)
        .bind(result.farmer_rate_kg)
        .bind(result.kg_per_box)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::Conflict(format!("Calculation {} already exists", result.id)))?;

        tracing::debug!(%user_id, calculation_id = %id, "Saved calculation");
        Ok(id)
    }

    async fn list(&self, user_id: Uuid) -> AppResult<Vec<CalculationResult>> {
        let rows = sqlx::query_as::<_, CalculationRow>(&format!(
            "SELECT {} FROM calculations WHERE user_id = $1 ORDER BY timestamp DESC",
            SELECT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(CalculationResult::try_from).collect()
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<CalculationResult>> {
        let row = sqlx::query_as::<_, CalculationRow>(&format!(
            "SELECT {} FROM calculations WHERE user_id = $1 AND id = $2",
            SELECT_COLUMNS
        ))
        .bind(user_id)
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.map(CalculationResult::try_from).transpose()
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM calculations WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
