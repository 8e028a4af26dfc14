//! Real trade records service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use shared::models::{NewTradeInput, RealTrade, TradeStats};

use crate::error::AppResult;

/// Trade service for recording completed trades
#[derive(Clone)]
pub struct TradeService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct TradeRow {
    id: Uuid,
    user_id: Uuid,
    location: String,
    broker_name: Option<String>,
    grade: String,
    kg_loaded: Decimal,
    farmer_price_per_kg: Decimal,
    broker_net_per_kg: Decimal,
    farmer_broker_net: Decimal,
    total_profit_loss: Decimal,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TradeRow> for RealTrade {
    fn from(row: TradeRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            location: row.location,
            broker_name: row.broker_name,
            grade: row.grade,
            kg_loaded: row.kg_loaded,
            farmer_price_per_kg: row.farmer_price_per_kg,
            broker_net_per_kg: row.broker_net_per_kg,
            farmer_broker_net: row.farmer_broker_net,
            total_profit_loss: row.total_profit_loss,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl TradeService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Trades of a user, newest first
    pub async fn list_trades(&self, user_id: Uuid) -> AppResult<Vec<RealTrade>> {
        let rows = sqlx::query_as::<_, TradeRow>(
            r#"
            SELECT id, user_id, location, broker_name, grade, kg_loaded,
                   farmer_price_per_kg, broker_net_per_kg, farmer_broker_net,
                   total_profit_loss, notes, created_at, updated_at
            FROM real_trades
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(RealTrade::from).collect())
    }

    /// Validate, derive margins and store a trade
    pub async fn create_trade(&self, user_id: Uuid, input: NewTradeInput) -> AppResult<RealTrade> {
        input.validate()?;
        let profit = input.profit();
        let broker_name = input.broker_name.filter(|s| !s.trim().is_empty());
        let notes = input.notes.filter(|s| !s.trim().is_empty());

        let row = sqlx::query_as::<_, TradeRow>(
            r#"
            INSERT INTO real_trades (
                id, user_id, location, broker_name, grade, kg_loaded,
                farmer_price_per_kg, broker_net_per_kg, farmer_broker_net,
                total_profit_loss, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, user_id, location, broker_name, grade, kg_loaded,
                      farmer_price_per_kg, broker_net_per_kg, farmer_broker_net,
                      total_profit_loss, notes, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(input.location.trim())
        .bind(broker_name)
        .bind(input.grade.trim())
        .bind(input.kg_loaded)
        .bind(input.farmer_price_per_kg)
        .bind(input.broker_net_per_kg)
        .bind(profit.farmer_broker_net)
        .bind(profit.total_profit_loss)
        .bind(notes)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(%user_id, trade_id = %row.id, "Recorded trade");
        Ok(row.into())
    }

    /// Delete one of the user's trades; false when it was not theirs or missing
    pub async fn delete_trade(&self, user_id: Uuid, trade_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM real_trades WHERE id = $1 AND user_id = $2")
            .bind(trade_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn get_stats(&self, user_id: Uuid) -> AppResult<TradeStats> {
        let trades = self.list_trades(user_id).await?;
        Ok(TradeStats::from_trades(&trades))
    }
}
