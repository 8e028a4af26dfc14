//! Real trade records and their statistics

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::coerce::lenient_decimal;
use crate::types::{add_or_zero, div_or_zero, fixed2, mul_or_zero, sub_or_zero, sum_or_zero};
use crate::validation::{validate_not_blank, validate_positive};

/// A trade actually carried out, stored per user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RealTrade {
    pub id: Uuid,
    pub user_id: Uuid,
    pub location: String,
    pub broker_name: Option<String>,
    pub grade: String,
    pub kg_loaded: Decimal,
    pub farmer_price_per_kg: Decimal,
    pub broker_net_per_kg: Decimal,
    /// Margin per kg between broker net and farmer price
    pub farmer_broker_net: Decimal,
    pub total_profit_loss: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewTradeInput {
    #[validate(custom = "validate_not_blank")]
    pub location: String,
    pub broker_name: Option<String>,
    #[validate(custom = "validate_not_blank")]
    pub grade: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    #[validate(custom = "validate_positive")]
    pub kg_loaded: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    #[validate(custom = "validate_positive")]
    pub farmer_price_per_kg: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    #[validate(custom = "validate_positive")]
    pub broker_net_per_kg: Decimal,
    pub notes: Option<String>,
}

impl NewTradeInput {
    pub fn profit(&self) -> TradeProfit {
        trade_profit(
            self.kg_loaded,
            self.farmer_price_per_kg,
            self.broker_net_per_kg,
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TradeProfit {
    pub farmer_broker_net: Decimal,
    pub total_profit_loss: Decimal,
}

pub fn trade_profit(
    kg_loaded: Decimal,
    farmer_price_per_kg: Decimal,
    broker_net_per_kg: Decimal,
) -> TradeProfit {
    let farmer_broker_net = sub_or_zero(broker_net_per_kg, farmer_price_per_kg);
    TradeProfit {
        farmer_broker_net,
        total_profit_loss: mul_or_zero(farmer_broker_net, kg_loaded),
    }
}

/// Profit and weight summed over one period
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PeriodBucket {
    pub label: String,
    pub profit: Decimal,
    pub kg: Decimal,
}

const DAILY_BUCKETS: usize = 7;
const WEEKLY_BUCKETS: usize = 4;
const MONTHLY_BUCKETS: usize = 12;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradeStats {
    pub total_trades: usize,
    pub total_profit: Decimal,
    pub total_kg: Decimal,
    pub avg_profit_per_kg: Decimal,
    pub daily: Vec<PeriodBucket>,
    pub weekly: Vec<PeriodBucket>,
    pub monthly: Vec<PeriodBucket>,
}

fn day_label(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

fn week_label(at: &DateTime<Utc>) -> String {
    format!("Week {}, {}", at.day().div_ceil(7), at.format("%b"))
}

fn month_label(at: &DateTime<Utc>) -> String {
    at.format("%b %Y").to_string()
}

/// Group into buckets keyed by label, in order of first appearance
fn bucketize(
    trades: &[RealTrade],
    label: fn(&DateTime<Utc>) -> String,
    limit: usize,
) -> Vec<PeriodBucket> {
    let mut buckets: Vec<PeriodBucket> = Vec::new();
    for trade in trades {
        let key = label(&trade.created_at);
        match buckets.iter_mut().find(|b| b.label == key) {
            Some(bucket) => {
                bucket.profit = add_or_zero(bucket.profit, trade.total_profit_loss);
                bucket.kg = add_or_zero(bucket.kg, trade.kg_loaded);
            }
            None => buckets.push(PeriodBucket {
                label: key,
                profit: trade.total_profit_loss,
                kg: trade.kg_loaded,
            }),
        }
    }
    buckets.truncate(limit);
    buckets
}

impl TradeStats {
    /// Trades are expected newest first
    pub fn from_trades(trades: &[RealTrade]) -> Self {
        let total_profit = sum_or_zero(trades.iter().map(|t| t.total_profit_loss));
        let total_kg = sum_or_zero(trades.iter().map(|t| t.kg_loaded));
        let avg_profit_per_kg = if total_kg > Decimal::ZERO {
            div_or_zero(total_profit, total_kg)
        } else {
            Decimal::ZERO
        };

        Self {
            total_trades: trades.len(),
            total_profit,
            total_kg,
            avg_profit_per_kg,
            daily: bucketize(trades, day_label, DAILY_BUCKETS),
            weekly: bucketize(trades, week_label, WEEKLY_BUCKETS),
            monthly: bucketize(trades, month_label, MONTHLY_BUCKETS),
        }
    }

    pub fn share_message(&self) -> String {
        format!(
            "🌟 Real Trade Stats\n\nTotal Trades: {}\nTotal Profit: ₹{}\nTotal KG: {}\nAvg Profit/KG: ₹{}",
            self.total_trades,
            fixed2(self.total_profit),
            fixed2(self.total_kg),
            fixed2(self.avg_profit_per_kg),
        )
    }
}
