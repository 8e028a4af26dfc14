//! Calculation result models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CostSettings, GradeEntry};
use crate::types::{div_or_zero, mul_or_zero, sub_or_zero};

/// Free-text trip details attached to a calculation
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CalculationContext {
    pub farmer_name: Option<String>,
    pub buyer_name: Option<String>,
    pub farmer_contact: Option<String>,
    pub buyer_contact: Option<String>,
    pub trip_id: Option<String>,
    pub notes: Option<String>,
}

impl CalculationContext {
    /// Trim every field and drop the blank ones
    pub fn normalized(&self) -> Self {
        fn clean(value: &Option<String>) -> Option<String> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        }

        Self {
            farmer_name: clean(&self.farmer_name),
            buyer_name: clean(&self.buyer_name),
            farmer_contact: clean(&self.farmer_contact),
            buyer_contact: clean(&self.buyer_contact),
            trip_id: clean(&self.trip_id),
            notes: clean(&self.notes),
        }
    }
}

/// Immutable snapshot of one profit/loss calculation; the unit kept in history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalculationResult {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,

    pub farmer_name: Option<String>,
    pub buyer_name: Option<String>,
    pub farmer_contact: Option<String>,
    pub buyer_contact: Option<String>,
    pub trip_id: Option<String>,
    pub notes: Option<String>,

    /// Entries with `profit_per_box`/`margin_percent` frozen at computation time
    pub grades: Vec<GradeEntry>,

    pub total_boxes: u32,
    pub gross_sale: Decimal,
    pub commission_amt: Decimal,
    pub net_sale: Decimal,
    pub total_cost: Decimal,
    pub profit: Decimal,
    pub total_transport_cost: Decimal,
    pub total_packing_cost: Decimal,
    pub total_labour_cost: Decimal,
    pub total_utility_cost: Decimal,

    // Settings in force when this was computed
    pub commission: Decimal,
    pub transport: Decimal,
    pub packing: Decimal,
    pub labour: Decimal,
    pub miscellaneous: Decimal,
    pub farmer_rate_kg: Decimal,
    pub kg_per_box: Decimal,
}

impl CalculationResult {
    /// Rebuild the cost settings frozen into this result
    pub fn settings(&self) -> CostSettings {
        CostSettings {
            commission: self.commission,
            transport: self.transport,
            packing: self.packing,
            labour: self.labour,
            miscellaneous: self.miscellaneous,
            farmer_rate_kg: self.farmer_rate_kg,
            kg_per_box: self.kg_per_box,
        }
    }

    pub fn is_profitable(&self) -> bool {
        self.profit > Decimal::ZERO
    }

    /// "Profit" or "Loss", as shown next to the absolute amount
    pub fn outcome_label(&self) -> &'static str {
        if self.profit >= Decimal::ZERO {
            "Profit"
        } else {
            "Loss"
        }
    }

    /// Profit as a percentage of net sale (0 when nothing was sold)
    pub fn margin_on_net_sale(&self) -> Decimal {
        mul_or_zero(div_or_zero(self.profit, self.net_sale), Decimal::ONE_HUNDRED)
    }
}

/// Recommended farmer purchase rates, per kilogram
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SafeBuyAdvice {
    pub safe_buy_price: Decimal,
    pub break_even_price: Decimal,
}

/// Advice set against the rate actually used in a calculation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SafeBuyComparison {
    pub current_rate: Decimal,
    pub safe_buy_price: Decimal,
    pub break_even_price: Decimal,
    pub savings_per_kg: Decimal,
    pub potential_profit: Decimal,
    pub current_loss: Decimal,
    pub should_reduce_rate: bool,
}

impl SafeBuyComparison {
    pub fn new(result: &CalculationResult, advice: &SafeBuyAdvice) -> Self {
        let savings_per_kg = sub_or_zero(result.farmer_rate_kg, advice.safe_buy_price);
        let total_kg = mul_or_zero(Decimal::from(result.total_boxes), result.kg_per_box);
        let potential_profit = mul_or_zero(total_kg, savings_per_kg);
        let current_loss = if result.profit < Decimal::ZERO {
            result.profit.abs()
        } else {
            Decimal::ZERO
        };

        Self {
            current_rate: result.farmer_rate_kg,
            safe_buy_price: advice.safe_buy_price,
            break_even_price: advice.break_even_price,
            savings_per_kg,
            potential_profit,
            current_loss,
            should_reduce_rate: result.farmer_rate_kg > advice.safe_buy_price,
        }
    }
}
