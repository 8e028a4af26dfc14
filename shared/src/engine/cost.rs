//! Cost model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::CostSettings;
use crate::types::{add_or_zero, mul_or_zero, sum_or_zero};

/// Per-line cost totals across all boxes
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct LineCosts {
    pub transport: Decimal,
    pub packing: Decimal,
    pub labour: Decimal,
    /// Miscellaneous, reported as utility
    pub utility: Decimal,
}

/// Farmer purchase cost of one box plus every per-box overhead
pub fn cost_per_box(settings: &CostSettings) -> Decimal {
    add_or_zero(
        mul_or_zero(settings.farmer_rate_kg, settings.kg_per_box),
        other_costs_per_box(settings),
    )
}

/// Per-box overheads excluding the farmer purchase
pub fn other_costs_per_box(settings: &CostSettings) -> Decimal {
    sum_or_zero([
        settings.transport,
        settings.packing,
        settings.labour,
        settings.miscellaneous,
    ])
}

pub fn total_cost(settings: &CostSettings, total_boxes: u32) -> Decimal {
    total_line_cost(cost_per_box(settings), total_boxes)
}

/// Any per-box field spread over the whole load
pub fn total_line_cost(per_box: Decimal, total_boxes: u32) -> Decimal {
    mul_or_zero(per_box, Decimal::from(total_boxes))
}

pub fn line_costs(settings: &CostSettings, total_boxes: u32) -> LineCosts {
    LineCosts {
        transport: total_line_cost(settings.transport, total_boxes),
        packing: total_line_cost(settings.packing, total_boxes),
        labour: total_line_cost(settings.labour, total_boxes),
        utility: total_line_cost(settings.miscellaneous, total_boxes),
    }
}
