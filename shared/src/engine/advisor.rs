//! Safe buy advisor
//!
//! Works backwards from a finished calculation to the farmer rate per kg at
//! which the load would break even, then keeps a fixed buffer below it.

use rust_decimal::Decimal;

use crate::models::{CalculationResult, SafeBuyAdvice};
use crate::types::{div_or_zero, mul_or_zero};

/// Safety buffer kept below the break-even rate, in percent
pub const SAFE_BUY_BUFFER_PERCENT: u32 = 5;

/// Multiplier applied to the break-even rate (0.95)
pub fn default_safe_buy_factor() -> Decimal {
    (Decimal::ONE_HUNDRED - Decimal::from(SAFE_BUY_BUFFER_PERCENT)) / Decimal::ONE_HUNDRED
}

pub fn compute_safe_buy(result: &CalculationResult) -> SafeBuyAdvice {
    compute_safe_buy_with_factor(result, default_safe_buy_factor())
}

/// Same as [`compute_safe_buy`] with an explicit multiplier on break-even
pub fn compute_safe_buy_with_factor(result: &CalculationResult, factor: Decimal) -> SafeBuyAdvice {
    let total_boxes = Decimal::from(result.total_boxes);

    // Saturating, so overheads too large to represent still exceed the net sale
    let settings = result.settings();
    let other_costs_per_box = [
        settings.transport,
        settings.packing,
        settings.labour,
        settings.miscellaneous,
    ]
    .into_iter()
    .fold(Decimal::ZERO, Decimal::saturating_add);
    let total_other_costs = other_costs_per_box.saturating_mul(total_boxes);
    let available_for_farmer_cost = result.net_sale.saturating_sub(total_other_costs);

    // Zero kg and figures too large to combine both come out as zero
    let total_kg = mul_or_zero(result.kg_per_box, total_boxes);
    let break_even = div_or_zero(available_for_farmer_cost, total_kg);
    let safe = mul_or_zero(break_even, factor);

    SafeBuyAdvice {
        safe_buy_price: floor_at_zero(safe),
        break_even_price: floor_at_zero(break_even),
    }
}

fn floor_at_zero(value: Decimal) -> Decimal {
    if value.is_sign_negative() {
        Decimal::ZERO
    } else {
        value
    }
}
