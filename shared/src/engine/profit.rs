//! Profit engine: grades + cost settings -> calculation result

use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{aggregator, cost};
use crate::models::{CalculationContext, CalculationResult, CostSettings, GradeEntry};
use crate::types::{div_or_zero, mul_or_zero, sub_or_zero};

/// Compute a fresh result stamped with a new id and the current time
pub fn compute_result(
    grades: &[GradeEntry],
    settings: &CostSettings,
    context: &CalculationContext,
) -> CalculationResult {
    compute_result_at(grades, settings, context, Uuid::new_v4(), Utc::now())
}

/// Compute a result with a caller-supplied identity and timestamp
///
/// The timestamp is truncated to microseconds, the precision history storage keeps.
pub fn compute_result_at(
    grades: &[GradeEntry],
    settings: &CostSettings,
    context: &CalculationContext,
    id: Uuid,
    timestamp: DateTime<Utc>,
) -> CalculationResult {
    // Gross is derived, whatever the caller sent
    let mut grades = grades.to_vec();
    for grade in grades.iter_mut() {
        aggregator::recompute_gross(grade);
    }

    let totals = aggregator::totals(&grades);
    let total_boxes = totals.total_boxes;
    let gross_sale = totals.gross_sale;

    let commission_amt = mul_or_zero(
        gross_sale,
        div_or_zero(settings.commission, Decimal::ONE_HUNDRED),
    );
    let net_sale = sub_or_zero(gross_sale, commission_amt);

    let cost_per_box = cost::cost_per_box(settings);
    let total_cost = cost::total_line_cost(cost_per_box, total_boxes);
    let profit = sub_or_zero(net_sale, total_cost);

    let lines = cost::line_costs(settings, total_boxes);

    for grade in grades.iter_mut() {
        let nominal = grade.nominal_profit(cost_per_box);
        grade.profit_per_box = Some(div_or_zero(nominal, Decimal::from(grade.boxes)));
        grade.margin_percent = Some(if grade.gross > Decimal::ZERO {
            mul_or_zero(div_or_zero(nominal, grade.gross), Decimal::ONE_HUNDRED)
        } else {
            Decimal::ZERO
        });
    }

    let context = context.normalized();

    CalculationResult {
        id,
        timestamp: timestamp.trunc_subsecs(6),
        farmer_name: context.farmer_name,
        buyer_name: context.buyer_name,
        farmer_contact: context.farmer_contact,
        buyer_contact: context.buyer_contact,
        trip_id: context.trip_id,
        notes: context.notes,
        grades,
        total_boxes,
        gross_sale,
        commission_amt,
        net_sale,
        total_cost,
        profit,
        total_transport_cost: lines.transport,
        total_packing_cost: lines.packing,
        total_labour_cost: lines.labour,
        total_utility_cost: lines.utility,
        commission: settings.commission,
        transport: settings.transport,
        packing: settings.packing,
        labour: settings.labour,
        miscellaneous: settings.miscellaneous,
        farmer_rate_kg: settings.farmer_rate_kg,
        kg_per_box: settings.kg_per_box,
    }
}
