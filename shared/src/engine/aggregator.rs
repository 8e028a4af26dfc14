//! Grade aggregation

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::GradeEntry;
use crate::types::{add_or_zero, mul_or_zero};

/// Sums over a list of grade entries
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct GradeTotals {
    pub total_boxes: u32,
    pub gross_sale: Decimal,
}

/// Re-derive `gross` from `boxes` and `rate`
pub fn recompute_gross(entry: &mut GradeEntry) {
    entry.gross = mul_or_zero(Decimal::from(entry.boxes), entry.rate);
}

/// Total boxes and gross sale. Order does not matter; an empty list sums to zero.
pub fn totals(entries: &[GradeEntry]) -> GradeTotals {
    entries.iter().fold(GradeTotals::default(), |acc, entry| GradeTotals {
        total_boxes: acc.total_boxes.saturating_add(entry.boxes),
        gross_sale: add_or_zero(acc.gross_sale, entry.gross),
    })
}
