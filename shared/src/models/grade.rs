//! Grade entry models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::coerce::{lenient_count, lenient_decimal, lenient_total};
use crate::types::{mul_or_zero, sub_or_zero};

/// One priced lot within a calculation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GradeEntry {
    /// Stable within a calculation; insertion order is display order
    #[serde(default = "new_grade_id")]
    pub id: String,
    /// Free-text grade label, e.g. "4 dana"
    #[serde(default)]
    pub note: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub boxes: u32,
    /// Rate per box
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub rate: Decimal,
    /// Always `boxes * rate`
    #[serde(default, deserialize_with = "lenient_total")]
    pub gross: Decimal,
    /// Only set on entries frozen inside a calculation result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profit_per_box: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_percent: Option<Decimal>,
}

pub fn new_grade_id() -> String {
    format!("grade-{}", Uuid::new_v4())
}

impl GradeEntry {
    pub fn new(note: impl Into<String>, boxes: u32, rate: Decimal) -> Self {
        Self {
            id: new_grade_id(),
            note: note.into(),
            boxes,
            rate,
            gross: mul_or_zero(Decimal::from(boxes), rate),
            profit_per_box: None,
            margin_percent: None,
        }
    }

    /// Empty row as added from the calculator screen
    pub fn blank() -> Self {
        Self::new(String::new(), 0, Decimal::ZERO)
    }

    /// Rows missing a box count or a rate still count, but get flagged
    pub fn is_incomplete(&self) -> bool {
        self.boxes == 0 || self.rate.is_zero()
    }

    /// What this grade earns before commission once every box carries `cost_per_box`
    pub fn nominal_profit(&self, cost_per_box: Decimal) -> Decimal {
        sub_or_zero(self.gross, mul_or_zero(Decimal::from(self.boxes), cost_per_box))
    }
}

/// The sample grade set loaded into a fresh calculator
pub fn default_grades() -> Vec<GradeEntry> {
    [
        ("4 dana", 1890),
        ("10 dana", 1700),
        ("18 dana", 1650),
        ("30 dana", 1500),
        ("small", 1300),
    ]
    .into_iter()
    .map(|(note, rate)| GradeEntry::new(note, 1, Decimal::from(rate)))
    .collect()
}
