//! Filtering and analytics over saved calculation history

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{CalculationResult, GradeEntry};
use crate::types::sum_or_zero;

/// History search criteria; blank fields are ignored
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HistoryFilter {
    /// Case-insensitive match on farmer, buyer, trip id or any grade note
    pub search: Option<String>,
    /// Exact grade note
    pub grade: Option<String>,
    pub farmer_name: Option<String>,
    pub buyer_name: Option<String>,
    #[serde(default)]
    pub profit_only: bool,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

fn contains_ci(haystack: &Option<String>, needle: &str) -> bool {
    haystack
        .as_deref()
        .map(|h| h.to_lowercase().contains(needle))
        .unwrap_or(false)
}

impl HistoryFilter {
    pub fn matches(&self, calc: &CalculationResult) -> bool {
        if let Some(term) = non_blank(&self.search) {
            let term = term.to_lowercase();
            let hit = contains_ci(&calc.farmer_name, &term)
                || contains_ci(&calc.buyer_name, &term)
                || contains_ci(&calc.trip_id, &term)
                || calc
                    .grades
                    .iter()
                    .any(|g| g.note.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }

        if let Some(grade) = non_blank(&self.grade) {
            if !calc.grades.iter().any(|g| g.note == grade) {
                return false;
            }
        }

        if let Some(farmer) = non_blank(&self.farmer_name) {
            if calc.farmer_name.as_deref() != Some(farmer) {
                return false;
            }
        }

        if let Some(buyer) = non_blank(&self.buyer_name) {
            if calc.buyer_name.as_deref() != Some(buyer) {
                return false;
            }
        }

        if self.profit_only && calc.profit <= Decimal::ZERO {
            return false;
        }

        if self.start.is_some_and(|start| calc.timestamp < start) {
            return false;
        }
        if self.end.is_some_and(|end| calc.timestamp > end) {
            return false;
        }

        true
    }

    /// Matching calculations, original order kept
    pub fn apply(&self, history: &[CalculationResult]) -> Vec<CalculationResult> {
        history
            .iter()
            .filter(|calc| self.matches(calc))
            .cloned()
            .collect()
    }
}

/// Best and worst grade rows by profit per box across a history
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GradeHighlights {
    pub best: Option<GradeEntry>,
    pub worst: Option<GradeEntry>,
}

pub fn best_and_worst_grades(history: &[CalculationResult]) -> GradeHighlights {
    let profit_of = |g: &GradeEntry| g.profit_per_box.unwrap_or(Decimal::ZERO);

    let mut all = history.iter().flat_map(|calc| calc.grades.iter());
    let Some(first) = all.next() else {
        return GradeHighlights::default();
    };

    let (best, worst) = all.fold((first, first), |(best, worst), current| {
        let best = if profit_of(current) > profit_of(best) {
            current
        } else {
            best
        };
        let worst = if profit_of(current) < profit_of(worst) {
            current
        } else {
            worst
        };
        (best, worst)
    });

    GradeHighlights {
        best: Some(best.clone()),
        worst: Some(worst.clone()),
    }
}

/// Distinct grade notes, sorted, for the grade filter dropdown
pub fn grade_notes(history: &[CalculationResult]) -> Vec<String> {
    history
        .iter()
        .flat_map(|calc| calc.grades.iter().map(|g| g.note.clone()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// One point of the profit chart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfitPoint {
    pub label: String,
    pub profit: Decimal,
    pub is_profit: bool,
}

pub fn profit_series(history: &[CalculationResult]) -> Vec<ProfitPoint> {
    history
        .iter()
        .enumerate()
        .map(|(i, calc)| ProfitPoint {
            label: format!("Calc {}", i + 1),
            profit: calc.profit,
            is_profit: calc.profit >= Decimal::ZERO,
        })
        .collect()
}

/// Everything the history dashboard shows besides the table itself
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryInsights {
    pub total_calculations: usize,
    pub total_profit: Decimal,
    pub profitable_count: usize,
    pub highlights: GradeHighlights,
    pub grade_notes: Vec<String>,
    pub profit_series: Vec<ProfitPoint>,
}

impl HistoryInsights {
    pub fn from_history(history: &[CalculationResult]) -> Self {
        Self {
            total_calculations: history.len(),
            total_profit: sum_or_zero(history.iter().map(|c| c.profit)),
            profitable_count: history.iter().filter(|c| c.is_profitable()).count(),
            highlights: best_and_worst_grades(history),
            grade_notes: grade_notes(history),
            profit_series: profit_series(history),
        }
    }
}

/// Flat one-line-per-calculation row for history CSV export
#[derive(Debug, Clone, Serialize)]
pub struct HistoryCsvRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Farmer")]
    pub farmer_name: String,
    #[serde(rename = "Buyer")]
    pub buyer_name: String,
    #[serde(rename = "Trip_ID")]
    pub trip_id: String,
    #[serde(rename = "Boxes")]
    pub total_boxes: u32,
    #[serde(rename = "Gross_sale")]
    pub gross_sale: Decimal,
    #[serde(rename = "Net_sale")]
    pub net_sale: Decimal,
    #[serde(rename = "Total_cost")]
    pub total_cost: Decimal,
    #[serde(rename = "Profit")]
    pub profit: Decimal,
}

impl From<&CalculationResult> for HistoryCsvRow {
    fn from(calc: &CalculationResult) -> Self {
        Self {
            date: calc.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            farmer_name: calc.farmer_name.clone().unwrap_or_default(),
            buyer_name: calc.buyer_name.clone().unwrap_or_default(),
            trip_id: calc.trip_id.clone().unwrap_or_default(),
            total_boxes: calc.total_boxes,
            gross_sale: calc.gross_sale,
            net_sale: calc.net_sale,
            total_cost: calc.total_cost,
            profit: calc.profit,
        }
    }
}
