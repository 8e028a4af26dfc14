//! Advisory alerts shown above the calculator

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{CalculationResult, GradeEntry};
use crate::types::{fixed2, format_inr};

/// Commission above this percentage is flagged
pub const COMMISSION_ALERT_PERCENT: u32 = 6;
/// Transport above this rate per box is flagged
pub const TRANSPORT_ALERT_PER_BOX: u32 = 75;
/// Packing above this rate per box is flagged
pub const PACKING_ALERT_PER_BOX: u32 = 70;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Error,
    Warning,
    Success,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
}

impl Alert {
    fn new(kind: AlertKind, title: &str, message: String) -> Self {
        Self {
            kind,
            title: title.to_string(),
            message,
        }
    }
}

/// Evaluate every alert rule, in display order
pub fn evaluate_alerts(result: Option<&CalculationResult>, grades: &[GradeEntry]) -> Vec<Alert> {
    let mut alerts = Vec::new();

    let incomplete = grades.iter().filter(|g| g.is_incomplete()).count();
    if incomplete > 0 {
        alerts.push(Alert::new(
            AlertKind::Warning,
            "Incomplete Grade Data",
            format!(
                "{} grade(s) have missing boxes or rates. This may affect calculations.",
                incomplete
            ),
        ));
    }

    let Some(result) = result else {
        return alerts;
    };

    if result.profit < Decimal::ZERO {
        alerts.push(Alert::new(
            AlertKind::Error,
            "Loss Alert",
            format!(
                "Net sale (₹{}) is less than total cost (₹{}).",
                format_inr(result.net_sale),
                format_inr(result.total_cost)
            ),
        ));
    }

    if result.commission > Decimal::from(COMMISSION_ALERT_PERCENT) {
        alerts.push(Alert::new(
            AlertKind::Warning,
            "High Commission",
            format!(
                "Commission rate of {}% is above average. Consider negotiating with broker.",
                result.commission.normalize()
            ),
        ));
    }

    if result.profit > Decimal::ZERO {
        alerts.push(Alert::new(
            AlertKind::Success,
            "Profitable Transaction",
            format!(
                "Good profit of ₹{} with {}% margin.",
                format_inr(result.profit),
                fixed2(result.margin_on_net_sale())
            ),
        ));
    }

    if result.transport > Decimal::from(TRANSPORT_ALERT_PER_BOX) {
        alerts.push(Alert::new(
            AlertKind::Info,
            "High Transport Cost",
            format!(
                "Transport cost of ₹{}/box is above average. Total: ₹{}",
                format_inr(result.transport),
                format_inr(result.total_transport_cost)
            ),
        ));
    }

    if result.packing > Decimal::from(PACKING_ALERT_PER_BOX) {
        alerts.push(Alert::new(
            AlertKind::Info,
            "High Packing Cost",
            format!(
                "Packing cost of ₹{}/box is above average. Total: ₹{}",
                format_inr(result.packing),
                format_inr(result.total_packing_cost)
            ),
        ));
    }

    alerts
}
