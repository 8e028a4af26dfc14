//! Cost configuration for a calculation session

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::coerce::lenient_decimal;

/// Cost parameters. Missing or unreadable fields read as zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostSettings {
    /// Broker commission, percent of gross sale
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub commission: Decimal,
    /// Per box
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub transport: Decimal,
    /// Per box
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub packing: Decimal,
    /// Per box
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub labour: Decimal,
    /// Per box; reported as "utility" in totals
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub miscellaneous: Decimal,
    /// Price paid to the farmer per kilogram
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub farmer_rate_kg: Decimal,
    /// Weight conversion; may arrive as zero, so divisions by it are guarded
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub kg_per_box: Decimal,
}

impl Default for CostSettings {
    fn default() -> Self {
        Self {
            commission: Decimal::from(6),
            transport: Decimal::from(75),
            packing: Decimal::from(75),
            labour: Decimal::ZERO,
            miscellaneous: Decimal::ZERO,
            farmer_rate_kg: Decimal::from(131),
            kg_per_box: Decimal::from(10),
        }
    }
}
