//! Weighted average price across several lots

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::coerce::lenient_decimal;
use crate::types::{div_or_zero, mul_or_zero, sub_or_zero, sum_or_zero};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PriceEntry {
    /// Price per kg
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub price: Decimal,
    /// Weight in kg
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub weight: Decimal,
}

impl PriceEntry {
    pub fn new(price: Decimal, weight: Decimal) -> Self {
        Self { price, weight }
    }

    pub fn is_valid(&self) -> bool {
        self.price > Decimal::ZERO && self.weight > Decimal::ZERO
    }

    pub fn value(&self) -> Decimal {
        mul_or_zero(self.price, self.weight)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AverageSummary {
    pub average_price: Decimal,
    pub total_weight: Decimal,
    pub total_value: Decimal,
    /// Entries that had both a price and a weight
    pub valid_entries: usize,
}

impl AverageSummary {
    /// `None` when no entry has both a positive price and weight
    pub fn from_entries(entries: &[PriceEntry]) -> Option<Self> {
        let valid: Vec<&PriceEntry> = entries.iter().filter(|e| e.is_valid()).collect();
        if valid.is_empty() {
            return None;
        }

        let total_value = sum_or_zero(valid.iter().map(|e| e.value()));
        let total_weight = sum_or_zero(valid.iter().map(|e| e.weight));

        Some(Self {
            average_price: div_or_zero(total_value, total_weight),
            total_weight,
            total_value,
            valid_entries: valid.len(),
        })
    }
}

/// Price dispersion figures shown next to the weighted average
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceSpread {
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub std_dev: Decimal,
    pub coefficient_of_variation: Decimal,
}

impl PriceSpread {
    /// Deviation is measured around `average_price`, not the plain mean
    pub fn from_entries(entries: &[PriceEntry], average_price: Decimal) -> Option<Self> {
        let prices: Vec<Decimal> = entries
            .iter()
            .filter(|e| e.is_valid())
            .map(|e| e.price)
            .collect();
        let min_price = prices.iter().copied().min()?;
        let max_price = prices.iter().copied().max()?;

        let squares = prices.iter().map(|p| {
            let deviation = sub_or_zero(*p, average_price);
            mul_or_zero(deviation, deviation)
        });
        let variance = div_or_zero(sum_or_zero(squares), Decimal::from(prices.len()));
        let std_dev = variance.sqrt().unwrap_or(Decimal::ZERO);

        let coefficient_of_variation =
            mul_or_zero(div_or_zero(std_dev, average_price), Decimal::ONE_HUNDRED);

        Some(Self {
            min_price,
            max_price,
            std_dev,
            coefficient_of_variation,
        })
    }
}

/// Stored average calculation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedAverage {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entries: Vec<PriceEntry>,
    pub average_price: Decimal,
    pub total_weight: Decimal,
    pub total_value: Decimal,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_weighted_average_skips_invalid() {
        let entries = vec![
            PriceEntry::new(dec("100"), dec("10")),
            PriceEntry::new(dec("130"), dec("20")),
            PriceEntry::new(dec("500"), dec("0")),
            PriceEntry::new(dec("0"), dec("40")),
        ];
        let summary = AverageSummary::from_entries(&entries).unwrap();
        assert_eq!(summary.total_value, dec("3600"));
        assert_eq!(summary.total_weight, dec("30"));
        assert_eq!(summary.average_price, dec("120"));
        assert_eq!(summary.valid_entries, 2);
    }

    #[test]
    fn test_no_valid_entries() {
        assert!(AverageSummary::from_entries(&[]).is_none());
        assert!(AverageSummary::from_entries(&[PriceEntry::default()]).is_none());
    }

    #[test]
    fn test_spread() {
        let entries = vec![
            PriceEntry::new(dec("90"), dec("1")),
            PriceEntry::new(dec("110"), dec("1")),
        ];
        let spread = PriceSpread::from_entries(&entries, dec("100")).unwrap();
        assert_eq!(spread.min_price, dec("90"));
        assert_eq!(spread.max_price, dec("110"));
        assert_eq!(spread.std_dev.round_dp(6), dec("10"));
        assert_eq!(spread.coefficient_of_variation.round_dp(6), dec("10"));
    }
}
