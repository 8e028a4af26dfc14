//! Lenient numeric input handling
//!
//! Calculator fields are typed by traders into plain form inputs. A value that
//! does not read as a finite, non-negative number is taken as zero instead of
//! being rejected, so a half-filled row never blocks a calculation.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Largest accepted currency/weight/percentage input (1,00,00,00,000)
pub const MAX_AMOUNT: i64 = 1_000_000_000;

/// Largest accepted box count for a single grade row
pub const MAX_BOXES: u32 = 1_000_000;

/// Parse a text field the way a number input would read it
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Coerce any JSON value into a non-negative amount, falling back to zero
pub fn decimal_from_value(value: &Value) -> Decimal {
    let parsed = match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s),
        _ => None,
    };

    match parsed {
        Some(d) if d.is_sign_negative() || d > Decimal::from(MAX_AMOUNT) => Decimal::ZERO,
        Some(d) => d,
        None => Decimal::ZERO,
    }
}

/// Like [`decimal_from_value`] without the upper bound, for derived totals
pub fn total_from_value(value: &Value) -> Decimal {
    let parsed = match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s),
        _ => None,
    };
    parsed.filter(|d| !d.is_sign_negative()).unwrap_or(Decimal::ZERO)
}

/// Coerce any JSON value into a box count. Fractions are truncated.
pub fn count_from_value(value: &Value) -> u32 {
    decimal_from_value(value)
        .trunc()
        .to_u32()
        .filter(|n| *n <= MAX_BOXES)
        .unwrap_or(0)
}

/// Serde adapter for amount fields: `#[serde(default, deserialize_with = "lenient_decimal")]`
pub fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(decimal_from_value(&value))
}

/// Serde adapter for derived totals such as a grade's gross
pub fn lenient_total<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(total_from_value(&value))
}

/// Serde adapter for box count fields
pub fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(count_from_value(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_numbers_pass_through() {
        assert_eq!(decimal_from_value(&json!(1890)), dec("1890"));
        assert_eq!(decimal_from_value(&json!(215.4)), dec("215.4"));
    }

    #[test]
    fn test_numeric_strings_are_read() {
        assert_eq!(decimal_from_value(&json!(" 75 ")), dec("75"));
        assert_eq!(decimal_from_value(&json!("131.5")), dec("131.5"));
        assert_eq!(decimal_from_value(&json!("1e3")), dec("1000"));
    }

    #[test]
    fn test_garbage_becomes_zero() {
        assert_eq!(decimal_from_value(&json!("abc")), Decimal::ZERO);
        assert_eq!(decimal_from_value(&json!("")), Decimal::ZERO);
        assert_eq!(decimal_from_value(&json!(null)), Decimal::ZERO);
        assert_eq!(decimal_from_value(&json!(true)), Decimal::ZERO);
        assert_eq!(decimal_from_value(&json!([1, 2])), Decimal::ZERO);
    }

    #[test]
    fn test_negative_and_oversized_become_zero() {
        assert_eq!(decimal_from_value(&json!(-5)), Decimal::ZERO);
        assert_eq!(decimal_from_value(&json!("-0.01")), Decimal::ZERO);
        assert_eq!(decimal_from_value(&json!(1e30)), Decimal::ZERO);
    }

    #[test]
    fn test_totals_are_uncapped() {
        assert_eq!(total_from_value(&json!("1890000000000")), dec("1890000000000"));
        assert_eq!(total_from_value(&json!(-1)), Decimal::ZERO);
    }

    #[test]
    fn test_counts_truncate() {
        assert_eq!(count_from_value(&json!(3)), 3);
        assert_eq!(count_from_value(&json!(2.9)), 2);
        assert_eq!(count_from_value(&json!("12")), 12);
        assert_eq!(count_from_value(&json!(-1)), 0);
        assert_eq!(count_from_value(&json!(5_000_000)), 0);
    }

    #[test]
    fn test_serde_adapters_with_missing_fields() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(default, deserialize_with = "lenient_count")]
            boxes: u32,
            #[serde(default, deserialize_with = "lenient_decimal")]
            rate: Decimal,
        }

        let row: Row = serde_json::from_str(r#"{"boxes": "4"}"#).unwrap();
        assert_eq!(row.boxes, 4);
        assert_eq!(row.rate, Decimal::ZERO);

        let row: Row = serde_json::from_str(r#"{"boxes": null, "rate": "x"}"#).unwrap();
        assert_eq!(row.boxes, 0);
        assert_eq!(row.rate, Decimal::ZERO);
    }
}
