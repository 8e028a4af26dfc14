//! Validation utilities for the trade calculator

use std::borrow::Cow;

use rust_decimal::Decimal;
use validator::ValidationError;

use crate::models::PriceEntry;

// ============================================================================
// Basic checks
// ============================================================================

pub fn not_blank(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("Value must not be blank");
    }
    Ok(())
}

pub fn positive(value: Decimal) -> Result<(), &'static str> {
    if value <= Decimal::ZERO {
        return Err("Value must be greater than zero");
    }
    Ok(())
}

fn to_validation_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// `validator` adapter for [`not_blank`]
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    not_blank(value).map_err(|msg| to_validation_error("blank", msg))
}

/// `validator` adapter for [`positive`]
pub fn validate_positive(value: &Decimal) -> Result<(), ValidationError> {
    positive(*value).map_err(|msg| to_validation_error("not_positive", msg))
}

// ============================================================================
// Calculator inputs
// ============================================================================

pub fn validate_price_entries(entries: &[PriceEntry]) -> Result<(), &'static str> {
    if !entries.iter().any(PriceEntry::is_valid) {
        return Err("Please enter valid price and weight values");
    }
    Ok(())
}

/// Safe-buy multiplier must keep the advice at or below break-even
pub fn validate_safe_buy_factor(factor: Decimal) -> Result<(), &'static str> {
    if factor <= Decimal::ZERO || factor > Decimal::ONE {
        return Err("Safe buy factor must be in (0, 1]");
    }
    Ok(())
}
