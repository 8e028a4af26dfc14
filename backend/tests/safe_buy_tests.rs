//! Safe buy advisor tests
//!
//! - Break-even and safe farmer rates for a worked trip
//! - Guards against zero weight and negative rates
//! - Comparison against the rate actually paid

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::{
    compute_result, compute_safe_buy, compute_safe_buy_with_factor, default_safe_buy_factor,
    validate_safe_buy_factor, CalculationContext, CalculationResult, CostSettings, GradeEntry,
    SafeBuyComparison,
};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn trip(settings: &CostSettings) -> CalculationResult {
    let grades = vec![
        GradeEntry::new("4 dana", 1, dec("1890")),
        GradeEntry::new("10 dana", 1, dec("1700")),
    ];
    compute_result(&grades, settings, &CalculationContext::default())
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_default_factor() {
        assert_eq!(default_safe_buy_factor(), dec("0.95"));
    }

    #[test]
    fn test_worked_trip() {
        let advice = compute_safe_buy(&trip(&CostSettings::default()));

        // (3374.6 - 2 * 150) / (10 * 2)
        assert_eq!(advice.break_even_price, dec("153.73"));
        assert_eq!(advice.safe_buy_price, dec("146.0435"));
    }

    #[test]
    fn test_advice_ignores_current_farmer_rate() {
        let expensive = CostSettings {
            farmer_rate_kg: dec("300"),
            ..CostSettings::default()
        };
        let result = trip(&expensive);
        assert!(result.profit < Decimal::ZERO);

        let advice = compute_safe_buy(&result);
        assert_eq!(advice.break_even_price, dec("153.73"));
        assert_eq!(advice.safe_buy_price, dec("146.0435"));
    }

    #[test]
    fn test_zero_kg_per_box() {
        let settings = CostSettings {
            kg_per_box: Decimal::ZERO,
            ..CostSettings::default()
        };
        let advice = compute_safe_buy(&trip(&settings));
        assert_eq!(advice.break_even_price, Decimal::ZERO);
        assert_eq!(advice.safe_buy_price, Decimal::ZERO);
    }

    #[test]
    fn test_empty_trip() {
        let result = compute_result(&[], &CostSettings::default(), &CalculationContext::default());
        let advice = compute_safe_buy(&result);
        assert_eq!(advice.break_even_price, Decimal::ZERO);
        assert_eq!(advice.safe_buy_price, Decimal::ZERO);
    }

    #[test]
    fn test_overheads_beyond_net_sale_clamp_to_zero() {
        let settings = CostSettings {
            transport: dec("2000"),
            ..CostSettings::default()
        };
        let advice = compute_safe_buy(&trip(&settings));
        assert_eq!(advice.break_even_price, Decimal::ZERO);
        assert_eq!(advice.safe_buy_price, Decimal::ZERO);
    }

    #[test]
    fn test_custom_factor() {
        let advice = compute_safe_buy_with_factor(&trip(&CostSettings::default()), dec("0.9"));
        assert_eq!(advice.safe_buy_price, dec("138.357"));
        assert!(validate_safe_buy_factor(dec("0.9")).is_ok());
        assert!(validate_safe_buy_factor(Decimal::ZERO).is_err());
        assert!(validate_safe_buy_factor(dec("1.2")).is_err());
    }

    #[test]
    fn test_comparison_when_overpaying() {
        let expensive = CostSettings {
            farmer_rate_kg: dec("160"),
            ..CostSettings::default()
        };
        let result = trip(&expensive);
        let advice = compute_safe_buy(&result);
        let comparison = SafeBuyComparison::new(&result, &advice);

        assert!(comparison.should_reduce_rate);
        assert_eq!(comparison.current_rate, dec("160"));
        assert_eq!(comparison.savings_per_kg, dec("13.9565"));
        assert_eq!(comparison.potential_profit, dec("279.13"));
        // 3374.6 - 2 * 1750
        assert_eq!(comparison.current_loss, dec("125.4"));
    }

    #[test]
    fn test_comparison_when_rate_is_safe() {
        let result = trip(&CostSettings::default());
        let comparison = SafeBuyComparison::new(&result, &compute_safe_buy(&result));

        assert!(!comparison.should_reduce_rate);
        assert_eq!(comparison.current_loss, Decimal::ZERO);
    }

    #[test]
    fn test_oversized_posted_result() {
        let mut posted = serde_json::to_value(trip(&CostSettings::default())).unwrap();
        posted["transport"] = serde_json::json!("50000000000000000000000000000");
        posted["farmer_rate_kg"] = serde_json::json!("70000000000000000000000000000");
        let result: CalculationResult = serde_json::from_value(posted).unwrap();

        let advice = compute_safe_buy(&result);
        assert_eq!(advice.break_even_price, Decimal::ZERO);
        assert_eq!(advice.safe_buy_price, Decimal::ZERO);

        let comparison = SafeBuyComparison::new(&result, &advice);
        assert!(comparison.should_reduce_rate);
        assert_eq!(comparison.savings_per_kg, dec("70000000000000000000000000000"));
        // 20 kg times the saving does not fit
        assert_eq!(comparison.potential_profit, Decimal::ZERO);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Advice is never negative, whatever the costs
        #[test]
        fn prop_advice_is_non_negative(
            boxes in 0u32..100u32,
            rate in 0u32..5_000u32,
            commission in 0u32..200u32,
            transport in 0u32..3_000u32,
            kg in 0u32..30u32
        ) {
            let settings = CostSettings {
                commission: Decimal::from(commission),
                transport: Decimal::from(transport),
                kg_per_box: Decimal::from(kg),
                ..CostSettings::default()
            };
            let grades = vec![GradeEntry::new("lot", boxes, Decimal::from(rate))];
            let result = compute_result(&grades, &settings, &CalculationContext::default());
            let advice = compute_safe_buy(&result);

            prop_assert!(advice.break_even_price >= Decimal::ZERO);
            prop_assert!(advice.safe_buy_price >= Decimal::ZERO);
            prop_assert!(advice.safe_buy_price <= advice.break_even_price);
        }

        /// Buying at break-even leaves no profit
        #[test]
        fn prop_break_even_rate_zeroes_profit(
            boxes in 1u32..50u32,
            rate in 1_000u32..3_000u32
        ) {
            let grades = vec![GradeEntry::new("lot", boxes, Decimal::from(rate))];
            let first = compute_result(&grades, &CostSettings::default(), &CalculationContext::default());
            let advice = compute_safe_buy(&first);

            let at_break_even = CostSettings {
                farmer_rate_kg: advice.break_even_price,
                ..CostSettings::default()
            };
            let second = compute_result(&grades, &at_break_even, &CalculationContext::default());
            prop_assert_eq!(second.profit.round_dp(6), Decimal::ZERO);
        }
    }
}
