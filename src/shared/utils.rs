//! Utility functions and helpers

use rust_decimal::{Decimal, RoundingStrategy};

/// Round a price or percentage to two decimal places, half away from zero
pub fn round_2dp(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Calculate percentage change, `None` when the old value is zero or the
/// result does not fit in a `Decimal`
pub fn calculate_percentage_change(old_value: Decimal, new_value: Decimal) -> Option<Decimal> {
    if old_value.is_zero() {
        return None;
    }
    new_value
        .checked_sub(old_value)?
        .checked_div(old_value)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
}

/// Keep scheme and host, hide path and query (which often carry API keys)
pub fn mask_url(url: &str) -> String {
    if let Some(scheme_end) = url.find("://") {
        let rest = &url[scheme_end + 3..];
        let host_end = rest.find('/').unwrap_or(rest.len());
        return format!("{}{}/***", &url[..scheme_end + 3], &rest[..host_end]);
    }
    "***".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_2dp() {
        assert_eq!(round_2dp(dec!(150)), dec!(150.00));
        assert_eq!(round_2dp(dec!(1.005)), dec!(1.01));
        assert_eq!(round_2dp(dec!(-1.005)), dec!(-1.01));
        assert_eq!(round_2dp(dec!(33.3333)), dec!(33.33));
    }

    #[test]
    fn test_calculate_percentage_change() {
        assert_eq!(calculate_percentage_change(dec!(100), dec!(104)), Some(dec!(4)));
        assert_eq!(calculate_percentage_change(dec!(200), dec!(150)), Some(dec!(-25)));
        assert_eq!(calculate_percentage_change(dec!(0), dec!(10)), None);
    }

    #[test]
    fn test_percentage_change_overflow_is_none() {
        let tiny = dec!(0.0000000000000000000000000001);
        assert_eq!(calculate_percentage_change(tiny, dec!(1)), None);
        assert_eq!(calculate_percentage_change(Decimal::MIN, Decimal::MAX), None);
    }

    #[test]
    fn test_mask_url() {
        assert_eq!(
            mask_url("https://deep-index.moralis.io/api/v2.2?key=SECRET"),
            "https://deep-index.moralis.io/***"
        );
        assert_eq!(mask_url("http://localhost:8025"), "http://localhost:8025/***");
        assert_eq!(mask_url("not-a-url"), "***");
    }
}
