//! Price parsing and resolution
//!
//! Sources encode prices two ways: human-formatted decimal text
//! ("$ 1,299.00") or an integer amount in a minor currency unit with an
//! explicit exponent ("2700" with exponent 2). Both funnel into plain
//! `f64` pesos rounded to two decimals before resolution.

use crate::catalog::RawPrice;

/// Final pricing for one product after all fallbacks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPrice {
    /// Effective price a buyer pays now
    pub price: f64,

    /// List price before any discount; never below `price`
    pub list_price: f64,

    /// Whether the list price exceeds the effective price
    pub on_sale: bool,
}

/// Parses a raw price into pesos, whatever its encoding
pub fn amount(price: &RawPrice) -> Option<f64> {
    match price {
        RawPrice::Text(text) => parse_amount(text),
        RawPrice::MinorUnits { amount, exponent } => from_minor_units(amount, *exponent),
    }
}

/// Parses displayed price text, tolerating currency symbols, thousands
/// separators, and surrounding prose whitespace
pub fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
}

/// Converts an integer minor-unit amount to pesos ("2700" with exponent 2
/// is 27.00)
pub fn from_minor_units(amount: &str, exponent: u32) -> Option<f64> {
    let value: i64 = amount.trim().parse().ok()?;
    if value < 0 {
        return None;
    }
    let divisor = 10f64.powi(exponent as i32);
    Some(round2(value as f64 / divisor))
}

/// Resolves effective price, list price, and sale flag
///
/// A sale price is the effective price when present; otherwise the current
/// price, then the regular price. The list price is the regular price
/// clamped to never undercut the effective price, so `on_sale` can be read
/// directly off the comparison. Missing everything degrades to zero.
pub fn resolve(current: Option<f64>, regular: Option<f64>, sale: Option<f64>) -> ResolvedPrice {
    let effective = sale.or(current).or(regular).unwrap_or(0.0);
    let list = regular.unwrap_or(effective).max(effective);

    let price = round2(effective);
    let list_price = round2(list);
    ResolvedPrice {
        price,
        list_price,
        on_sale: list_price > price,
    }
}

/// Rounds to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_amount() {
        assert_eq!(parse_amount("27.0"), Some(27.0));
        assert_eq!(parse_amount("24.50"), Some(24.5));
    }

    #[test]
    fn test_parse_formatted_amount() {
        assert_eq!(parse_amount("$ 1,299.00"), Some(1299.0));
        assert_eq!(parse_amount(" 1,050 "), Some(1050.0));
    }

    #[test]
    fn test_parse_garbage_is_none() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("$ "), None);
        assert_eq!(parse_amount("precio"), None);
        assert_eq!(parse_amount("12.3.4"), None);
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(from_minor_units("2700", 2), Some(27.0));
        assert_eq!(from_minor_units("2450", 2), Some(24.5));
        assert_eq!(from_minor_units("999", 0), Some(999.0));
        assert_eq!(from_minor_units("12345", 3), Some(12.35));
    }

    #[test]
    fn test_minor_units_rejects_non_integers() {
        assert_eq!(from_minor_units("27.00", 2), None);
        assert_eq!(from_minor_units("", 2), None);
        assert_eq!(from_minor_units("-100", 2), None);
    }

    #[test]
    fn test_resolve_single_price() {
        let resolved = resolve(Some(27.0), None, None);
        assert_eq!(resolved.price, 27.0);
        assert_eq!(resolved.list_price, 27.0);
        assert!(!resolved.on_sale);
    }

    #[test]
    fn test_resolve_sale() {
        let resolved = resolve(Some(24.5), Some(30.0), Some(24.5));
        assert_eq!(resolved.price, 24.5);
        assert_eq!(resolved.list_price, 30.0);
        assert!(resolved.on_sale);
    }

    #[test]
    fn test_resolve_markup_discount_without_sale_field() {
        // Markup pages expose current and struck-through list, no sale field
        let resolved = resolve(Some(24.5), Some(30.0), None);
        assert_eq!(resolved.price, 24.5);
        assert_eq!(resolved.list_price, 30.0);
        assert!(resolved.on_sale);
    }

    #[test]
    fn test_list_never_undercuts_price() {
        let resolved = resolve(Some(25.0), Some(20.0), None);
        assert_eq!(resolved.price, 25.0);
        assert_eq!(resolved.list_price, 25.0);
        assert!(!resolved.on_sale);
    }

    #[test]
    fn test_resolve_nothing_is_zero() {
        let resolved = resolve(None, None, None);
        assert_eq!(resolved.price, 0.0);
        assert_eq!(resolved.list_price, 0.0);
        assert!(!resolved.on_sale);
    }

    #[test]
    fn test_equal_prices_are_not_a_sale() {
        let resolved = resolve(Some(30.0), Some(30.0), None);
        assert!(!resolved.on_sale);
    }

    #[test]
    fn test_amount_dispatches_on_encoding() {
        assert_eq!(amount(&RawPrice::text("$ 45.00")), Some(45.0));
        assert_eq!(amount(&RawPrice::minor_units("4500", 2)), Some(45.0));
    }
}
