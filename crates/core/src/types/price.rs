//! Type-safe price representation using decimal arithmetic.
//!
//! Amounts are held as [`Decimal`] in the currency's standard unit (rupees,
//! not paise). Display follows the storefront's formatting: a currency symbol
//! followed by the grouped amount, with Indian digit grouping for INR
//! (`₹1,23,456`) and fractional digits only when non-zero (`₹1,499.5`).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::quantity::Quantity;

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., rupees, not paise).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in the store currency (INR).
    #[must_use]
    pub const fn inr(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::INR)
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Price of `quantity` units at this unit price.
    #[must_use]
    pub fn line_total(&self, quantity: Quantity) -> Self {
        Self::new(
            self.amount.saturating_mul(Decimal::from(quantity.get())),
            self.currency_code,
        )
    }

    /// Add another price of the same currency.
    ///
    /// Returns `None` when the currencies differ.
    #[must_use]
    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        (self.currency_code == other.currency_code)
            .then(|| Self::new(self.amount.saturating_add(other.amount), self.currency_code))
    }

    /// Format for display (e.g., "₹1,23,456" or "$1,499.5").
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self.amount.round_dp(2).normalize();
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let digits = rounded.abs().to_string();
        let (whole, fraction) = digits
            .split_once('.')
            .map_or((digits.as_str(), None), |(w, f)| (w, Some(f)));

        let grouped = group_digits(whole, self.currency_code == CurrencyCode::INR);
        let symbol = self.currency_code.symbol();
        fraction.map_or_else(
            || format!("{sign}{symbol}{grouped}"),
            |f| format!("{sign}{symbol}{grouped}.{f}"),
        )
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

/// Insert thousands separators. Indian grouping puts the first comma after
/// three digits and every two digits after that.
fn group_digits(digits: &str, indian: bool) -> String {
    let mut reversed = String::with_capacity(digits.len() + digits.len() / 2);
    for (i, c) in digits.chars().rev().enumerate() {
        let boundary = if indian {
            i == 3 || (i > 3 && (i - 3) % 2 == 0)
        } else {
            i > 0 && i % 3 == 0
        };
        if boundary {
            reversed.push(',');
        }
        reversed.push(c);
    }
    reversed.chars().rev().collect()
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::INR => "₹",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_indian_grouping() {
        assert_eq!(Price::inr(Decimal::new(123_456, 0)).display(), "₹1,23,456");
        assert_eq!(Price::inr(Decimal::new(12_345_678, 0)).display(), "₹1,23,45,678");
        assert_eq!(Price::inr(Decimal::new(999, 0)).display(), "₹999");
    }

    #[test]
    fn test_display_drops_trailing_zeros() {
        assert_eq!(Price::inr(Decimal::new(149_950, 2)).display(), "₹1,499.5");
        assert_eq!(Price::inr(Decimal::new(149_900, 2)).display(), "₹1,499");
        assert_eq!(Price::zero(CurrencyCode::INR).display(), "₹0");
    }

    #[test]
    fn test_display_western_grouping() {
        let price = Price::new(Decimal::new(123_456_789, 2), CurrencyCode::USD);
        assert_eq!(price.display(), "$1,234,567.89");
    }

    #[test]
    fn test_line_total_and_add() {
        let unit = Price::inr(Decimal::new(2_500, 1));
        let Ok(three) = Quantity::new(3) else {
            panic!("3 is a valid quantity");
        };
        let total = unit.line_total(three);
        assert_eq!(total.amount, Decimal::new(750, 0));

        let usd = Price::new(Decimal::ONE, CurrencyCode::USD);
        assert_eq!(total.checked_add(&usd), None);
        assert_eq!(
            total.checked_add(&unit).map(|p| p.amount),
            Some(Decimal::new(1_000, 0))
        );
    }
}
