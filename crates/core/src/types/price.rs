//! Indonesian rupiah amounts using decimal arithmetic.
//!
//! The REST backend is inconsistent about money: cart line prices arrive as
//! strings (`"10000"`, `"10000.00"`), aggregates and courier prices as JSON
//! numbers. [`Rupiah`] accepts both and keeps exact decimal arithmetic so
//! optimistic cart patches never drift through floating point.

use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// An amount of Indonesian rupiah.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rupiah(Decimal);

impl Rupiah {
    /// Zero rupiah.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create an amount from a decimal value.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create an amount from whole rupiah.
    #[must_use]
    pub fn from_whole(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Round to whole rupiah for APIs that take integer amounts.
    ///
    /// Saturates at the `i64` range.
    #[must_use]
    pub fn to_whole(&self) -> i64 {
        self.0
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .unwrap_or(if self.0.is_sign_negative() { i64::MIN } else { i64::MAX })
    }

    /// Multiply a unit price by a quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Format without fraction digits, e.g. `Rp20.000`.
    ///
    /// Amounts are rounded half away from zero to the nearest rupiah.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self
            .0
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        format!("{sign}Rp{}", group_thousands(&rounded.abs().trunc().to_string()))
    }

    /// Format with two fraction digits in `id-ID` style, e.g. `Rp29.000,00`.
    #[must_use]
    pub fn display_with_cents(&self) -> String {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let abs = rounded.abs();
        let whole = abs.trunc();
        let cents = ((abs - whole) * Decimal::ONE_HUNDRED).trunc();
        format!(
            "{sign}Rp{},{:0>2}",
            group_thousands(&whole.to_string()),
            cents.to_string()
        )
    }
}

/// Insert `.` between every group of three digits, counting from the right.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

impl std::fmt::Display for Rupiah {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<Decimal> for Rupiah {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Rupiah {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Rupiah {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Rupiah {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Rupiah {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Mul<u32> for Rupiah {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        self.times(rhs)
    }
}

impl Sum for Rupiah {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Rupiah::from_whole(0).display(), "Rp0");
        assert_eq!(Rupiah::from_whole(900).display(), "Rp900");
        assert_eq!(Rupiah::from_whole(9000).display(), "Rp9.000");
        assert_eq!(Rupiah::from_whole(29_000).display(), "Rp29.000");
        assert_eq!(Rupiah::from_whole(1_250_000).display(), "Rp1.250.000");
    }

    #[test]
    fn test_display_negative() {
        assert_eq!(Rupiah::from_whole(-15_000).display(), "-Rp15.000");
    }

    #[test]
    fn test_display_with_cents() {
        assert_eq!(Rupiah::from_whole(29_000).display_with_cents(), "Rp29.000,00");
        let amount = Rupiah::new(Decimal::new(1_234_505, 2));
        assert_eq!(amount.display_with_cents(), "Rp12.345,05");
    }

    #[test]
    fn test_deserialize_string_and_number() {
        let from_str: Rupiah = serde_json::from_str("\"10000.00\"").unwrap();
        let from_num: Rupiah = serde_json::from_str("10000").unwrap();
        assert_eq!(from_str, from_num);
    }

    #[test]
    fn test_to_whole_rounds() {
        assert_eq!(Rupiah::new(Decimal::new(1_000_050, 2)).to_whole(), 10_001);
        assert_eq!(Rupiah::from_whole(9000).to_whole(), 9000);
    }

    #[test]
    fn test_arithmetic() {
        let price = Rupiah::from_whole(10_000);
        assert_eq!(price * 2, Rupiah::from_whole(20_000));
        let total: Rupiah = [price, Rupiah::from_whole(9_000)].into_iter().sum();
        assert_eq!(total, Rupiah::from_whole(19_000));
        assert_eq!(total - price, Rupiah::from_whole(9_000));
    }
}
