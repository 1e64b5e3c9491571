use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};
use std::str::FromStr;

/// Money type with 2 decimal places precision for cent-level accuracy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);
    pub const ONE: Money = Money(Decimal::ONE);
    /// one cent, the default comparison epsilon for settled-vs-open decisions
    pub const CENT: Money = Money(Decimal::from_parts(1, 0, 0, false, 2));

    /// create from decimal
    pub fn from_decimal(d: Decimal) -> Self {
        Money(d.round_dp(2))
    }

    /// create from string with exact parsing
    pub fn from_str_exact(s: &str) -> Result<Self, rust_decimal::Error> {
        Ok(Money(Decimal::from_str(s)?.round_dp(2)))
    }

    /// create from integer amount (dollars, euros, etc)
    pub fn from_major(amount: i64) -> Self {
        Money(Decimal::from(amount))
    }

    /// create from minor amount (cents)
    pub fn from_minor(amount: i64) -> Self {
        Money(Decimal::from(amount) / Decimal::from(100))
    }

    /// get underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// round to specified decimal places
    pub fn round_dp(&self, dp: u32) -> Self {
        Money(self.0.round_dp(dp))
    }

    /// check if zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// check if strictly positive
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// check if negative
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// absolute value
    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// minimum of two values
    pub fn min(self, other: Self) -> Self {
        Money(self.0.min(other.0))
    }

    /// maximum of two values
    pub fn max(self, other: Self) -> Self {
        Money(self.0.max(other.0))
    }

    /// subtraction floored at zero
    pub fn saturating_sub(self, other: Self) -> Self {
        (self - other).max(Money::ZERO)
    }

    /// equal within the given epsilon
    pub fn approx_eq(self, other: Self, epsilon: Money) -> bool {
        (self - other).abs() <= epsilon
    }

    /// greater-or-equal within the given epsilon
    pub fn approx_gte(self, other: Self, epsilon: Money) -> bool {
        self >= other - epsilon
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::from_str_exact(s)
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Money::from_decimal(d)
    }
}

impl From<i32> for Money {
    fn from(i: i32) -> Self {
        Money::from_major(i as i64)
    }
}

impl From<u32> for Money {
    fn from(i: u32) -> Self {
        Money::from_major(i as i64)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money((self.0 + other.0).round_dp(2))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 = (self.0 + other.0).round_dp(2);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money((self.0 - other.0).round_dp(2))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Money) {
        self.0 = (self.0 - other.0).round_dp(2);
    }
}

impl Mul<Decimal> for Money {
    type Output = Money;

    fn mul(self, other: Decimal) -> Money {
        Money((self.0 * other).round_dp(2))
    }
}

impl Div<Decimal> for Money {
    type Output = Money;

    fn div(self, other: Decimal) -> Money {
        Money((self.0 / other).round_dp(2))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

/// rate type for percentages and ratios
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Rate(Decimal);

impl Rate {
    pub const ZERO: Rate = Rate(Decimal::ZERO);
    pub const ONE: Rate = Rate(Decimal::ONE);

    /// create from decimal (e.g., 0.05 for 5%)
    pub fn from_decimal(d: Decimal) -> Self {
        Rate(d)
    }

    /// create from percentage (e.g., 5 for 5%)
    pub fn from_percentage(p: u32) -> Self {
        Rate(Decimal::from(p) / Decimal::from(100))
    }

    /// ratio of part to whole, clamped to [0, 1]; whole of zero yields zero
    pub fn from_ratio(part: Money, whole: Money) -> Self {
        if whole.is_zero() {
            return Rate::ZERO;
        }
        let ratio = part.as_decimal() / whole.as_decimal();
        Rate(ratio.clamp(Decimal::ZERO, Decimal::ONE))
    }

    /// get as decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// get as percentage, rounded to 2 decimal places
    pub fn as_percentage(&self) -> Decimal {
        (self.0 * Decimal::from(100)).round_dp(2)
    }

    /// complement within 1 (e.g., remainder of a percent partition)
    pub fn complement(&self) -> Rate {
        Rate((Decimal::ONE - self.0).max(Decimal::ZERO))
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage())
    }
}

impl From<Decimal> for Rate {
    fn from(d: Decimal) -> Self {
        Rate::from_decimal(d)
    }
}

impl Add for Rate {
    type Output = Rate;

    fn add(self, other: Rate) -> Rate {
        Rate(self.0 + other.0)
    }
}

impl Sub for Rate {
    type Output = Rate;

    fn sub(self, other: Rate) -> Rate {
        Rate((self.0 - other.0).max(Decimal::ZERO))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_precision() {
        let m = Money::from_str_exact("100.456").unwrap();
        assert_eq!(m.to_string(), "100.46"); // rounded to cents
    }

    #[test]
    fn test_cent_epsilon() {
        let scheduled = Money::from_major(100);
        let paid = Money::from_str_exact("99.995").unwrap();
        assert!(paid.approx_gte(scheduled, Money::CENT));
        assert!(!Money::from_major(99).approx_gte(scheduled, Money::CENT));
    }

    #[test]
    fn test_saturating_sub() {
        let a = Money::from_major(50);
        let b = Money::from_major(80);
        assert_eq!(a.saturating_sub(b), Money::ZERO);
        assert_eq!(b.saturating_sub(a), Money::from_major(30));
    }

    #[test]
    fn test_sum() {
        let total: Money = [Money::from_major(10), Money::from_minor(250), Money::ZERO]
            .into_iter()
            .sum();
        assert_eq!(total, Money::from_str_exact("12.50").unwrap());
    }

    #[test]
    fn test_ratio_clamps() {
        let half = Rate::from_ratio(Money::from_major(50), Money::from_major(100));
        assert_eq!(half.as_percentage(), dec!(50.00));

        let over = Rate::from_ratio(Money::from_major(150), Money::from_major(100));
        assert_eq!(over.as_percentage(), dec!(100.00));

        assert_eq!(Rate::from_ratio(Money::from_major(5), Money::ZERO), Rate::ZERO);
    }

    #[test]
    fn test_complement() {
        let r = Rate::from_percentage(30);
        assert_eq!(r.complement().as_percentage(), dec!(70.00));
        assert_eq!(Rate::ONE.complement(), Rate::ZERO);
    }
}
