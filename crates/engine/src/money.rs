use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};

/// Signed money amount represented as **integer cents**.
///
/// Use this type for **all** monetary values in the engine (transaction
/// amounts, shares, relationship balances) to avoid floating-point drift.
///
/// The value is signed:
/// - positive = owed / credit
/// - negative = owing / debit
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[must_use]
    pub const fn abs(self) -> MoneyCents {
        MoneyCents(self.0.abs())
    }

    /// Splits the amount into `n` even parts.
    ///
    /// Returns `(base, residual)` where `base * n + residual == self` exactly.
    /// The residual is whatever integer division leaves over (`|residual| <
    /// n`); the caller decides who absorbs it. Returns `None` when `n == 0`.
    #[must_use]
    pub fn div_even(self, n: usize) -> Option<(MoneyCents, MoneyCents)> {
        if n == 0 {
            return None;
        }
        let n = n as i64;
        Some((MoneyCents(self.0 / n), MoneyCents(self.0 % n)))
    }

    /// Computes `pct` percent of the amount, rounded to the nearest cent
    /// (half away from zero).
    ///
    /// The percentage is taken as given; callers validate ranges.
    #[must_use]
    pub fn percent_of(self, pct: f64) -> MoneyCents {
        MoneyCents((self.0 as f64 * pct / 100.0).round() as i64)
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_add(rhs.0).map(MoneyCents)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_sub(rhs.0).map(MoneyCents)
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}{units}.{cents:02}")
    }
}

impl From<i64> for MoneyCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyCents> for i64 {
    fn from(value: MoneyCents) -> Self {
        value.0
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 + rhs.0)
    }
}

impl AddAssign for MoneyCents {
    fn add_assign(&mut self, rhs: MoneyCents) {
        self.0 += rhs.0;
    }
}

impl Sub for MoneyCents {
    type Output = MoneyCents;

    fn sub(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 - rhs.0)
    }
}

impl SubAssign for MoneyCents {
    fn sub_assign(&mut self, rhs: MoneyCents) {
        self.0 -= rhs.0;
    }
}

impl Neg for MoneyCents {
    type Output = MoneyCents;

    fn neg(self) -> Self::Output {
        MoneyCents(-self.0)
    }
}

impl Sum for MoneyCents {
    fn sum<I: Iterator<Item = MoneyCents>>(iter: I) -> Self {
        MoneyCents(iter.map(|m| m.0).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_decimal() {
        assert_eq!(MoneyCents::new(0).to_string(), "0.00");
        assert_eq!(MoneyCents::new(1).to_string(), "0.01");
        assert_eq!(MoneyCents::new(10).to_string(), "0.10");
        assert_eq!(MoneyCents::new(1050).to_string(), "10.50");
        assert_eq!(MoneyCents::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn div_even_is_exact() {
        let (base, residual) = MoneyCents::new(10000).div_even(3).unwrap();
        assert_eq!(base.cents(), 3333);
        assert_eq!(residual.cents(), 1);
        assert_eq!(base.cents() * 3 + residual.cents(), 10000);
    }

    #[test]
    fn div_even_rejects_zero_parts() {
        assert!(MoneyCents::new(100).div_even(0).is_none());
    }

    #[test]
    fn percent_rounds_half_away_from_zero() {
        // 33.3% of 250.00 = 83.25 exactly
        assert_eq!(MoneyCents::new(25000).percent_of(33.3).cents(), 8325);
        // 33.335% of 100.00 = 33.335 -> 33.34
        assert_eq!(MoneyCents::new(10000).percent_of(33.335).cents(), 3334);
        assert_eq!(MoneyCents::new(10000).percent_of(0.0).cents(), 0);
    }

    #[test]
    fn sum_over_iterator() {
        let total: MoneyCents = [100, 200, 300].map(MoneyCents::new).into_iter().sum();
        assert_eq!(total.cents(), 600);
    }
}
