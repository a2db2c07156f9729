//! Fixed-point money: integer minor units, two decimal places.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A monetary amount in minor units (e.g. cents).
///
/// Order-item prices are snapshotted as `Money` at order-creation time and are
/// immutable afterwards; totals are always recomputed from line items.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// From minor units (e.g. `1250` == `12.50`).
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// From a major amount and a 0..=99 fractional part.
    pub fn from_parts(major: i64, cents: u8) -> Result<Self, DomainError> {
        if cents > 99 {
            return Err(DomainError::invalid_argument(
                "cents part must be in 0..=99",
            ));
        }
        let cents = i64::from(cents);
        let minor = if major < 0 {
            major * 100 - cents
        } else {
            major * 100 + cents
        };
        Ok(Self(minor))
    }

    pub const fn minor_units(&self) -> i64 {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Line-total helper: unit price times quantity.
    pub fn times(&self, quantity: u32) -> Money {
        Money(self.0 * i64::from(quantity))
    }
}

impl core::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl core::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = DomainError;

    /// Parses `"12.50"`, `"12.5"`, `"12"` or `"-3.07"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || DomainError::invalid_argument(format!("not a money amount: {s:?}"));

        let (sign, rest) = match s.strip_prefix('-') {
            Some(rest) => (-1i64, rest),
            None => (1i64, s),
        };

        let (major_s, cents) = match rest.split_once('.') {
            None => (rest, 0i64),
            Some((major_s, frac)) => {
                if frac.is_empty() || frac.len() > 2 || !frac.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(bad());
                }
                let mut cents: i64 = frac.parse().map_err(|_| bad())?;
                if frac.len() == 1 {
                    cents *= 10;
                }
                (major_s, cents)
            }
        };

        if major_s.is_empty() || !major_s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        let major: i64 = major_s.parse().map_err(|_| bad())?;

        Ok(Money(sign * (major * 100 + cents)))
    }
}
