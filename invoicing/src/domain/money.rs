//! Fixed-point currency amounts.
//!
//! Every amount inside the service is an integer number of minor units
//! (cents). Floating point only appears at the HTTP boundary, through
//! [`Money::from_decimal`] and [`Money::to_decimal`].

use std::fmt;
use std::ops::Neg;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

const MINOR_UNITS: i64 = 100;
const SCALE: u32 = 2;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("amount is not a finite number")]
    NotFinite,
    #[error("amount {0} is out of range")]
    OutOfRange(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    pub const fn minor_units(self) -> i64 {
        self.0
    }

    /// Converts an external decimal amount into minor units.
    ///
    /// The float is read through its shortest decimal form, so `19.995` is
    /// the decimal 19.995 rather than its binary neighbour, then scaled and
    /// rounded half away from zero. Values that do not fit in an `i64` of
    /// minor units are rejected with [`MoneyError::OutOfRange`]; they are
    /// never saturated or truncated.
    pub fn from_decimal(value: f64) -> Result<Self, MoneyError> {
        if !value.is_finite() {
            return Err(MoneyError::NotFinite);
        }
        let out_of_range = || MoneyError::OutOfRange(value.to_string());

        let decimal = Decimal::from_str(&value.to_string()).map_err(|_| out_of_range())?;
        decimal
            .checked_mul(Decimal::from(MINOR_UNITS))
            .map(|scaled| scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|rounded| rounded.to_i64())
            .map(Money)
            .ok_or_else(out_of_range)
    }

    /// Converts minor units back into a decimal amount for the HTTP boundary.
    ///
    /// `from_decimal(m.to_decimal()) == m` holds only while `|minor| <= 2^53`.
    /// Past that an `f64` cannot hold every integer, so the value comes back
    /// as the nearest representable one.
    pub fn to_decimal(self) -> f64 {
        self.0 as f64 / MINOR_UNITS as f64
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Decimal::new(self.0, SCALE))
    }
}
