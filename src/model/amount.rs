//! Amount type for handling monetary values.
//!
//! This module provides the `Amount` type which wraps `Decimal`. There is a single implicit
//! currency, so an `Amount` is only a number; the currency symbol is supplied when formatting for
//! display.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;
use tracing::warn;

/// Represents a spent amount.
///
/// Equality and ordering are numeric, so `12.5` and `12.50` are the same amount.
///
/// # Examples
///
/// ```
/// # use expense_tracker::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("1,250.50").unwrap();
/// assert_eq!(amount.to_string(), "1250.5");
/// assert_eq!(amount.display_with("₹"), "₹1,250.50");
/// ```
///
/// Amounts add up:
/// ```
/// # use expense_tracker::model::Amount;
/// # use std::str::FromStr;
/// let total: Amount = ["10", "20.25"].iter().map(|s| Amount::from_str(s).unwrap()).sum();
/// assert_eq!(total, Amount::from_str("30.25").unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Formats the amount with a currency symbol, thousands separators and two decimal places,
    /// e.g. `-₹60,000.00`.
    pub fn display_with(&self, symbol: &str) -> String {
        let (sign, num) = if self.0.is_sign_negative() && !self.0.is_zero() {
            ("-", self.0.abs())
        } else {
            ("", self.0)
        };
        format!(
            "{sign}{symbol}{}",
            format_num::format_num!(",.2", num.to_f64().unwrap_or_default())
        )
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    /// Parses a plain number, optionally with thousands separators. An empty string is zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Amount::default());
        }
        let without_commas = trimmed.replace(',', "");
        let value = Decimal::from_str(&without_commas).map_err(AmountError)?;
        Ok(Amount(value))
    }
}

/// Displays the bare number without trailing zeros, e.g. `100` or `12.5`.
impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

/// Saturates at the largest or smallest representable amount instead of overflowing.
impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        match self.0.checked_add(rhs.0) {
            Some(value) => Amount(value),
            None => {
                warn!("Adding {rhs} to {self} overflowed, using the largest possible amount");
                Amount(self.0.saturating_add(rhs.0))
            }
        }
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

impl Serialize for Amount {
    /// Serializes as a JSON number carrying every digit of the decimal, without trailing zeros.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        rust_decimal::serde::arbitrary_precision::serialize(&self.0.normalize(), serializer)
    }
}

impl<'de> Deserialize<'de> for Amount {
    /// Accepts a number, a numeric string or null. Values that are not numeric are read as zero
    /// rather than failing the whole collection.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a number, a numeric string or null")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        Ok(Amount(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(Amount(Decimal::from(v)))
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<Amount, E> {
        match Decimal::from_i128(v) {
            Some(value) => Ok(Amount(value)),
            None => {
                warn!("Treating amount {v} as zero: out of range");
                Ok(Amount::ZERO)
            }
        }
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Amount, E> {
        match Decimal::from_u128(v) {
            Some(value) => Ok(Amount(value)),
            None => {
                warn!("Treating amount {v} as zero: out of range");
                Ok(Amount::ZERO)
            }
        }
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
        // f64 Display gives the shortest representation that round-trips, never an exponent.
        match Decimal::from_str(&v.to_string()) {
            Ok(value) => Ok(Amount(value)),
            Err(e) => {
                warn!("Treating amount {v} as zero: {e}");
                Ok(Amount::ZERO)
            }
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        match Amount::from_str(v) {
            Ok(amount) => Ok(amount),
            Err(e) => {
                warn!("Treating amount '{v}' as zero: {e}");
                Ok(Amount::ZERO)
            }
        }
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Amount, E> {
        warn!("Treating amount {v} as zero");
        Ok(Amount::ZERO)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Amount, E> {
        Ok(Amount::ZERO)
    }

    fn visit_none<E: de::Error>(self) -> Result<Amount, E> {
        Ok(Amount::ZERO)
    }

    /// Numbers that do not fit an `f64` exactly arrive as a map holding their digits.
    fn visit_map<A: de::MapAccess<'de>>(self, map: A) -> Result<Amount, A::Error> {
        rust_decimal::serde::arbitrary_precision::deserialize(de::value::MapAccessDeserializer::new(
            map,
        ))
        .map(Amount)
    }
}
