//! Money types with exact integer arithmetic
//!
//! Loan amounts are always whole minor currency units (cents, rupiah, ...).
//! This module wraps them in a type-safe `Money` value and provides the
//! `Rate` type used to mark a principal up by its interest, using
//! rust_decimal so the rate itself never goes through floating point.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Overflow during calculation")]
    Overflow,
}

/// A monetary amount in minor currency units
///
/// The system is single-currency, so no currency tag is carried. Amounts
/// are signed: outstanding balances go negative on overpayment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// The zero amount
    pub const ZERO: Money = Money(0);

    /// Creates Money from an integer amount in minor units
    pub const fn from_minor(minor_units: i64) -> Self {
        Self(minor_units)
    }

    /// Returns the amount in minor units
    pub const fn minor_units(&self) -> i64 {
        self.0
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns true if the amount is strictly positive
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Returns true if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Checked addition
    pub fn checked_add(&self, other: Money) -> Result<Money, MoneyError> {
        self.0.checked_add(other.0).map(Money).ok_or(MoneyError::Overflow)
    }

    /// Checked subtraction
    pub fn checked_sub(&self, other: Money) -> Result<Money, MoneyError> {
        self.0.checked_sub(other.0).map(Money).ok_or(MoneyError::Overflow)
    }

    /// Multiplies by an integer count (e.g. installments times weeks)
    pub fn checked_mul(&self, factor: i64) -> Result<Money, MoneyError> {
        self.0.checked_mul(factor).map(Money).ok_or(MoneyError::Overflow)
    }

    /// Multiplication clamped to the representable range
    pub fn saturating_mul(&self, factor: i64) -> Money {
        Money(self.0.saturating_mul(factor))
    }

    /// Subtraction clamped to the representable range
    pub fn saturating_sub(&self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0))
    }

    /// Splits the amount into `parts` equal shares, rounding down
    ///
    /// The remainder is dropped, never distributed: this is the fixed
    /// installment size, not an allocation.
    pub fn split_floor(&self, parts: u32) -> Result<Money, MoneyError> {
        if parts == 0 {
            return Err(MoneyError::DivisionByZero);
        }
        Ok(Money(self.0.div_euclid(i64::from(parts))))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Money {
    fn from(minor_units: i64) -> Self {
        Money(minor_units)
    }
}

impl From<Money> for i64 {
    fn from(money: Money) -> i64 {
        money.0
    }
}

/// Represents a percentage rate (e.g., interest rate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rate {
    /// The rate as a decimal (e.g., 0.10 for 10%)
    value: Decimal,
}

impl Rate {
    /// Creates a rate from a decimal value (e.g., 0.10 for 10%)
    pub fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Returns the rate as a decimal
    pub fn as_decimal(&self) -> Decimal {
        self.value
    }

    /// Returns the rate as a percentage
    pub fn as_percentage(&self) -> Decimal {
        self.value * dec!(100)
    }

    /// Returns true if the rate is strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.value > Decimal::ZERO
    }

    /// Marks `principal` up by this rate: `ceil(principal * (1 + rate))`
    ///
    /// Any fractional minor unit is rounded up, so the result never
    /// under-collects.
    pub fn mark_up(&self, principal: Money) -> Result<Money, MoneyError> {
        let factor = Decimal::ONE
            .checked_add(self.value)
            .ok_or(MoneyError::Overflow)?;
        let gross = Decimal::from(principal.minor_units())
            .checked_mul(factor)
            .ok_or(MoneyError::Overflow)?;

        gross
            .ceil()
            .to_i64()
            .map(Money::from_minor)
            .ok_or(MoneyError::Overflow)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage().round_dp(4))
    }
}
