//! Money type with minor-unit precision and currency.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are stored as an integer count of the currency's minor unit
//! (cents for USD); decimal intermediates use `rust_decimal::Decimal` and
//! are rounded exactly once per calculation chain with banker's rounding
//! (`RoundingStrategy::MidpointNearestEven`).

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// ISO 4217 currency codes supported by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US Dollar
    Usd,
    /// Euro
    Eur,
    /// Pound Sterling
    Gbp,
    /// Singapore Dollar
    Sgd,
    /// Indonesian Rupiah
    Idr,
    /// Japanese Yen
    Jpy,
}

impl Currency {
    /// Number of decimal places in the currency's minor unit.
    #[must_use]
    pub const fn exponent(self) -> u32 {
        match self {
            Self::Usd | Self::Eur | Self::Gbp | Self::Sgd | Self::Idr => 2,
            Self::Jpy => 0,
        }
    }

    /// Returns the ISO 4217 code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Sgd => "SGD",
            Self::Idr => "IDR",
            Self::Jpy => "JPY",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            "GBP" => Ok(Self::Gbp),
            "SGD" => Ok(Self::Sgd),
            "IDR" => Ok(Self::Idr),
            "JPY" => Ok(Self::Jpy),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}

/// Errors that can occur during money arithmetic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    /// Two amounts in different currencies were combined.
    #[error("Currency mismatch: expected {expected}, got {actual}")]
    CurrencyMismatch {
        /// The currency of the left-hand operand.
        expected: Currency,
        /// The currency of the right-hand operand.
        actual: Currency,
    },

    /// The result does not fit the minor-unit representation.
    #[error("Amount out of representable range")]
    AmountOutOfRange,
}

/// A monetary amount: an integer count of minor units plus a currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    minor: i64,
    currency: Currency,
}

impl Money {
    /// Creates an amount from a count of minor units (e.g., cents).
    #[must_use]
    pub const fn from_minor(minor: i64, currency: Currency) -> Self {
        Self { minor, currency }
    }

    /// Creates a zero amount in the specified currency.
    #[must_use]
    pub const fn zero(currency: Currency) -> Self {
        Self { minor: 0, currency }
    }

    /// Creates an amount from a decimal value, rounding half-to-even to the
    /// currency's minor-unit precision.
    pub fn from_decimal(amount: Decimal, currency: Currency) -> Result<Self, MoneyError> {
        let scale = Decimal::from(10i64.pow(currency.exponent()));
        let minor = amount
            .checked_mul(scale)
            .ok_or(MoneyError::AmountOutOfRange)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
            .to_i64()
            .ok_or(MoneyError::AmountOutOfRange)?;
        Ok(Self { minor, currency })
    }

    /// Returns the amount as a decimal in major units (e.g., `125.50`).
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.minor, self.currency.exponent())
    }

    /// Returns the raw minor-unit count.
    #[must_use]
    pub const fn minor_units(self) -> i64 {
        self.minor
    }

    /// Returns the currency.
    #[must_use]
    pub const fn currency(self) -> Currency {
        self.currency
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.minor == 0
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.minor < 0
    }

    /// Returns true if the amount is strictly positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.minor > 0
    }

    fn ensure_same_currency(self, other: Self) -> Result<(), MoneyError> {
        if self.currency == other.currency {
            Ok(())
        } else {
            Err(MoneyError::CurrencyMismatch {
                expected: self.currency,
                actual: other.currency,
            })
        }
    }

    /// Adds two amounts of the same currency.
    pub fn try_add(self, other: Self) -> Result<Self, MoneyError> {
        self.ensure_same_currency(other)?;
        let minor = self
            .minor
            .checked_add(other.minor)
            .ok_or(MoneyError::AmountOutOfRange)?;
        Ok(Self { minor, currency: self.currency })
    }

    /// Subtracts two amounts of the same currency; the result may be negative.
    pub fn try_sub(self, other: Self) -> Result<Self, MoneyError> {
        self.ensure_same_currency(other)?;
        let minor = self
            .minor
            .checked_sub(other.minor)
            .ok_or(MoneyError::AmountOutOfRange)?;
        Ok(Self { minor, currency: self.currency })
    }

    /// Subtracts two amounts of the same currency, clamping the result at
    /// zero. Used where the domain forbids negative values (balance due).
    pub fn saturating_sub(self, other: Self) -> Result<Self, MoneyError> {
        let diff = self.try_sub(other)?;
        Ok(if diff.is_negative() {
            Self::zero(self.currency)
        } else {
            diff
        })
    }

    /// Multiplies by a decimal scalar, rounding half-to-even once on the
    /// minor-unit result.
    pub fn mul_decimal(self, factor: Decimal) -> Result<Self, MoneyError> {
        let minor = Decimal::from(self.minor)
            .checked_mul(factor)
            .ok_or(MoneyError::AmountOutOfRange)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
            .to_i64()
            .ok_or(MoneyError::AmountOutOfRange)?;
        Ok(Self { minor, currency: self.currency })
    }

    /// Returns `rate` percent of this amount (`rate` on a 0-100 scale),
    /// rounding half-to-even once on the minor-unit result.
    pub fn percent(self, rate: Decimal) -> Result<Self, MoneyError> {
        let minor = Decimal::from(self.minor)
            .checked_mul(rate)
            .ok_or(MoneyError::AmountOutOfRange)?
            .checked_div(Decimal::ONE_HUNDRED)
            .ok_or(MoneyError::AmountOutOfRange)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
            .to_i64()
            .ok_or(MoneyError::AmountOutOfRange)?;
        Ok(Self { minor, currency: self.currency })
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.to_decimal(), self.currency)
    }
}
