//! Invoice domain types: line items and discounts.

use facture_shared::types::{Currency, LineItemId, Money, MoneyError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::invoice::error::InvoiceError;

/// Input for a single invoice line item.
///
/// This is the input format for creating or replacing line items; it is
/// validated into a [`LineItem`] before entering any calculation.
#[derive(Debug, Clone)]
pub struct LineItemInput {
    /// What is being billed.
    pub description: String,
    /// Quantity (must be positive; fractional quantities are allowed).
    pub quantity: Decimal,
    /// Unit price in major units (must be non-negative).
    pub rate: Decimal,
}

impl LineItemInput {
    /// Validates the input and produces a [`LineItem`] priced in the
    /// invoice currency.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty description, a non-positive
    /// quantity, or a negative rate.
    pub fn validate(&self, currency: Currency) -> Result<LineItem, InvoiceError> {
        if self.description.trim().is_empty() {
            return Err(InvoiceError::EmptyDescription);
        }
        if self.quantity <= Decimal::ZERO {
            return Err(InvoiceError::NonPositiveQuantity);
        }
        if self.rate < Decimal::ZERO {
            return Err(InvoiceError::NegativeRate);
        }
        Ok(LineItem {
            id: LineItemId::new(),
            description: self.description.trim().to_string(),
            quantity: self.quantity,
            rate: Money::from_decimal(self.rate, currency)?,
        })
    }
}

/// A validated invoice line item.
///
/// Owned exclusively by its parent invoice and only created through
/// [`LineItemInput::validate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Unique identifier.
    pub id: LineItemId,
    /// What is being billed.
    pub description: String,
    /// Quantity.
    pub quantity: Decimal,
    /// Unit price.
    pub rate: Money,
}

impl LineItem {
    /// The line amount: `quantity x rate`, rounded half-to-even once to the
    /// currency's minor unit.
    pub fn amount(&self) -> Result<Money, MoneyError> {
        self.rate.mul_decimal(self.quantity)
    }
}

/// Discount interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DiscountKind {
    /// A fixed amount in the invoice currency.
    Fixed,
    /// A percentage of the subtotal (0-100 scale).
    Percentage,
}

impl DiscountKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fixed => "FIXED",
            Self::Percentage => "PERCENTAGE",
        }
    }

    /// Parses a kind from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "FIXED" => Some(Self::Fixed),
            "PERCENTAGE" => Some(Self::Percentage),
            _ => None,
        }
    }
}

impl fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A discount applied to an invoice subtotal.
///
/// Percentage values above 100 are accepted but the effective discount
/// caps at the subtotal; the charge calculation never produces a negative
/// total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountSpec {
    /// How `value` is interpreted.
    pub kind: DiscountKind,
    /// The discount value (amount or percentage; must be non-negative).
    pub value: Decimal,
}

impl DiscountSpec {
    /// A no-op discount.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            kind: DiscountKind::Fixed,
            value: Decimal::ZERO,
        }
    }

    /// Validates the discount value.
    pub fn validate(&self) -> Result<(), InvoiceError> {
        if self.value < Decimal::ZERO {
            return Err(InvoiceError::NegativeDiscountValue);
        }
        Ok(())
    }
}

impl Default for DiscountSpec {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn input(description: &str, quantity: Decimal, rate: Decimal) -> LineItemInput {
        LineItemInput {
            description: description.to_string(),
            quantity,
            rate,
        }
    }

    #[test]
    fn test_line_item_validate_ok() {
        let item = input("Consulting", dec!(2), dec!(50.00))
            .validate(Currency::Usd)
            .unwrap();
        assert_eq!(item.description, "Consulting");
        assert_eq!(item.rate.minor_units(), 5000);
        assert_eq!(item.amount().unwrap().minor_units(), 10000);
    }

    #[test]
    fn test_line_item_empty_description() {
        let result = input("   ", dec!(1), dec!(10)).validate(Currency::Usd);
        assert_eq!(result.unwrap_err(), InvoiceError::EmptyDescription);
    }

    #[test]
    fn test_line_item_non_positive_quantity() {
        let result = input("Widget", dec!(0), dec!(10)).validate(Currency::Usd);
        assert_eq!(result.unwrap_err(), InvoiceError::NonPositiveQuantity);

        let result = input("Widget", dec!(-1), dec!(10)).validate(Currency::Usd);
        assert_eq!(result.unwrap_err(), InvoiceError::NonPositiveQuantity);
    }

    #[test]
    fn test_line_item_negative_rate() {
        let result = input("Widget", dec!(1), dec!(-0.01)).validate(Currency::Usd);
        assert_eq!(result.unwrap_err(), InvoiceError::NegativeRate);
    }

    #[test]
    fn test_line_item_zero_rate_allowed() {
        let item = input("Goodwill credit", dec!(1), dec!(0))
            .validate(Currency::Usd)
            .unwrap();
        assert!(item.amount().unwrap().is_zero());
    }

    #[test]
    fn test_fractional_quantity_amount() {
        // 1.5 x 33.33 = 49.995 -> 50.00 (half-to-even on the cent)
        let item = input("Hours", dec!(1.5), dec!(33.33))
            .validate(Currency::Usd)
            .unwrap();
        assert_eq!(item.amount().unwrap().minor_units(), 5000);
    }

    #[test]
    fn test_discount_kind_round_trip() {
        assert_eq!(DiscountKind::parse("fixed"), Some(DiscountKind::Fixed));
        assert_eq!(
            DiscountKind::parse("PERCENTAGE"),
            Some(DiscountKind::Percentage)
        );
        assert_eq!(DiscountKind::parse("flat"), None);
    }

    #[test]
    fn test_discount_validate() {
        assert!(DiscountSpec::none().validate().is_ok());
        let negative = DiscountSpec {
            kind: DiscountKind::Percentage,
            value: dec!(-5),
        };
        assert_eq!(
            negative.validate().unwrap_err(),
            InvoiceError::NegativeDiscountValue
        );
    }
}
