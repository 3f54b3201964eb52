//! Field-level parsing for interactive input.
//!
//! Each parser turns one line of user text into a typed value or a
//! [`ValidationError`]; callers re-prompt on error.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;

use super::terms::{has_sub_cent_digits, MAX_TERM_YEARS};
use crate::types::{Money, Rate};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("'{0}' is not a whole number")]
    NotAWholeNumber(String),

    #[error("'{0}' has more than two decimal places")]
    SubCentAmount(String),

    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("down payment must be at least 0 and less than the property value ({property_value})")]
    DownPaymentOutOfRange { property_value: Money },

    #[error("annual interest rate must be greater than 0% and at most 100%")]
    RateOutOfRange,

    #[error("loan term must be at most {max} years")]
    TermTooLong { max: u32 },
}

fn parse_decimal(text: &str) -> Result<Decimal, ValidationError> {
    let trimmed = text.trim();
    trimmed
        .parse::<Decimal>()
        .map_err(|_| ValidationError::NotANumber(trimmed.to_string()))
}

fn parse_money(text: &str) -> Result<Money, ValidationError> {
    let value = parse_decimal(text)?;
    if has_sub_cent_digits(value) {
        return Err(ValidationError::SubCentAmount(text.trim().to_string()));
    }
    Ok(value)
}

/// Property value in currency units; must be positive.
pub fn parse_property_value(text: &str) -> Result<Money, ValidationError> {
    let value = parse_money(text)?;
    if value <= Decimal::ZERO {
        return Err(ValidationError::NotPositive {
            field: "property value",
        });
    }
    Ok(value)
}

/// Down payment; `0 <= down_payment < property_value`.
pub fn parse_down_payment(text: &str, property_value: Money) -> Result<Money, ValidationError> {
    let value = parse_money(text)?;
    if value < Decimal::ZERO || value >= property_value {
        return Err(ValidationError::DownPaymentOutOfRange { property_value });
    }
    Ok(value)
}

/// Annual rate entered as a percentage (`5` for 5%), returned as a fraction.
pub fn parse_rate_percent(text: &str) -> Result<Rate, ValidationError> {
    let rate = parse_decimal(text)? / dec!(100);
    if rate <= Decimal::ZERO || rate > Decimal::ONE {
        return Err(ValidationError::RateOutOfRange);
    }
    Ok(rate)
}

/// Loan term in whole years.
pub fn parse_term_years(text: &str) -> Result<u32, ValidationError> {
    let trimmed = text.trim();
    let years: i64 = trimmed
        .parse()
        .map_err(|_| ValidationError::NotAWholeNumber(trimmed.to_string()))?;
    if years <= 0 {
        return Err(ValidationError::NotPositive { field: "loan term" });
    }
    if years > i64::from(MAX_TERM_YEARS) {
        return Err(ValidationError::TermTooLong {
            max: MAX_TERM_YEARS,
        });
    }
    Ok(years as u32)
}
