use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::payment::COMPOUNDING_FREQUENCY;
use crate::error::MortgageError;
use crate::types::{Money, Rate};
use crate::MortgageResult;

/// Longest loan term accepted: the period count must fit in a `u32`.
pub const MAX_TERM_YEARS: u32 = u32::MAX / COMPOUNDING_FREQUENCY;

/// Down payment share below which lenders usually require mortgage insurance.
pub(crate) const CONVENTIONAL_DOWN_PAYMENT: Rate = dec!(0.20);

/// Raw description of a property purchase as supplied by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageInput {
    /// Purchase price of the property.
    pub property_value: Money,
    /// Cash paid up front; the rest is borrowed.
    pub down_payment: Money,
    /// Annual interest rate as a decimal fraction (0.05 = 5%).
    pub annual_rate: Rate,
    /// Loan term in whole years.
    pub term_years: u32,
    /// Date of the first monthly payment, if the schedule should carry dates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_payment_date: Option<NaiveDate>,
}

impl MortgageInput {
    /// Check every field against the rules the interactive prompts enforce.
    pub fn validate(&self) -> MortgageResult<()> {
        if self.property_value <= Decimal::ZERO {
            return Err(MortgageError::InvalidInput {
                field: "property_value".into(),
                reason: "Property value must be positive".into(),
            });
        }
        if has_sub_cent_digits(self.property_value) {
            return Err(MortgageError::InvalidInput {
                field: "property_value".into(),
                reason: "Property value must not have more than two decimal places".into(),
            });
        }
        if has_sub_cent_digits(self.down_payment) {
            return Err(MortgageError::InvalidInput {
                field: "down_payment".into(),
                reason: "Down payment must not have more than two decimal places".into(),
            });
        }
        if self.down_payment < Decimal::ZERO || self.down_payment >= self.property_value {
            return Err(MortgageError::InvalidInput {
                field: "down_payment".into(),
                reason: "Down payment must be at least 0 and less than the property value".into(),
            });
        }
        if self.annual_rate <= Decimal::ZERO || self.annual_rate > Decimal::ONE {
            return Err(MortgageError::InvalidInput {
                field: "annual_rate".into(),
                reason: "Annual rate must be greater than 0 and at most 1 (100%)".into(),
            });
        }
        if self.term_years == 0 || self.term_years > MAX_TERM_YEARS {
            return Err(MortgageError::InvalidInput {
                field: "term_years".into(),
                reason: format!("Loan term must be between 1 and {MAX_TERM_YEARS} years"),
            });
        }
        Ok(())
    }

    /// Amount borrowed: property value less the down payment.
    pub fn principal(&self) -> Money {
        self.property_value - self.down_payment
    }

    /// Share of the property value paid up front.
    pub fn down_payment_ratio(&self) -> Rate {
        if self.property_value.is_zero() {
            return Decimal::ZERO;
        }
        self.down_payment / self.property_value
    }
}

/// True when `amount` carries digits below one cent.
pub(crate) fn has_sub_cent_digits(amount: Money) -> bool {
    amount.round_dp(2) != amount
}

/// Validated terms of a fixed-rate, monthly-paying loan.
///
/// Only constructed through [`LoanTerms::new`] or [`LoanTerms::from_input`],
/// so every calculation downstream may rely on `principal > 0` held in whole
/// cents, `0 <= annual_rate <= 1` and `1 <= term_years <= MAX_TERM_YEARS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLoanTerms")]
pub struct LoanTerms {
    principal: Money,
    annual_rate: Rate,
    term_years: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    first_payment_date: Option<NaiveDate>,
}

impl LoanTerms {
    /// The principal is rounded to cents here, once; the schedule starts from
    /// exactly this amount.
    pub fn new(principal: Money, annual_rate: Rate, term_years: u32) -> MortgageResult<Self> {
        let principal = principal.round_dp(2);
        if principal <= Decimal::ZERO {
            return Err(MortgageError::InvalidInput {
                field: "principal".into(),
                reason: "Loan principal must be positive".into(),
            });
        }
        if annual_rate < Decimal::ZERO || annual_rate > Decimal::ONE {
            return Err(MortgageError::InvalidInput {
                field: "annual_rate".into(),
                reason: "Annual rate must be between 0 and 1 (100%)".into(),
            });
        }
        if term_years == 0 || term_years > MAX_TERM_YEARS {
            return Err(MortgageError::InvalidInput {
                field: "term_years".into(),
                reason: format!("Loan term must be between 1 and {MAX_TERM_YEARS} years"),
            });
        }
        Ok(Self {
            principal,
            annual_rate,
            term_years,
            first_payment_date: None,
        })
    }

    /// Validate a purchase description and derive the loan it implies.
    pub fn from_input(input: &MortgageInput) -> MortgageResult<Self> {
        input.validate()?;
        let terms = Self::new(input.principal(), input.annual_rate, input.term_years)?;
        Ok(match input.first_payment_date {
            Some(date) => terms.with_first_payment_date(date),
            None => terms,
        })
    }

    /// Attach a calendar date to period 1; later periods follow monthly.
    pub fn with_first_payment_date(mut self, date: NaiveDate) -> Self {
        self.first_payment_date = Some(date);
        self
    }

    pub fn principal(&self) -> Money {
        self.principal
    }

    pub fn annual_rate(&self) -> Rate {
        self.annual_rate
    }

    pub fn term_years(&self) -> u32 {
        self.term_years
    }

    pub fn first_payment_date(&self) -> Option<NaiveDate> {
        self.first_payment_date
    }

    pub fn is_interest_free(&self) -> bool {
        self.annual_rate.is_zero()
    }
}

#[derive(Deserialize)]
struct RawLoanTerms {
    principal: Money,
    annual_rate: Rate,
    term_years: u32,
    #[serde(default)]
    first_payment_date: Option<NaiveDate>,
}

impl TryFrom<RawLoanTerms> for LoanTerms {
    type Error = MortgageError;

    fn try_from(raw: RawLoanTerms) -> Result<Self, Self::Error> {
        let terms = LoanTerms::new(raw.principal, raw.annual_rate, raw.term_years)?;
        Ok(match raw.first_payment_date {
            Some(date) => terms.with_first_payment_date(date),
            None => terms,
        })
    }
}
