use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

use crate::error::MortgageError;
use crate::types::{Money, Rate};
use crate::MortgageResult;

/// `(1 + rate)^-nper`. A growth factor beyond the decimal range discounts
/// to zero.
fn discount_factor(rate: Rate, nper: u32) -> Decimal {
    match (Decimal::ONE + rate).checked_powu(u64::from(nper)) {
        Some(factor) if !factor.is_zero() => Decimal::ONE / factor,
        _ => Decimal::ZERO,
    }
}

/// Present Value
pub fn pv(rate: Rate, nper: u32, pmt: Money, fv: Money) -> MortgageResult<Money> {
    if rate.is_zero() {
        return Ok(-(pmt * Decimal::from(nper) + fv));
    }

    let discount = discount_factor(rate, nper);
    let annuity_factor = (Decimal::ONE - discount) / rate;
    Ok(-(pmt * annuity_factor + fv * discount))
}

/// Payment (PMT)
///
/// Works on the discounted annuity factor `(1 - (1+r)^-n) / r` so that a large
/// present value is never multiplied by the growth factor. For very long
/// terms the discount vanishes and the payment tends to `-pv * r`.
pub fn pmt(rate: Rate, nper: u32, present_value: Money, future_value: Money) -> MortgageResult<Money> {
    if nper == 0 {
        return Err(MortgageError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(-(present_value + future_value) / Decimal::from(nper));
    }

    let discount = discount_factor(rate, nper);
    let annuity_factor = (Decimal::ONE - discount) / rate;

    if annuity_factor.is_zero() {
        return Err(MortgageError::DivisionByZero {
            context: "PMT annuity factor".into(),
        });
    }

    Ok(-(present_value + future_value * discount) / annuity_factor)
}
