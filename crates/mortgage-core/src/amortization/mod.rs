//! Fixed-rate mortgage amortization.
//!
//! [`build_amortization`] is the end-to-end entry point: it validates a
//! [`MortgageInput`], computes the monthly payment, generates the schedule and
//! the loan totals, and wraps everything in the standard output envelope.

#[cfg(feature = "export")]
pub mod export;
pub mod payment;
pub mod schedule;
pub mod summary;
pub mod terms;
pub mod validation;

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::MortgageResult;

pub use payment::{calculate_monthly_payment, compounding, COMPOUNDING_FREQUENCY};
pub use schedule::{amortize, generate_schedule, scheduled_balance, ScheduleRow};
pub use summary::{summarize, LoanSummary};
pub use terms::{LoanTerms, MortgageInput, MAX_TERM_YEARS};
pub use validation::ValidationError;

/// Complete result of an amortization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationOutput {
    pub terms: LoanTerms,
    pub summary: LoanSummary,
    #[serde(default)]
    pub schedule: Vec<ScheduleRow>,
}

/// Monthly payment without the schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOutput {
    pub principal: Money,
    pub periodic_rate: Rate,
    pub total_periods: u32,
    pub monthly_payment: Money,
}

/// Validate the purchase and compute only the fixed monthly payment.
pub fn calculate_payment(input: &MortgageInput) -> MortgageResult<ComputationOutput<PaymentOutput>> {
    let start = Instant::now();
    let terms = LoanTerms::from_input(input)?;

    let (periodic_rate, total_periods) = compounding(terms.annual_rate(), terms.term_years());
    let monthly_payment = calculate_monthly_payment(&terms);
    debug!(payment = %monthly_payment, periods = total_periods, "monthly payment computed");

    let output = PaymentOutput {
        principal: terms.principal(),
        periodic_rate,
        total_periods,
        monthly_payment,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-Rate Annuity Payment",
        input,
        Vec::new(),
        elapsed,
        output,
    ))
}

/// Validate the purchase, then compute payment, schedule and totals.
pub fn build_amortization(
    input: &MortgageInput,
) -> MortgageResult<ComputationOutput<AmortizationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let terms = LoanTerms::from_input(input)?;

    if input.down_payment_ratio() < terms::CONVENTIONAL_DOWN_PAYMENT {
        warnings.push(format!(
            "Down payment is {}% of the property value; lenders typically require mortgage insurance below 20%",
            (input.down_payment_ratio() * dec!(100)).round_dp(2)
        ));
    }

    let payment = calculate_monthly_payment(&terms);
    let schedule = generate_schedule(&terms, payment);
    let summary = summarize(&terms, payment, &schedule);

    debug!(
        principal = %terms.principal(),
        payment = %payment,
        periods = schedule.len(),
        "amortization schedule generated"
    );

    let first_interest = schedule.first().map(|row| row.interest).unwrap_or_default();
    let adjustment = summary.final_payment - payment;
    if payment.is_zero() {
        warnings.push("Monthly payment rounds to zero; principal is repaid in the final period".into());
    } else if payment <= first_interest {
        warnings.push(format!(
            "Monthly payment {payment} does not exceed the first month's interest {first_interest}; \
             the principal is repaid as a balloon of {} in the final period",
            summary.final_payment
        ));
    } else if adjustment.abs() > dec!(0.01) {
        warnings.push(format!(
            "Final payment adjusted by {adjustment} to {} to absorb payment rounding",
            summary.final_payment
        ));
    }

    for w in &warnings {
        info!("{w}");
    }

    let assumptions = serde_json::json!({
        "property_value": input.property_value.to_string(),
        "down_payment": input.down_payment.to_string(),
        "principal": terms.principal().to_string(),
        "annual_rate": terms.annual_rate().to_string(),
        "term_years": terms.term_years(),
        "compounding_frequency": COMPOUNDING_FREQUENCY,
        "rounding": "round to cents each period; final period repays remaining balance",
    });

    let output = AmortizationOutput {
        terms,
        summary,
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-Rate Annuity Amortization",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}
