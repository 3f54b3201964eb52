use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::terms::LoanTerms;
use crate::error::MortgageError;
use crate::time_value;
use crate::types::{Money, Rate};

/// Payments (and compounding periods) per year.
pub const COMPOUNDING_FREQUENCY: u32 = 12;

/// Convert an annual rate and a term in years into the monthly rate and the
/// number of monthly periods.
///
/// The period count saturates at `u32::MAX`; [`LoanTerms`] never holds a term
/// long enough to reach it.
pub fn compounding(annual_rate: Rate, term_years: u32) -> (Rate, u32) {
    let periodic_rate = annual_rate / Decimal::from(COMPOUNDING_FREQUENCY);
    let total_periods = term_years
        .checked_mul(COMPOUNDING_FREQUENCY)
        .unwrap_or(u32::MAX);
    (periodic_rate, total_periods)
}

/// Fixed monthly payment that fully amortises the loan, rounded to cents.
///
/// `principal * r * (1+r)^n / ((1+r)^n - 1)`, or `principal / n` for an
/// interest-free loan.
pub fn calculate_monthly_payment(terms: &LoanTerms) -> Money {
    let (periodic_rate, total_periods) = compounding(terms.annual_rate(), terms.term_years());

    let annuity = time_value::pmt(
        periodic_rate,
        total_periods,
        -terms.principal(),
        Decimal::ZERO,
    );
    let straight_line = terms.principal() / Decimal::from(total_periods);
    let payment = match annuity {
        Ok(payment) => payment,
        Err(MortgageError::DivisionByZero { context }) => {
            // Rate too small to move (1 + r)^n away from 1 at 28 digits.
            debug!(%context, "annuity factor degenerate, falling back to straight-line payment");
            straight_line
        }
        Err(e) => {
            warn!(error = %e, principal = %terms.principal(), total_periods, "payment formula rejected validated terms");
            straight_line
        }
    };

    payment.round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_compounding_monthly() {
        assert_eq!(compounding(dec!(0.12), 12), (dec!(0.01), 144));
    }

    #[test]
    fn test_compounding_zero_rate() {
        assert_eq!(compounding(Decimal::ZERO, 1), (Decimal::ZERO, 12));
    }

    #[test]
    fn test_monthly_payment_regression() {
        let terms = LoanTerms::new(dec!(100000.0), dec!(0.12), 12).unwrap();
        let payment = calculate_monthly_payment(&terms);
        assert!((payment - dec!(1313.419141)).abs() < dec!(0.01));
        assert_eq!(payment, dec!(1313.42));
    }

    #[test]
    fn test_monthly_payment_one_year() {
        let terms = LoanTerms::new(dec!(100000), dec!(0.12), 1).unwrap();
        assert_eq!(calculate_monthly_payment(&terms), dec!(8884.88));
    }

    #[test]
    fn test_monthly_payment_thirty_year() {
        let terms = LoanTerms::new(dec!(320000), dec!(0.05), 30).unwrap();
        assert_eq!(calculate_monthly_payment(&terms), dec!(1717.83));
    }

    #[test]
    fn test_compounding_saturates_period_count() {
        assert_eq!(compounding(dec!(0.05), u32::MAX).1, u32::MAX);
    }

    #[test]
    fn test_monthly_payment_sixty_year() {
        let terms = LoanTerms::new(dec!(320000), dec!(0.03), 60).unwrap();
        assert_eq!(calculate_monthly_payment(&terms), dec!(958.85));

        let terms = LoanTerms::new(dec!(250000), dec!(0.04), 60).unwrap();
        assert_eq!(calculate_monthly_payment(&terms), dec!(916.84));
    }

    #[test]
    fn test_monthly_payment_when_growth_overflows() {
        // (1 + 1/12)^1200 is beyond the decimal range: payment is interest only.
        let terms = LoanTerms::new(dec!(320000), Decimal::ONE, 100).unwrap();
        assert_eq!(calculate_monthly_payment(&terms), dec!(26666.67));
    }

    #[test]
    fn test_interest_free_payment() {
        let terms = LoanTerms::new(dec!(1200), Decimal::ZERO, 1).unwrap();
        assert_eq!(calculate_monthly_payment(&terms), dec!(100));
    }

    #[test]
    fn test_payment_rounded_to_cents() {
        let terms = LoanTerms::new(dec!(1000), Decimal::ZERO, 1).unwrap();
        // 1000 / 12 = 83.333...
        assert_eq!(calculate_monthly_payment(&terms), dec!(83.33));
    }
}
