use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::payment::{calculate_monthly_payment, compounding};
use super::terms::LoanTerms;
use crate::error::MortgageError;
use crate::time_value;
use crate::types::Money;
use crate::MortgageResult;

/// One monthly line of the amortization schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// 1-based month number.
    pub period: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDate>,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    pub remaining_balance: Money,
}

/// Build the month-by-month schedule for a fixed payment.
///
/// Every amount is rounded to cents as it is computed and the balance is
/// carried at cents, so `principal == payment - interest` and
/// `remaining_balance[i] == remaining_balance[i-1] - principal[i]` hold
/// exactly. The last period repays whatever balance is left (as does any
/// period where the fixed payment would overshoot it), which absorbs the
/// residual from rounding the payment and closes the loan at zero.
pub fn generate_schedule(terms: &LoanTerms, payment: Money) -> Vec<ScheduleRow> {
    let (periodic_rate, total_periods) = compounding(terms.annual_rate(), terms.term_years());

    let mut rows = Vec::with_capacity(total_periods as usize);
    let mut balance = terms.principal();

    for period in 1..=total_periods {
        let interest = (balance * periodic_rate).round_dp(2);
        let scheduled_principal = payment - interest;

        let principal = if period == total_periods || scheduled_principal > balance {
            balance
        } else {
            scheduled_principal
        };
        balance -= principal;

        rows.push(ScheduleRow {
            period,
            payment_date: payment_date(terms.first_payment_date(), period),
            payment: interest + principal,
            interest,
            principal,
            remaining_balance: balance,
        });
    }

    rows
}

/// Monthly payment and full schedule in one call.
pub fn amortize(terms: &LoanTerms) -> (Money, Vec<ScheduleRow>) {
    let payment = calculate_monthly_payment(terms);
    (payment, generate_schedule(terms, payment))
}

/// Closed-form balance still owed after `after_period` payments of `payment`,
/// before any cent rounding. Useful for checking a rounded schedule's drift.
pub fn scheduled_balance(terms: &LoanTerms, payment: Money, after_period: u32) -> MortgageResult<Money> {
    let (periodic_rate, total_periods) = compounding(terms.annual_rate(), terms.term_years());
    if after_period > total_periods {
        return Err(MortgageError::InvalidInput {
            field: "after_period".into(),
            reason: format!("Loan only has {total_periods} periods"),
        });
    }
    if after_period == total_periods {
        return Ok(Decimal::ZERO);
    }

    // Balance = PV of the remaining payments, which matches the contract when
    // `payment` is the exact annuity payment.
    time_value::pv(periodic_rate, total_periods - after_period, -payment, Decimal::ZERO)
}

fn payment_date(first: Option<NaiveDate>, period: u32) -> Option<NaiveDate> {
    first.and_then(|date| date.checked_add_months(Months::new(period - 1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn thirty_year() -> LoanTerms {
        LoanTerms::new(dec!(320000), dec!(0.05), 30).unwrap()
    }

    #[test]
    fn test_first_row() {
        let (payment, rows) = amortize(&thirty_year());
        assert_eq!(payment, dec!(1717.83));
        assert_eq!(
            rows[0],
            ScheduleRow {
                period: 1,
                payment_date: None,
                payment: dec!(1717.83),
                interest: dec!(1333.33),
                principal: dec!(384.50),
                remaining_balance: dec!(319615.50),
            }
        );
    }

    #[test]
    fn test_final_row_absorbs_rounding() {
        let (_, rows) = amortize(&thirty_year());
        assert_eq!(rows.len(), 360);
        let last = rows.last().unwrap();
        assert_eq!(last.period, 360);
        assert_eq!(last.interest, dec!(7.13));
        assert_eq!(last.principal, dec!(1710.27));
        assert_eq!(last.payment, dec!(1717.40));
        assert_eq!(last.remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_row_invariants_hold() {
        let terms = thirty_year();
        let (_, rows) = amortize(&terms);
        let mut previous = terms.principal();
        for row in &rows {
            assert_eq!(row.principal, row.payment - row.interest);
            assert_eq!(row.remaining_balance, previous - row.principal);
            assert!(row.remaining_balance >= Decimal::ZERO);
            previous = row.remaining_balance;
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let terms = LoanTerms::new(dec!(100000), dec!(0.12), 12).unwrap();
        let payment = calculate_monthly_payment(&terms);
        assert_eq!(generate_schedule(&terms, payment), generate_schedule(&terms, payment));
    }

    #[test]
    fn test_payment_larger_than_balance_never_overshoots() {
        // 0.07 / 12 rounds up to a 0.01 payment, which clears the loan in month 7.
        let terms = LoanTerms::new(dec!(0.07), Decimal::ZERO, 1).unwrap();
        let (payment, rows) = amortize(&terms);
        assert_eq!(payment, dec!(0.01));
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[6].remaining_balance, Decimal::ZERO);
        for row in &rows[7..] {
            assert_eq!(row.payment, Decimal::ZERO);
            assert_eq!(row.principal, Decimal::ZERO);
            assert_eq!(row.remaining_balance, Decimal::ZERO);
        }
    }

    #[test]
    fn test_sixty_year_loan_closes_at_zero() {
        let terms = LoanTerms::new(dec!(320000), dec!(0.03), 60).unwrap();
        let (payment, rows) = amortize(&terms);
        assert_eq!(payment, dec!(958.85));
        assert_eq!(rows.len(), 720);
        assert_eq!(rows[0].interest, dec!(800.00));
        assert_eq!(rows[0].principal, dec!(158.85));

        let last = rows.last().unwrap();
        assert_eq!(last.period, 720);
        assert_eq!(last.interest, dec!(2.41));
        assert_eq!(last.principal, dec!(964.54));
        assert_eq!(last.remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_interest_only_payment_repaid_in_final_period() {
        let terms = LoanTerms::new(dec!(320000), Decimal::ONE, 100).unwrap();
        let (payment, rows) = amortize(&terms);
        assert_eq!(payment, dec!(26666.67));
        assert_eq!(rows.len(), 1200);
        assert!(rows[..1199]
            .iter()
            .all(|row| row.principal.is_zero() && row.remaining_balance == dec!(320000)));

        let last = rows.last().unwrap();
        assert_eq!(last.principal, dec!(320000));
        assert_eq!(last.payment, dec!(346666.67));
        assert_eq!(last.remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_sub_cent_principal_fully_repaid() {
        let terms = LoanTerms::new(dec!(1000.015), dec!(0.05), 1).unwrap();
        let (_, rows) = amortize(&terms);
        let repaid: Decimal = rows.iter().map(|row| row.principal).sum();
        assert_eq!(repaid, terms.principal());
        assert_eq!(repaid, dec!(1000.02));
        assert_eq!(
            rows[0].remaining_balance,
            terms.principal() - rows[0].principal
        );
    }

    #[test]
    fn test_payment_dates_follow_months() {
        let first = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let terms = LoanTerms::new(dec!(1200), dec!(0.06), 1)
            .unwrap()
            .with_first_payment_date(first);
        let (_, rows) = amortize(&terms);
        assert_eq!(rows[0].payment_date, Some(first));
        assert_eq!(rows[1].payment_date, NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(rows[11].payment_date, NaiveDate::from_ymd_opt(2024, 12, 31));
    }

    #[test]
    fn test_scheduled_balance_tracks_rounded_schedule() {
        let terms = thirty_year();
        let (payment, rows) = amortize(&terms);
        let closed_form = scheduled_balance(&terms, payment, 120).unwrap();
        // Cent rounding drifts by a few cents at most over ten years.
        assert!((closed_form - rows[119].remaining_balance).abs() < dec!(1));
    }

    #[test]
    fn test_scheduled_balance_out_of_range() {
        let terms = thirty_year();
        assert!(scheduled_balance(&terms, dec!(1717.83), 361).is_err());
        assert_eq!(scheduled_balance(&terms, dec!(1717.83), 360).unwrap(), Decimal::ZERO);
    }
}
