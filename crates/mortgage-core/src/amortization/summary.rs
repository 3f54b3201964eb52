use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::payment::compounding;
use super::schedule::ScheduleRow;
use super::terms::LoanTerms;
use crate::types::Money;

/// Loan-level totals derived from a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub monthly_payment: Money,
    pub total_periods: u32,
    pub total_interest_paid: Money,
    pub total_principal_paid: Money,
    /// Fixed payment times the number of periods.
    pub total_amount_paid: Money,
    /// Payment actually due in the last period after the rounding true-up.
    pub final_payment: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payoff_date: Option<NaiveDate>,
}

pub fn summarize(terms: &LoanTerms, payment: Money, schedule: &[ScheduleRow]) -> LoanSummary {
    let (_, total_periods) = compounding(terms.annual_rate(), terms.term_years());

    let total_interest_paid: Money = schedule.iter().map(|row| row.interest).sum();
    let total_principal_paid: Money = schedule.iter().map(|row| row.principal).sum();
    let last = schedule.last();

    LoanSummary {
        monthly_payment: payment,
        total_periods,
        total_interest_paid,
        total_principal_paid,
        total_amount_paid: payment * Decimal::from(total_periods),
        final_payment: last.map(|row| row.payment).unwrap_or(payment),
        payoff_date: last.and_then(|row| row.payment_date),
    }
}
