use mortgage_core::amortization::{AmortizationOutput, LoanTerms, LoanSummary, ScheduleRow};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{builder::Builder, Table};

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    let Some(result) = value.get("result") else {
        print_flat_object(value);
        return;
    };

    match serde_json::from_value::<AmortizationOutput>(result.clone()) {
        Ok(output) => {
            print_summary(&output.terms, &output.summary);
            if !output.schedule.is_empty() {
                println!();
                print_schedule(&output.schedule);
            }
        }
        Err(_) => print_flat_object(result),
    }

    print_envelope_notes(value);
}

/// Loan terms and totals as a two-column table.
pub fn print_summary(terms: &LoanTerms, summary: &LoanSummary) {
    let mut builder = Builder::default();
    builder.push_record(["Loan Terms", ""]);
    builder.push_record(["Initial Loan Amount", &format_money(terms.principal())]);
    builder.push_record([
        "Annual Interest Rate",
        &format!("{:.4}%", terms.annual_rate() * dec!(100)),
    ]);
    builder.push_record(["Loan Period", &format!("{} years", terms.term_years())]);
    builder.push_record(["Fixed Monthly Payment", &format_money(summary.monthly_payment)]);
    if summary.final_payment != summary.monthly_payment {
        builder.push_record(["Final Payment", &format_money(summary.final_payment)]);
    }
    builder.push_record(["Total Interest to be Paid", &format_money(summary.total_interest_paid)]);
    builder.push_record([
        "Total Amount to be Paid (Principal + Interest)",
        &format_money(summary.total_amount_paid),
    ]);
    if let Some(date) = summary.payoff_date {
        builder.push_record(["Payoff Date", &date.to_string()]);
    }

    let mut table = Table::from(builder);
    table.with(Style::modern());
    table.modify(Columns::new(1..), Alignment::right());
    println!("{}", table);
}

/// Month-by-month schedule with right-aligned numeric columns.
pub fn print_schedule(rows: &[ScheduleRow]) {
    if rows.is_empty() {
        println!("(empty)");
        return;
    }

    let with_dates = rows.iter().any(|r| r.payment_date.is_some());

    let mut builder = Builder::default();
    let mut header = vec!["Month"];
    if with_dates {
        header.push("Date");
    }
    header.extend(["Monthly Payment", "Interest", "Principal", "Remaining Amount"]);
    builder.push_record(header);

    for row in rows {
        let mut record = vec![row.period.to_string()];
        if with_dates {
            record.push(row.payment_date.map(|d| d.to_string()).unwrap_or_default());
        }
        record.extend([
            format_amount(row.payment),
            format_amount(row.interest),
            format_amount(row.principal),
            format_amount(row.remaining_balance),
        ]);
        builder.push_record(record);
    }

    let mut table = Table::from(builder);
    table.with(Style::blank());
    table.modify(Columns::new(0..), Alignment::right());
    println!("{}", table);
}

fn print_envelope_notes(envelope: &Value) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        let table = Table::from(builder);
        println!("{}", table);
    } else {
        println!("{}", value);
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

fn format_money(amount: Decimal) -> String {
    if amount.is_sign_negative() {
        format!("-${}", format_amount(amount.abs()))
    } else {
        format!("${}", format_amount(amount))
    }
}

/// Two decimals with thousands separators, e.g. `319,615.50`.
pub(crate) fn format_amount(amount: Decimal) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    format!("{sign}{grouped}.{frac}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount_groups_thousands() {
        assert_eq!(format_amount(dec!(319615.5)), "319,615.50");
        assert_eq!(format_amount(dec!(1717.83)), "1,717.83");
        assert_eq!(format_amount(dec!(999)), "999.00");
        assert_eq!(format_amount(dec!(1000000)), "1,000,000.00");
        assert_eq!(format_amount(Decimal::ZERO), "0.00");
        assert_eq!(format_amount(dec!(-0.43)), "-0.43");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec!(320000)), "$320,000.00");
        assert_eq!(format_money(dec!(-12.5)), "-$12.50");
    }
}
