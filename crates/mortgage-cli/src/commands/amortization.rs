use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::info;

use mortgage_core::amortization::{self, export, validation, MortgageInput};

use crate::input;

/// Loan description shared by the `schedule` and `payment` commands
#[derive(Args)]
pub struct LoanArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Property value
    #[arg(long, value_parser = parse_property_value)]
    pub property_value: Option<Decimal>,

    /// Down payment (defaults to 0)
    #[arg(long)]
    pub down_payment: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 5 for 5%)
    #[arg(long, value_parser = parse_rate_percent)]
    pub rate: Option<Decimal>,

    /// Loan term in years
    #[arg(long, value_parser = parse_term_years)]
    pub years: Option<u32>,

    /// Date of the first monthly payment (YYYY-MM-DD)
    #[arg(long)]
    pub first_payment_date: Option<NaiveDate>,
}

/// Arguments for the full amortization schedule
#[derive(Args)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Also write the schedule to a CSV file
    #[arg(long)]
    pub export: bool,

    /// Destination of the CSV export
    #[arg(long, default_value = export::DEFAULT_EXPORT_FILE)]
    pub export_path: String,

    /// Leave the month-by-month rows out of the printed output
    #[arg(long)]
    pub summary_only: bool,
}

/// Arguments for the monthly payment only
#[derive(Args)]
pub struct PaymentArgs {
    #[command(flatten)]
    pub loan: LoanArgs,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mortgage_input = resolve_input(&args.loan)?;
    let result = amortization::build_amortization(&mortgage_input)?;

    if args.export {
        let path = export::export_schedule(&args.export_path, &result.result.schedule)?;
        info!(path = %path.display(), "schedule written");
        eprintln!("Mortgage repayment schedule saved as '{}'", path.display());
    }

    let mut value = serde_json::to_value(result)?;
    if args.summary_only {
        if let Some(result) = value.get_mut("result").and_then(Value::as_object_mut) {
            result.remove("schedule");
        }
    }
    Ok(value)
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mortgage_input = resolve_input(&args.loan)?;
    let result = amortization::calculate_payment(&mortgage_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Input precedence: `--input` file, then individual flags, then JSON on stdin.
fn resolve_input(args: &LoanArgs) -> Result<MortgageInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_input(path);
    }

    if args.property_value.is_some() || args.rate.is_some() || args.years.is_some() {
        let property_value = args
            .property_value
            .ok_or("--property-value is required (or provide --input)")?;
        let annual_rate = args.rate.ok_or("--rate is required (or provide --input)")?;
        let term_years = args.years.ok_or("--years is required (or provide --input)")?;

        return Ok(MortgageInput {
            property_value,
            down_payment: args.down_payment.unwrap_or(Decimal::ZERO),
            annual_rate,
            term_years,
            first_payment_date: args.first_payment_date,
        });
    }

    if let Some(data) = input::stdin::read_stdin()? {
        return Ok(data);
    }

    Err("--input <file>, loan flags, or JSON on stdin required".into())
}

fn parse_property_value(s: &str) -> Result<Decimal, String> {
    validation::parse_property_value(s).map_err(|e| e.to_string())
}

fn parse_rate_percent(s: &str) -> Result<Decimal, String> {
    validation::parse_rate_percent(s).map_err(|e| e.to_string())
}

fn parse_term_years(s: &str) -> Result<u32, String> {
    validation::parse_term_years(s).map_err(|e| e.to_string())
}
