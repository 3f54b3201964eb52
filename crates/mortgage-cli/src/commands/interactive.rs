use clap::Args;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm, Input};

use mortgage_core::amortization::{self, export, validation, MortgageInput, ValidationError};

use crate::output::table;

/// Arguments for the interactive prompt session
#[derive(Args)]
pub struct InteractiveArgs {
    /// Destination of the CSV export, if the user asks for one
    #[arg(long, default_value = export::DEFAULT_EXPORT_FILE)]
    pub export_path: String,
}

pub fn run_interactive(args: InteractiveArgs) -> Result<(), Box<dyn std::error::Error>> {
    let theme = ColorfulTheme::default();

    println!("Welcome to the Mortgage Monthly Payment Calculator.");
    println!("Please follow the instructions:");

    let property_value = prompt_field(&theme, "Enter the property value ($)", |s| {
        validation::parse_property_value(s)
    })?;
    let down_payment = prompt_field(&theme, "Enter the down payment amount ($)", |s| {
        validation::parse_down_payment(s, property_value)
    })?;
    let annual_rate = prompt_field(&theme, "Enter the annual interest rate (%)", |s| {
        validation::parse_rate_percent(s)
    })?;
    let term_years = prompt_field(&theme, "Enter the loan term (years)", |s| {
        validation::parse_term_years(s)
    })?;

    let mortgage_input = MortgageInput {
        property_value,
        down_payment,
        annual_rate,
        term_years,
        first_payment_date: None,
    };
    let result = amortization::build_amortization(&mortgage_input)?;
    let output = &result.result;

    table::print_summary(&output.terms, &output.summary);
    for w in &result.warnings {
        println!("{} {}", "warning:".yellow().bold(), w);
    }

    if Confirm::with_theme(&theme)
        .with_prompt("Would you like to display the Mortgage Amortization Schedule?")
        .default(false)
        .interact()?
    {
        table::print_schedule(&output.schedule);
    }

    if Confirm::with_theme(&theme)
        .with_prompt("Would you like to generate a csv file with the Mortgage Amortization Schedule?")
        .default(false)
        .interact()?
    {
        let path = export::export_schedule(&args.export_path, &output.schedule)?;
        println!("Mortgage repayment schedule saved as '{}'", path.display());
    }

    println!(
        "\n{}",
        "Thank you for using this calculator! See you next time!"
            .green()
            .bold()
    );
    Ok(())
}

fn prompt_field<T>(
    theme: &ColorfulTheme,
    prompt: &str,
    parse: impl Fn(&str) -> Result<T, ValidationError>,
) -> Result<T, dialoguer::Error> {
    prompt_until_valid(
        || Input::<String>::with_theme(theme).with_prompt(prompt).interact_text(),
        parse,
        |e| eprintln!("{} {}. Please try again.", "Invalid input!".red(), e),
    )
}

/// Ask until `parse` accepts an answer, reporting each rejection.
fn prompt_until_valid<T, E>(
    mut ask: impl FnMut() -> Result<String, E>,
    parse: impl Fn(&str) -> Result<T, ValidationError>,
    mut on_invalid: impl FnMut(&ValidationError),
) -> Result<T, E> {
    loop {
        let answer = ask()?;
        match parse(&answer) {
            Ok(value) => return Ok(value),
            Err(e) => on_invalid(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reprompts_until_valid() {
        let mut answers = vec!["abc", "-10", "250000"].into_iter();
        let mut rejected = Vec::new();

        let value = prompt_until_valid(
            || Ok::<_, ()>(answers.next().unwrap().to_string()),
            validation::parse_property_value,
            |e| rejected.push(e.clone()),
        )
        .unwrap();

        assert_eq!(value, dec!(250000));
        assert_eq!(rejected.len(), 2);
        assert_eq!(rejected[0], ValidationError::NotANumber("abc".into()));
    }

    #[test]
    fn test_prompt_error_propagates() {
        let result = prompt_until_valid(
            || Err::<String, _>("stdin closed"),
            validation::parse_term_years,
            |_| {},
        );
        assert_eq!(result, Err("stdin closed"));
    }
}
