use dialoguer::{Input, theme::ColorfulTheme};

use super::{
    Cli, validate_cash_available, validate_downpayment, validate_investment_return,
    validate_mortgage_rate, validate_mortgage_years, validate_property_appreciation,
    validate_property_price, validate_taxes_pct,
};

fn ask_f64<V>(
    theme: &ColorfulTheme,
    prompt: &str,
    default: f64,
    validator: V,
) -> dialoguer::Result<f64>
where
    V: FnMut(&f64) -> Result<(), String> + 'static,
{
    Input::<f64>::with_theme(theme)
        .with_prompt(prompt)
        .default(default)
        .validate_with(validator)
        .interact_text()
}

fn downpayment_validator(cash_available: f64) -> impl FnMut(&f64) -> Result<(), String> {
    move |value: &f64| {
        validate_downpayment(value)?;
        if *value > cash_available {
            return Err(format!(
                "--downpayment must not exceed the available cash of {cash_available}"
            ));
        }
        Ok(())
    }
}

pub(super) fn prompt_for_cli(mut cli: Cli) -> dialoguer::Result<Cli> {
    let theme = ColorfulTheme::default();
    println!("Mortgage vs Invest Simulation");

    cli.cash_available = ask_f64(
        &theme,
        "Enter available cash for downpayment",
        cli.cash_available,
        validate_cash_available,
    )?;
    cli.property_price = ask_f64(
        &theme,
        "Enter the property price",
        cli.property_price,
        validate_property_price,
    )?;
    cli.taxes_pct = ask_f64(
        &theme,
        "Enter property taxes percentage",
        cli.taxes_pct,
        validate_taxes_pct,
    )?;
    cli.mortgage_rate = ask_f64(
        &theme,
        "Enter mortgage annual interest rate (APR) in %",
        cli.mortgage_rate,
        validate_mortgage_rate,
    )?;
    cli.mortgage_years = Input::<u32>::with_theme(&theme)
        .with_prompt("Enter mortgage term in years")
        .default(cli.mortgage_years)
        .validate_with(validate_mortgage_years)
        .interact_text()?;
    cli.investment_return = ask_f64(
        &theme,
        "Enter expected annual investment return in %",
        cli.investment_return,
        validate_investment_return,
    )?;
    cli.property_appreciation = ask_f64(
        &theme,
        "Enter expected annual property appreciation in %",
        cli.property_appreciation,
        validate_property_appreciation,
    )?;
    let default_downpayment = cli.downpayment.min(cli.cash_available);
    cli.downpayment = ask_f64(
        &theme,
        "Enter downpayment amount",
        default_downpayment,
        downpayment_validator(cli.cash_available),
    )?;
    Ok(cli)
}
