use serde::Serialize;

use crate::core::{ScenarioResult, SimulationParams, YearTraceRow};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartBar {
    pub label: &'static str,
    pub value: f64,
}

pub fn format_money(value: f64) -> String {
    let total_cents = (value.abs() * 100.0).round() as u64;
    let dollars = (total_cents / 100).to_string();
    let cents = total_cents % 100;

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, c) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 && total_cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{cents:02}")
}

pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

pub fn downpayment_pct_of_price(result: &ScenarioResult, params: &SimulationParams) -> f64 {
    if params.property_price > 0.0 {
        result.downpayment / params.property_price * 100.0
    } else {
        0.0
    }
}

pub fn result_rows(result: &ScenarioResult) -> [(&'static str, f64); 9] {
    [
        ("Monthly mortgage payment", result.monthly_payment),
        ("Purchase cost incl. taxes", result.total_property_cost),
        ("Downpayment", result.downpayment),
        ("Initial investment (cash leftover)", result.initial_investment),
        ("Mortgage principal financed", result.mortgage_principal),
        ("Total interest paid", result.interest_paid),
        ("Total out-of-pocket paid", result.total_paid),
        ("Final property value", result.final_property_value),
        ("Final investment value", result.final_investment_value),
    ]
}

pub fn param_rows(params: &SimulationParams) -> [(&'static str, String); 7] {
    [
        ("Cash Available", format_money(params.cash_available)),
        ("Property Price", format_money(params.property_price)),
        ("Taxes", format_percent(params.taxes_pct)),
        ("Mortgage Rate (APR)", format_percent(params.mortgage_rate_annual_pct)),
        ("Mortgage Years", params.mortgage_years.to_string()),
        ("Investment Return", format_percent(params.investment_return_annual_pct)),
        (
            "Property Appreciation",
            format_percent(params.property_appreciation_annual_pct),
        ),
    ]
}

pub fn chart_series(result: &ScenarioResult) -> Vec<ChartBar> {
    vec![
        ChartBar {
            label: "Downpayment",
            value: result.downpayment,
        },
        ChartBar {
            label: "Initial investment",
            value: result.initial_investment,
        },
        ChartBar {
            label: "Interest paid",
            value: result.interest_paid,
        },
        ChartBar {
            label: "Total paid",
            value: result.total_paid,
        },
        ChartBar {
            label: "Final property",
            value: result.final_property_value,
        },
        ChartBar {
            label: "Final investment",
            value: result.final_investment_value,
        },
    ]
}

pub fn chart_title(result: &ScenarioResult, params: &SimulationParams) -> String {
    format!(
        "Downpayment: {} ({:.1}% of price)",
        format_money(result.downpayment),
        downpayment_pct_of_price(result, params)
    )
}

pub fn summary_text(result: &ScenarioResult, params: &SimulationParams) -> String {
    let mut paragraphs = Vec::with_capacity(6);
    paragraphs.push(format!(
        "You start with {} in cash.",
        format_money(params.cash_available)
    ));
    paragraphs.push(format!(
        "You buy a property with a listing price of {}, which becomes {} once taxes and other upfront costs are included.",
        format_money(params.property_price),
        format_money(result.total_property_cost)
    ));
    paragraphs.push(format!(
        "You decide to put {} down ({:.1}% of the property price), leaving {} available to invest.",
        format_money(result.downpayment),
        downpayment_pct_of_price(result, params),
        format_money(result.initial_investment)
    ));
    if result.mortgage_principal > 0.0 {
        paragraphs.push(format!(
            "This leaves a mortgage principal of {} with a monthly payment of {}.",
            format_money(result.mortgage_principal),
            format_money(result.monthly_payment)
        ));
        paragraphs.push(format!(
            "Over the life of the mortgage you pay {} in interest, for a total of {} paid out of pocket (downpayment + all mortgage payments).",
            format_money(result.interest_paid),
            format_money(result.total_paid)
        ));
    } else {
        paragraphs.push(format!(
            "The downpayment covers the full purchase cost, so no mortgage is needed and {} is paid out of pocket.",
            format_money(result.total_paid)
        ));
    }
    paragraphs.push(format!(
        "At the end of the simulation period, the property is worth {} and your investments have grown to {}, giving you a combined asset value of {}.",
        format_money(result.final_property_value),
        format_money(result.final_investment_value),
        format_money(result.total_assets_value())
    ));
    paragraphs.join("\n\n")
}

pub fn render_text_report(
    params: &SimulationParams,
    result: &ScenarioResult,
    trace: Option<&[YearTraceRow]>,
) -> String {
    let mut out = String::new();

    out.push_str("Simulation Parameters:\n----------------------\n");
    for (label, value) in param_rows(params) {
        out.push_str(&format!("{label:<36}{value:>20}\n"));
    }

    out.push_str("\nSimulation Results:\n-------------------\n");
    for (label, value) in result_rows(result) {
        out.push_str(&format!("{label:<36}{:>20}\n", format_money(value)));
    }

    out.push_str(&format!("\n{}\n", chart_title(result, params)));
    let peak = chart_series(result)
        .iter()
        .map(|bar| bar.value.abs())
        .fold(0.0_f64, f64::max);
    for bar in chart_series(result) {
        let width = if peak > 0.0 {
            (bar.value.max(0.0) / peak * 40.0).round() as usize
        } else {
            0
        };
        out.push_str(&format!(
            "{:<20}{:<41}{}\n",
            bar.label,
            "#".repeat(width),
            format_money(bar.value)
        ));
    }

    if let Some(rows) = trace {
        out.push_str(&format!(
            "\n{:>4}{:>18}{:>18}{:>18}{:>18}\n",
            "Year", "Balance", "Property", "Investment", "Net worth"
        ));
        for row in rows {
            out.push_str(&format!(
                "{:>4}{:>18}{:>18}{:>18}{:>18}\n",
                row.year,
                format_money(row.remaining_balance),
                format_money(row.property_value),
                format_money(row.investment_value),
                format_money(row.net_worth())
            ));
        }
    }

    out.push('\n');
    out.push_str(&summary_text(result, params));
    out.push('\n');
    out
}
