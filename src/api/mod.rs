mod prompt;
mod report;

use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{
    MAX_MORTGAGE_YEARS, ScenarioResult, SimulationError, SimulationParams, YearTraceRow,
    run_yearly_trace, simulate,
};

pub use report::{
    ChartBar, chart_series, chart_title, downpayment_pct_of_price, format_money, format_percent,
    render_text_report, result_rows, summary_text,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    cash_available: Option<f64>,
    property_price: Option<f64>,
    taxes_pct: Option<f64>,
    #[serde(alias = "mortgageRate")]
    mortgage_rate_annual_pct: Option<f64>,
    mortgage_years: Option<u32>,
    #[serde(alias = "investmentReturn")]
    investment_return_annual_pct: Option<f64>,
    #[serde(alias = "propertyAppreciation")]
    property_appreciation_annual_pct: Option<f64>,
    downpayment: Option<f64>,
    include_yearly_trace: Option<bool>,
}

#[derive(Parser, Debug)]
#[command(
    name = "homeinvest",
    about = "Mortgage vs invest projection: buy with a mortgage and invest the cash you keep",
    after_help = "Run `homeinvest serve [port]` to start the HTTP API instead."
)]
struct Cli {
    #[arg(long, default_value_t = 300_000.0, help = "Cash available for the downpayment")]
    cash_available: f64,
    #[arg(long, default_value_t = 450_000.0, help = "Listing price of the property")]
    property_price: f64,
    #[arg(
        long,
        default_value_t = 10.0,
        help = "Purchase taxes and upfront costs in percent of the price"
    )]
    taxes_pct: f64,
    #[arg(long, default_value_t = 3.5, help = "Mortgage annual interest rate (APR) in percent")]
    mortgage_rate: f64,
    #[arg(long, default_value_t = 30, help = "Mortgage term in years; also the projection horizon")]
    mortgage_years: u32,
    #[arg(long, default_value_t = 7.0, help = "Expected annual investment return in percent")]
    investment_return: f64,
    #[arg(
        long,
        default_value_t = 2.0,
        help = "Expected annual property appreciation in percent"
    )]
    property_appreciation: f64,
    #[arg(long, default_value_t = 60_000.0, help = "Downpayment amount")]
    downpayment: f64,
    #[arg(long, help = "Print the year-end balance, property and investment values")]
    yearly_trace: bool,
    #[arg(long, help = "Prompt for each value, using the flags as defaults")]
    interactive: bool,
    #[arg(long, help = "Print the API response JSON instead of the text report")]
    json: bool,
}

#[derive(Debug)]
struct ScenarioRequest {
    params: SimulationParams,
    downpayment: f64,
    include_yearly_trace: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    params: SimulationParams,
    result: ScenarioResult,
    downpayment_pct_of_price: f64,
    total_assets_value: f64,
    chart_title: String,
    chart: Vec<ChartBar>,
    summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    yearly_trace: Option<Vec<YearTraceRow>>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn validate_finite(name: &str, value: f64) -> Result<(), String> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(format!("{name} must be a finite number"))
    }
}

fn validate_cash_available(value: &f64) -> Result<(), String> {
    validate_finite("--cash-available", *value)?;
    if *value < 0.0 {
        return Err("--cash-available must be >= 0".to_string());
    }
    Ok(())
}

fn validate_property_price(value: &f64) -> Result<(), String> {
    validate_finite("--property-price", *value)?;
    if *value <= 0.0 {
        return Err("--property-price must be > 0".to_string());
    }
    Ok(())
}

fn validate_taxes_pct(value: &f64) -> Result<(), String> {
    validate_finite("--taxes-pct", *value)?;
    if *value < 0.0 {
        return Err("--taxes-pct must be >= 0".to_string());
    }
    Ok(())
}

fn validate_mortgage_rate(value: &f64) -> Result<(), String> {
    validate_finite("--mortgage-rate", *value)?;
    if *value < 0.0 {
        return Err("--mortgage-rate must be >= 0".to_string());
    }
    Ok(())
}

fn validate_mortgage_years(value: &u32) -> Result<(), String> {
    if !(1..=MAX_MORTGAGE_YEARS).contains(value) {
        return Err(format!(
            "--mortgage-years must be between 1 and {MAX_MORTGAGE_YEARS}"
        ));
    }
    Ok(())
}

fn validate_growth_rate(name: &str, value: f64) -> Result<(), String> {
    validate_finite(name, value)?;
    if value <= -100.0 {
        return Err(format!("{name} must be > -100"));
    }
    Ok(())
}

fn validate_investment_return(value: &f64) -> Result<(), String> {
    validate_growth_rate("--investment-return", *value)
}

fn validate_property_appreciation(value: &f64) -> Result<(), String> {
    validate_growth_rate("--property-appreciation", *value)
}

fn validate_downpayment(value: &f64) -> Result<(), String> {
    validate_finite("--downpayment", *value)?;
    if *value <= 0.0 {
        return Err("--downpayment must be > 0".to_string());
    }
    Ok(())
}

fn build_request(cli: Cli) -> Result<ScenarioRequest, String> {
    validate_cash_available(&cli.cash_available)?;
    validate_property_price(&cli.property_price)?;
    validate_taxes_pct(&cli.taxes_pct)?;
    validate_mortgage_rate(&cli.mortgage_rate)?;
    validate_mortgage_years(&cli.mortgage_years)?;
    validate_investment_return(&cli.investment_return)?;
    validate_property_appreciation(&cli.property_appreciation)?;
    validate_downpayment(&cli.downpayment)?;

    Ok(ScenarioRequest {
        params: SimulationParams {
            cash_available: cli.cash_available,
            property_price: cli.property_price,
            taxes_pct: cli.taxes_pct,
            mortgage_rate_annual_pct: cli.mortgage_rate,
            mortgage_years: cli.mortgage_years,
            investment_return_annual_pct: cli.investment_return,
            property_appreciation_annual_pct: cli.property_appreciation,
        },
        downpayment: cli.downpayment,
        include_yearly_trace: cli.yearly_trace,
    })
}

fn run_scenario(request: &ScenarioRequest) -> Result<SimulateResponse, SimulationError> {
    let params = &request.params;
    let result = simulate(params, request.downpayment)?;
    let yearly_trace = if request.include_yearly_trace {
        Some(run_yearly_trace(params, request.downpayment)?)
    } else {
        None
    };
    Ok(build_simulate_response(params, result, yearly_trace))
}

fn build_simulate_response(
    params: &SimulationParams,
    result: ScenarioResult,
    yearly_trace: Option<Vec<YearTraceRow>>,
) -> SimulateResponse {
    SimulateResponse {
        params: *params,
        downpayment_pct_of_price: downpayment_pct_of_price(&result, params),
        total_assets_value: result.total_assets_value(),
        chart_title: chart_title(&result, params),
        chart: chart_series(&result),
        summary: summary_text(&result, params),
        result,
        yearly_trace,
    }
}

pub fn run_cli<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let mut cli = Cli::try_parse_from(args).unwrap_or_else(|e| e.exit());
    let json = cli.json;

    if cli.interactive {
        cli = prompt::prompt_for_cli(cli).map_err(|e| format!("Failed to read input: {e}"))?;
    }

    let request = build_request(cli)?;
    info!(
        downpayment = request.downpayment,
        property_price = request.params.property_price,
        mortgage_years = request.params.mortgage_years,
        "running scenario"
    );

    let response = run_scenario(&request).map_err(|e| e.to_string())?;
    if json {
        let body = serde_json::to_string_pretty(&response)
            .map_err(|e| format!("Failed to serialize response: {e}"))?;
        println!("{body}");
    } else {
        print!(
            "{}",
            render_text_report(
                &response.params,
                &response.result,
                response.yearly_trace.as_deref()
            )
        );
    }
    Ok(())
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("homeinvest HTTP API listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{port}/api/simulate");

    axum::serve(listener, router()).await
}

fn router() -> Router {
    Router::new()
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .fallback(not_found_handler)
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(payload: Result<Query<SimulatePayload>, QueryRejection>) -> Response {
    match payload {
        Ok(Query(payload)) => simulate_handler_impl(payload),
        Err(rejection) => malformed_payload_response(&rejection.body_text()),
    }
}

async fn simulate_post_handler(payload: Result<Json<SimulatePayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => simulate_handler_impl(payload),
        Err(rejection) => malformed_payload_response(&rejection.body_text()),
    }
}

fn malformed_payload_response(detail: &str) -> Response {
    warn!(error = %detail, "malformed simulate payload");
    error_response(
        StatusCode::BAD_REQUEST,
        &format!("Invalid simulate payload: {detail}"),
    )
}

fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let request = match request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => {
            warn!(error = %msg, "rejected simulate request");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    debug!(?request, "simulate request accepted");
    match run_scenario(&request) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => {
            warn!(error = %err, "scenario could not be simulated");
            error_response(status_for_error(&err), &err.to_string())
        }
    }
}

fn status_for_error(err: &SimulationError) -> StatusCode {
    match err {
        SimulationError::OverCommitment { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        SimulationError::InvalidArgument(_) | SimulationError::HorizonOutOfRange { .. } => {
            StatusCode::BAD_REQUEST
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn request_from_json(json: &str) -> Result<ScenarioRequest, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    request_from_payload(payload)
}

fn request_from_payload(payload: SimulatePayload) -> Result<ScenarioRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.cash_available {
        cli.cash_available = v;
    }
    if let Some(v) = payload.property_price {
        cli.property_price = v;
    }
    if let Some(v) = payload.taxes_pct {
        cli.taxes_pct = v;
    }
    if let Some(v) = payload.mortgage_rate_annual_pct {
        cli.mortgage_rate = v;
    }
    if let Some(v) = payload.mortgage_years {
        cli.mortgage_years = v;
    }
    if let Some(v) = payload.investment_return_annual_pct {
        cli.investment_return = v;
    }
    if let Some(v) = payload.property_appreciation_annual_pct {
        cli.property_appreciation = v;
    }
    if let Some(v) = payload.downpayment {
        cli.downpayment = v;
    }
    if let Some(v) = payload.include_yearly_trace {
        cli.yearly_trace = v;
    }

    build_request(cli)
}

fn default_cli_for_api() -> Cli {
    let params = SimulationParams::default();
    Cli {
        cash_available: params.cash_available,
        property_price: params.property_price,
        taxes_pct: params.taxes_pct,
        mortgage_rate: params.mortgage_rate_annual_pct,
        mortgage_years: params.mortgage_years,
        investment_return: params.investment_return_annual_pct,
        property_appreciation: params.property_appreciation_annual_pct,
        downpayment: 60_000.0,
        yearly_trace: false,
        interactive: false,
        json: false,
    }
}
