use serde::Serialize;
use thiserror::Error;

pub const MAX_MORTGAGE_YEARS: u32 = 100;

pub const DEFAULT_INVESTMENT_RETURN_PCT: f64 = 7.0;
pub const DEFAULT_PROPERTY_APPRECIATION_PCT: f64 = 2.0;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("downpayment {downpayment:.2} exceeds available cash {cash_available:.2}")]
    OverCommitment {
        downpayment: f64,
        cash_available: f64,
    },
    #[error("mortgage term of {years} years is outside 1..={max}")]
    HorizonOutOfRange { years: u32, max: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParams {
    pub cash_available: f64,
    pub property_price: f64,
    pub taxes_pct: f64,
    pub mortgage_rate_annual_pct: f64,
    pub mortgage_years: u32,
    pub investment_return_annual_pct: f64,
    pub property_appreciation_annual_pct: f64,
}

impl SimulationParams {
    pub fn new(
        cash_available: f64,
        property_price: f64,
        taxes_pct: f64,
        mortgage_rate_annual_pct: f64,
        mortgage_years: u32,
    ) -> Self {
        Self {
            cash_available,
            property_price,
            taxes_pct,
            mortgage_rate_annual_pct,
            mortgage_years,
            investment_return_annual_pct: DEFAULT_INVESTMENT_RETURN_PCT,
            property_appreciation_annual_pct: DEFAULT_PROPERTY_APPRECIATION_PCT,
        }
    }

    pub fn total_property_cost(&self) -> f64 {
        self.property_price * (1.0 + self.taxes_pct / 100.0)
    }

    pub fn horizon_months(&self) -> u32 {
        self.mortgage_years * 12
    }
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self::new(300_000.0, 450_000.0, 10.0, 3.5, 30)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    pub monthly_payment: f64,
    pub total_property_cost: f64,
    pub downpayment: f64,
    pub initial_investment: f64,
    pub mortgage_principal: f64,
    pub interest_paid: f64,
    pub total_paid: f64,
    pub final_property_value: f64,
    pub final_investment_value: f64,
}

impl ScenarioResult {
    pub fn total_assets_value(&self) -> f64 {
        self.final_property_value + self.final_investment_value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearTraceRow {
    pub year: u32,
    pub remaining_balance: f64,
    pub interest_paid_in_year: f64,
    pub principal_paid_in_year: f64,
    pub property_value: f64,
    pub investment_value: f64,
}

impl YearTraceRow {
    pub fn net_worth(&self) -> f64 {
        self.property_value - self.remaining_balance + self.investment_value
    }
}
