mod engine;
mod payment;
mod types;

pub use engine::{run_yearly_trace, simulate};
pub use payment::{monthly_rate_from_annual, mortgage_monthly_payment};
pub use types::{
    DEFAULT_INVESTMENT_RETURN_PCT, DEFAULT_PROPERTY_APPRECIATION_PCT, MAX_MORTGAGE_YEARS,
    ScenarioResult, SimulationError, SimulationParams, YearTraceRow,
};
