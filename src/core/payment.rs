use super::types::SimulationError;

pub fn mortgage_monthly_payment(
    principal: f64,
    annual_rate_pct: f64,
    years: u32,
) -> Result<f64, SimulationError> {
    if principal.is_nan() || principal <= 0.0 {
        return Err(SimulationError::InvalidArgument(format!(
            "mortgage principal must be > 0, got {principal}"
        )));
    }
    if years == 0 {
        return Err(SimulationError::InvalidArgument(
            "mortgage term must be at least one year".to_string(),
        ));
    }

    let n = f64::from(years) * 12.0;
    let r_month = mortgage_period_rate(annual_rate_pct);

    if r_month == 0.0 {
        return Ok(principal / n);
    }

    Ok(principal * r_month / (1.0 - (1.0 + r_month).powf(-n)))
}

pub fn monthly_rate_from_annual(annual_pct: f64) -> f64 {
    let r_annual = annual_pct / 100.0;
    (1.0 + r_annual).powf(1.0 / 12.0) - 1.0
}

pub(crate) fn mortgage_period_rate(annual_rate_pct: f64) -> f64 {
    annual_rate_pct / 100.0 / 12.0
}
