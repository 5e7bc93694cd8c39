use super::payment::{monthly_rate_from_annual, mortgage_monthly_payment, mortgage_period_rate};
use super::types::{
    MAX_MORTGAGE_YEARS, ScenarioResult, SimulationError, SimulationParams, YearTraceRow,
};

#[derive(Debug, Clone, Copy)]
struct Purchase {
    total_property_cost: f64,
    mortgage_principal: f64,
    initial_investment: f64,
    monthly_payment: f64,
    periods: u32,
}

#[derive(Debug, Clone, Copy)]
struct MonthlyRates {
    mortgage: f64,
    property: f64,
    investment: f64,
}

impl MonthlyRates {
    fn from_params(params: &SimulationParams) -> Self {
        Self {
            mortgage: mortgage_period_rate(params.mortgage_rate_annual_pct),
            property: monthly_rate_from_annual(params.property_appreciation_annual_pct),
            investment: monthly_rate_from_annual(params.investment_return_annual_pct),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct MonthFlow {
    interest: f64,
    principal: f64,
}

#[derive(Debug)]
struct Projection {
    balance: f64,
    property_value: f64,
    investment_value: f64,
}

impl Projection {
    fn step(&mut self, rates: &MonthlyRates, monthly_payment: f64) -> MonthFlow {
        let mut flow = MonthFlow::default();

        if self.balance > 0.0 {
            let interest = self.balance * rates.mortgage;
            let principal_paid = monthly_payment - interest;
            self.balance -= principal_paid;
            if self.balance < 0.0 {
                self.balance = 0.0;
            }
            flow = MonthFlow {
                interest,
                principal: principal_paid,
            };
        }

        self.property_value *= 1.0 + rates.property;
        self.investment_value *= 1.0 + rates.investment;
        flow
    }
}

/// A downpayment larger than `cash_available` is rejected rather than
/// producing a partially filled result.
pub fn simulate(
    params: &SimulationParams,
    downpayment: f64,
) -> Result<ScenarioResult, SimulationError> {
    let purchase = prepare_purchase(params, downpayment)?;
    let rates = MonthlyRates::from_params(params);
    let mut projection = start_projection(params, &purchase);

    for _ in 0..purchase.periods {
        projection.step(&rates, purchase.monthly_payment);
    }

    Ok(build_scenario_result(&purchase, downpayment, &projection))
}

pub fn run_yearly_trace(
    params: &SimulationParams,
    downpayment: f64,
) -> Result<Vec<YearTraceRow>, SimulationError> {
    let purchase = prepare_purchase(params, downpayment)?;
    let rates = MonthlyRates::from_params(params);
    let mut projection = start_projection(params, &purchase);
    let mut rows = Vec::with_capacity(params.mortgage_years as usize);

    for year in 1..=params.mortgage_years {
        let mut interest_paid_in_year = 0.0;
        let mut principal_paid_in_year = 0.0;
        for _ in 0..12 {
            let flow = projection.step(&rates, purchase.monthly_payment);
            interest_paid_in_year += flow.interest;
            principal_paid_in_year += flow.principal;
        }
        rows.push(YearTraceRow {
            year,
            remaining_balance: projection.balance,
            interest_paid_in_year,
            principal_paid_in_year,
            property_value: projection.property_value,
            investment_value: projection.investment_value,
        });
    }

    Ok(rows)
}

fn prepare_purchase(
    params: &SimulationParams,
    downpayment: f64,
) -> Result<Purchase, SimulationError> {
    if params.mortgage_years == 0 || params.mortgage_years > MAX_MORTGAGE_YEARS {
        return Err(SimulationError::HorizonOutOfRange {
            years: params.mortgage_years,
            max: MAX_MORTGAGE_YEARS,
        });
    }

    if !downpayment.is_finite() {
        return Err(SimulationError::InvalidArgument(format!(
            "downpayment must be a finite number, got {downpayment}"
        )));
    }

    let total_property_cost = params.total_property_cost();
    let mortgage_principal = total_property_cost - downpayment;

    if downpayment > params.cash_available {
        return Err(SimulationError::OverCommitment {
            downpayment,
            cash_available: params.cash_available,
        });
    }

    let initial_investment = params.cash_available - downpayment;
    let monthly_payment = if mortgage_principal <= 0.0 {
        0.0
    } else {
        mortgage_monthly_payment(
            mortgage_principal,
            params.mortgage_rate_annual_pct,
            params.mortgage_years,
        )?
    };

    Ok(Purchase {
        total_property_cost,
        mortgage_principal,
        initial_investment,
        monthly_payment,
        periods: params.horizon_months(),
    })
}

fn start_projection(params: &SimulationParams, purchase: &Purchase) -> Projection {
    Projection {
        balance: purchase.mortgage_principal.max(0.0),
        property_value: params.property_price,
        investment_value: purchase.initial_investment,
    }
}

fn build_scenario_result(
    purchase: &Purchase,
    downpayment: f64,
    projection: &Projection,
) -> ScenarioResult {
    let paid_over_term = purchase.monthly_payment * f64::from(purchase.periods);
    ScenarioResult {
        monthly_payment: purchase.monthly_payment,
        total_property_cost: purchase.total_property_cost,
        downpayment,
        initial_investment: purchase.initial_investment,
        mortgage_principal: purchase.mortgage_principal,
        interest_paid: paid_over_term - purchase.mortgage_principal,
        total_paid: paid_over_term + downpayment,
        final_property_value: projection.property_value,
        final_investment_value: projection.investment_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn sample_params() -> SimulationParams {
        SimulationParams::default()
    }

    fn compounded(start: f64, annual_pct: f64, months: u32) -> f64 {
        let mut value = start;
        let rate = monthly_rate_from_annual(annual_pct);
        for _ in 0..months {
            value *= 1.0 + rate;
        }
        value
    }

    #[test]
    fn reference_scenario_matches_closed_forms() {
        let params = sample_params();
        let result = simulate(&params, 60_000.0).expect("valid scenario");

        assert_approx(result.total_property_cost, 495_000.0);
        assert_approx(result.mortgage_principal, 435_000.0);
        assert_approx(result.initial_investment, 240_000.0);
        assert_approx(result.downpayment, 60_000.0);

        let payment =
            mortgage_monthly_payment(result.mortgage_principal, 3.5, 30).expect("valid loan");
        assert_eq!(result.monthly_payment, payment);
        assert_approx_tol(result.monthly_payment, 1_953.344_39, 1e-4);

        assert_eq!(result.interest_paid, payment * 360.0 - result.mortgage_principal);
        assert_eq!(result.total_paid, payment * 360.0 + 60_000.0);
        assert_eq!(result.final_property_value, compounded(450_000.0, 2.0, 360));
        assert_eq!(result.final_investment_value, compounded(240_000.0, 7.0, 360));

        assert_approx_tol(result.final_property_value, 450_000.0 * 1.02_f64.powi(30), 1e-3);
        assert_approx_tol(result.final_investment_value, 240_000.0 * 1.07_f64.powi(30), 1e-3);
    }

    #[test]
    fn overcommitted_downpayment_is_rejected() {
        let params = sample_params();
        let err = simulate(&params, 300_000.01).expect_err("must reject overcommitment");
        assert_eq!(
            err,
            SimulationError::OverCommitment {
                downpayment: 300_000.01,
                cash_available: 300_000.0,
            }
        );
    }

    #[test]
    fn non_finite_downpayment_is_rejected_before_amortizing() {
        let params = sample_params();
        for downpayment in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = simulate(&params, downpayment).expect_err("must reject non-finite downpayment");
            match err {
                SimulationError::InvalidArgument(msg) => {
                    assert!(msg.starts_with("downpayment must be a finite number"), "{msg}");
                }
                other => panic!("unexpected error {other:?}"),
            }
            assert!(run_yearly_trace(&params, downpayment).is_err());
        }
    }

    #[test]
    fn downpayment_equal_to_cash_leaves_nothing_invested() {
        let params = sample_params();
        let result = simulate(&params, params.cash_available).expect("valid scenario");
        assert_eq!(result.initial_investment, 0.0);
        assert_eq!(result.final_investment_value, 0.0);
        assert!(result.monthly_payment > 0.0);
    }

    #[test]
    fn cash_purchase_needs_no_mortgage_but_keeps_full_horizon() {
        let mut params = sample_params();
        params.cash_available = 600_000.0;
        let result = simulate(&params, 550_000.0).expect("valid scenario");

        assert_eq!(result.monthly_payment, 0.0);
        assert_approx(result.mortgage_principal, -55_000.0);
        assert_approx(result.interest_paid, 55_000.0);
        assert_eq!(result.total_paid, 550_000.0);
        assert_eq!(result.final_property_value, compounded(450_000.0, 2.0, 360));
        assert_eq!(result.final_investment_value, compounded(50_000.0, 7.0, 360));
    }

    #[test]
    fn zero_rate_mortgage_has_no_interest() {
        let mut params = sample_params();
        params.mortgage_rate_annual_pct = 0.0;
        let result = simulate(&params, 60_000.0).expect("valid scenario");
        assert_approx(result.monthly_payment, 435_000.0 / 360.0);
        assert_approx_tol(result.interest_paid, 0.0, 1e-6);
    }

    #[test]
    fn horizon_outside_bounds_is_rejected() {
        for years in [0, MAX_MORTGAGE_YEARS + 1] {
            let mut params = sample_params();
            params.mortgage_years = years;
            let err = simulate(&params, 60_000.0).expect_err("must reject horizon");
            assert_eq!(
                err,
                SimulationError::HorizonOutOfRange {
                    years,
                    max: MAX_MORTGAGE_YEARS,
                }
            );
        }
    }

    #[test]
    fn yearly_trace_ends_where_simulation_ends() {
        let params = sample_params();
        let result = simulate(&params, 60_000.0).expect("valid scenario");
        let trace = run_yearly_trace(&params, 60_000.0).expect("valid scenario");

        assert_eq!(trace.len(), 30);
        assert_eq!(trace[0].year, 1);
        let last = trace.last().expect("non-empty trace");
        assert_eq!(last.year, 30);
        assert_eq!(last.property_value, result.final_property_value);
        assert_eq!(last.investment_value, result.final_investment_value);
        assert_approx_tol(last.remaining_balance, 0.0, 1e-3);
    }

    #[test]
    fn yearly_trace_balance_is_non_increasing() {
        let params = sample_params();
        let trace = run_yearly_trace(&params, 60_000.0).expect("valid scenario");

        let mut previous = 435_000.0;
        for row in &trace {
            assert!(row.remaining_balance <= previous);
            assert!(row.interest_paid_in_year >= 0.0);
            previous = row.remaining_balance;
        }

        let interest: f64 = trace.iter().map(|row| row.interest_paid_in_year).sum();
        let principal: f64 = trace.iter().map(|row| row.principal_paid_in_year).sum();
        assert_approx_tol(principal, 435_000.0, 1e-3);
        assert_approx_tol(interest + principal, 1_953.344_391_968 * 360.0, 1e-2);
    }

    #[test]
    fn yearly_trace_rejects_overcommitment() {
        let params = sample_params();
        let err = run_yearly_trace(&params, 400_000.0).expect_err("must reject overcommitment");
        assert!(matches!(err, SimulationError::OverCommitment { .. }));
    }

    #[test]
    fn net_worth_combines_equity_and_investments() {
        let params = sample_params();
        let trace = run_yearly_trace(&params, 60_000.0).expect("valid scenario");
        let first = trace[0];
        assert_approx(
            first.net_worth(),
            first.property_value - first.remaining_balance + first.investment_value,
        );
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(32))]

        #[test]
        fn prop_simulate_is_idempotent(
            cash in 0u32..1_000_000,
            price in 10_000u32..2_000_000,
            taxes_bp in 0u32..2_000,
            rate_bp in 0u32..1_500,
            years in 1u32..41,
            invest_bp in -500i32..1_500,
            appreciation_bp in -500i32..1_000,
            downpayment_share in 0u32..101
        ) {
            let params = SimulationParams {
                cash_available: cash as f64,
                property_price: price as f64,
                taxes_pct: taxes_bp as f64 / 100.0,
                mortgage_rate_annual_pct: rate_bp as f64 / 100.0,
                mortgage_years: years,
                investment_return_annual_pct: invest_bp as f64 / 100.0,
                property_appreciation_annual_pct: appreciation_bp as f64 / 100.0,
            };
            let downpayment = params.cash_available * downpayment_share as f64 / 100.0;

            let first = simulate(&params, downpayment).expect("valid scenario");
            let second = simulate(&params, downpayment).expect("valid scenario");
            prop_assert_eq!(first, second);

            prop_assert!(first.monthly_payment >= 0.0);
            prop_assert!(first.initial_investment >= 0.0);
            prop_assert!(first.final_property_value.is_finite());
            prop_assert!(first.final_investment_value.is_finite());
            prop_assert_eq!(
                first.mortgage_principal,
                params.total_property_cost() - downpayment
            );
        }

        #[test]
        fn prop_no_mortgage_growth_ignores_balance(
            extra_cash in 0u32..500_000,
            price in 10_000u32..1_000_000,
            rate_bp in 0u32..1_500,
            years in 1u32..41
        ) {
            let mut params = SimulationParams::new(0.0, price as f64, 5.0, rate_bp as f64 / 100.0, years);
            let downpayment = params.total_property_cost();
            params.cash_available = downpayment + extra_cash as f64;

            let result = simulate(&params, downpayment).expect("valid scenario");
            let months = years * 12;
            prop_assert_eq!(result.monthly_payment, 0.0);
            prop_assert_eq!(result.final_property_value, compounded(params.property_price, 2.0, months));
            prop_assert_eq!(
                result.final_investment_value,
                compounded(params.cash_available - downpayment, 7.0, months)
            );
        }
    }
}
