use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::SolverConfig;
use crate::error::BondRiskError;
use crate::types::{with_metadata, ComputationOutput, Rate};
use crate::BondRiskResult;

use super::bond::BondTerms;
use super::duration::{macaulay_duration, modified_duration};
use super::schedule::build_schedule_with_basis;
use super::yields::{solve_ytm, Termination, YieldSolution};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which single figure to report for a bond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Ytm,
    MacaulayDuration,
    ModifiedDuration,
}

/// Yield and duration figures for one bond.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondAnalytics {
    /// Yield to maturity, decimal fraction rounded half-up
    pub ytm: Rate,
    /// Cash-flow weighted average time, in years
    pub macaulay_duration: f64,
    /// Macaulay / (1 + ytm / frequency)
    pub modified_duration: f64,
    /// False when the yield is a best-effort estimate
    pub converged: bool,
    pub termination: Termination,
    pub iterations: u32,
    /// Model price minus market price at the unrounded yield
    pub residual: f64,
}

/// A single requested figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondMetric {
    pub metric: MetricKind,
    pub value: f64,
    pub ytm: Rate,
    pub converged: bool,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Solve the yield, then derive Macaulay and modified duration from the
/// rounded yield.
pub fn analyze_bond(
    terms: &BondTerms,
    frequency: u32,
    settlement: NaiveDate,
    config: &SolverConfig,
) -> BondRiskResult<ComputationOutput<BondAnalytics>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let solution = solve_ytm(terms, frequency, settlement, config)?;
    if let Some(w) = solution.warning() {
        warnings.push(w);
    }
    let output = durations_at_solution(terms, frequency, settlement, config, &solution)?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Bond YTM (Newton-Raphson) with Macaulay and modified duration",
        &assumptions(frequency, settlement, config),
        warnings,
        elapsed,
        output,
    ))
}

/// Report one figure, the way the per-bond metric endpoints do.
pub fn bond_metric(
    terms: &BondTerms,
    metric: MetricKind,
    frequency: u32,
    settlement: NaiveDate,
    config: &SolverConfig,
) -> BondRiskResult<ComputationOutput<BondMetric>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let solution = solve_ytm(terms, frequency, settlement, config)?;
    if let Some(w) = solution.warning() {
        warnings.push(w);
    }

    let value = match metric {
        MetricKind::Ytm => ytm_as_f64(&solution)?,
        MetricKind::MacaulayDuration | MetricKind::ModifiedDuration => {
            let a = durations_at_solution(terms, frequency, settlement, config, &solution)?;
            if metric == MetricKind::MacaulayDuration {
                a.macaulay_duration
            } else {
                a.modified_duration
            }
        }
    };

    let output = BondMetric {
        metric,
        value,
        ytm: solution.ytm,
        converged: solution.converged(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Bond metric (Newton-Raphson YTM, cash-flow weighted duration)",
        &assumptions(frequency, settlement, config),
        warnings,
        elapsed,
        output,
    ))
}

/// Modified duration only, without the envelope. Used by the portfolio
/// roll-up for each holding.
pub fn bond_modified_duration(
    terms: &BondTerms,
    frequency: u32,
    settlement: NaiveDate,
    config: &SolverConfig,
) -> BondRiskResult<(f64, YieldSolution)> {
    let solution = solve_ytm(terms, frequency, settlement, config)?;
    let a = durations_at_solution(terms, frequency, settlement, config, &solution)?;
    Ok((a.modified_duration, solution))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn durations_at_solution(
    terms: &BondTerms,
    frequency: u32,
    settlement: NaiveDate,
    config: &SolverConfig,
    solution: &YieldSolution,
) -> BondRiskResult<BondAnalytics> {
    let amounts = terms.cash_flow_amounts(frequency)?;
    let schedule = build_schedule_with_basis(
        settlement,
        terms.maturity_date,
        &terms.coupon_dates,
        config.days_per_year,
    )?;
    let ytm = ytm_as_f64(solution)?;

    let macaulay = macaulay_duration(
        amounts.face_value,
        amounts.coupon_payment,
        ytm,
        &schedule,
        amounts.market_price,
    )?;
    let modified = modified_duration(macaulay, ytm, frequency)?;

    Ok(BondAnalytics {
        ytm: solution.ytm,
        macaulay_duration: macaulay,
        modified_duration: modified,
        converged: solution.converged(),
        termination: solution.termination,
        iterations: solution.iterations,
        residual: solution.residual,
    })
}

fn ytm_as_f64(solution: &YieldSolution) -> BondRiskResult<f64> {
    solution
        .ytm
        .to_f64()
        .ok_or_else(|| BondRiskError::domain(format!("yield {} is not representable", solution.ytm)))
}

fn assumptions(frequency: u32, settlement: NaiveDate, config: &SolverConfig) -> serde_json::Value {
    serde_json::json!({
        "settlement_date": settlement.to_string(),
        "coupon_frequency": frequency,
        "day_count": format!("Actual/{}", config.days_per_year),
        "compounding": "annual, fractional-year exponents",
        "max_iterations": config.max_iterations,
        "tolerance": config.tolerance,
        "initial_guess": "coupon rate",
        "ytm_rounding": format!("half-up to {} dp", config.yield_scale),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CouponRate;
    use chrono::Months;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn settlement() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    fn terms(price: Decimal, rate: CouponRate) -> BondTerms {
        let dates: Vec<NaiveDate> = (1..=4)
            .map(|i| settlement().checked_add_months(Months::new(6 * i)).unwrap())
            .collect();
        BondTerms {
            face_value: dec!(1000),
            market_price: price,
            coupon_rate: rate,
            maturity_date: *dates.last().unwrap(),
            coupon_dates: dates,
        }
    }

    #[test]
    fn test_analyze_discount_bond() {
        let out = analyze_bond(
            &terms(dec!(980), CouponRate::Percent(dec!(4.00))),
            2,
            settlement(),
            &SolverConfig::default(),
        )
        .unwrap();
        let a = &out.result;

        assert!(a.converged);
        assert!(out.warnings.is_empty());
        assert!(a.macaulay_duration > 1.9 && a.macaulay_duration < 2.0);
        assert!(a.modified_duration < a.macaulay_duration);
        let expected_mod = a.macaulay_duration / (1.0 + a.ytm.to_f64().unwrap() / 2.0);
        assert!((a.modified_duration - expected_mod).abs() < 1e-12);
    }

    #[test]
    fn test_units_give_identical_analytics() {
        let config = SolverConfig::default();
        let a = analyze_bond(
            &terms(dec!(1010), CouponRate::Percent(dec!(5.5))),
            2,
            settlement(),
            &config,
        )
        .unwrap();
        let b = analyze_bond(
            &terms(dec!(1010), CouponRate::Fraction(dec!(0.055))),
            2,
            settlement(),
            &config,
        )
        .unwrap();
        assert_eq!(a.result, b.result);
    }

    #[test]
    fn test_bond_metric_matches_analytics() {
        let config = SolverConfig::default();
        let t = terms(dec!(980), CouponRate::Fraction(dec!(0.04)));
        let full = analyze_bond(&t, 2, settlement(), &config).unwrap().result;

        let ytm = bond_metric(&t, MetricKind::Ytm, 2, settlement(), &config).unwrap();
        let mac = bond_metric(&t, MetricKind::MacaulayDuration, 2, settlement(), &config).unwrap();
        let md = bond_metric(&t, MetricKind::ModifiedDuration, 2, settlement(), &config).unwrap();

        assert_eq!(ytm.result.value, full.ytm.to_f64().unwrap());
        assert_eq!(mac.result.value, full.macaulay_duration);
        assert_eq!(md.result.value, full.modified_duration);
        assert_eq!(
            bond_modified_duration(&t, 2, settlement(), &config).unwrap().0,
            full.modified_duration
        );
    }

    #[test]
    fn test_best_effort_is_flagged() {
        let config = SolverConfig {
            max_iterations: 1,
            ..SolverConfig::default()
        };
        let out = analyze_bond(
            &terms(dec!(900), CouponRate::Fraction(dec!(0.04))),
            2,
            settlement(),
            &config,
        )
        .unwrap();
        assert!(!out.result.converged);
        assert_eq!(out.result.termination, Termination::IterationLimit);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_assumptions_record_settlement() {
        let out = bond_metric(
            &terms(dec!(980), CouponRate::Fraction(dec!(0.04))),
            MetricKind::Ytm,
            2,
            settlement(),
            &SolverConfig::default(),
        )
        .unwrap();
        assert_eq!(out.assumptions["settlement_date"], "2025-01-15");
        assert_eq!(out.assumptions["coupon_frequency"], 2);
    }
}
