use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::config::SolverConfig;
use crate::error::BondRiskError;
use crate::types::Rate;
use crate::BondRiskResult;

use super::bond::BondTerms;
use super::pricing::{price, price_derivative};
use super::schedule::{build_schedule_with_basis, CashFlowSchedule};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Why the Newton-Raphson loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// |price - market| fell below the tolerance.
    Converged,
    /// The price slope was exactly zero; the last guess is returned.
    DerivativeVanished,
    /// The iteration cap was reached; the last guess is returned.
    IterationLimit,
}

/// Solved yield to maturity plus the diagnostics needed to tell a converged
/// answer from a best-effort one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldSolution {
    /// Annual yield as a decimal fraction, rounded half-up.
    pub ytm: Rate,
    /// Unrounded final iterate.
    pub raw_yield: f64,
    /// Price evaluations performed.
    pub iterations: u32,
    pub termination: Termination,
    /// Model price minus market price at `raw_yield`.
    pub residual: f64,
}

impl YieldSolution {
    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }

    /// Warning text for a best-effort answer, `None` when converged.
    pub fn warning(&self) -> Option<String> {
        match self.termination {
            Termination::Converged => None,
            Termination::DerivativeVanished => Some(format!(
                "YTM derivative is zero; returning last estimate {} (residual {:e})",
                self.ytm, self.residual
            )),
            Termination::IterationLimit => Some(format!(
                "YTM did not converge after {} iterations; returning best estimate {} (residual {:e})",
                self.iterations, self.ytm, self.residual
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Solve for the annual yield that reprices `terms` to its market price.
///
/// Starts from the normalised coupon rate and takes Newton-Raphson steps on
/// `price(y) - market_price`. Never fails for lack of convergence: the last
/// iterate is returned and flagged through [`YieldSolution::termination`].
/// Fails with a domain error if an iterate reaches `1 + y <= 0`.
pub fn solve_ytm(
    terms: &BondTerms,
    frequency: u32,
    settlement: NaiveDate,
    config: &SolverConfig,
) -> BondRiskResult<YieldSolution> {
    config.validate()?;
    let amounts = terms.cash_flow_amounts(frequency)?;
    let schedule = build_schedule_with_basis(
        settlement,
        terms.maturity_date,
        &terms.coupon_dates,
        config.days_per_year,
    )?;

    let (raw_yield, iterations, termination, residual) = newton_raphson(
        amounts.face_value,
        amounts.coupon_payment,
        amounts.market_price,
        amounts.coupon_rate,
        &schedule,
        config,
    )?;

    let ytm = round_half_up(raw_yield, config.yield_scale)?;

    debug!(
        %ytm,
        raw_yield,
        iterations,
        ?termination,
        residual,
        flows = schedule.flow_count(),
        "solved yield to maturity"
    );

    Ok(YieldSolution {
        ytm,
        raw_yield,
        iterations,
        termination,
        residual,
    })
}

/// Round half-up (away from zero at the midpoint) to `scale` places.
pub fn round_half_up(value: f64, scale: u32) -> BondRiskResult<Decimal> {
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero))
        .ok_or_else(|| BondRiskError::domain(format!("{value} cannot be represented as a decimal")))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn newton_raphson(
    face_value: f64,
    coupon_payment: f64,
    market_price: f64,
    initial_guess: f64,
    schedule: &CashFlowSchedule,
    config: &SolverConfig,
) -> BondRiskResult<(f64, u32, Termination, f64)> {
    let mut y = initial_guess;
    let mut iterations = 0;

    for _ in 0..config.max_iterations {
        iterations += 1;

        let diff = price(face_value, coupon_payment, y, schedule)? - market_price;
        if diff.abs() < config.tolerance {
            return Ok((y, iterations, Termination::Converged, diff));
        }

        let slope = price_derivative(face_value, coupon_payment, y, schedule)?;
        if slope == 0.0 {
            warn!(yield_guess = y, diff, "price derivative vanished, stopping");
            return Ok((y, iterations, Termination::DerivativeVanished, diff));
        }

        y -= diff / slope;
        trace!(iteration = iterations, yield_guess = y, diff, slope, "newton step");
    }

    // The last step may have landed inside tolerance without being checked.
    let residual = price(face_value, coupon_payment, y, schedule)? - market_price;
    if residual.abs() < config.tolerance {
        return Ok((y, iterations, Termination::Converged, residual));
    }
    warn!(
        iterations,
        yield_guess = y,
        residual,
        "yield solver hit the iteration cap"
    );
    Ok((y, iterations, Termination::IterationLimit, residual))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
