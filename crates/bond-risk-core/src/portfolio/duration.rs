use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::config::{SolverConfig, DEFAULT_WEIGHT_SCALE};
use crate::error::BondRiskError;
use crate::fixed_income::analytics::bond_modified_duration;
use crate::fixed_income::bond::{to_f64, Bond};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::BondRiskResult;

use super::parallel::maybe_parallel_map;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One holding as seen by the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondPosition {
    /// Position market value (>= 0)
    pub market_value: Money,
    /// Modified duration computed for the bond
    pub modified_duration: f64,
}

/// Input for aggregating precomputed positions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioDurationInput {
    pub positions: Vec<BondPosition>,
}

/// A portfolio record as handed over by the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondPortfolio {
    pub id: i64,
    pub portfolio_name: String,
    #[serde(default)]
    pub bonds: Vec<Bond>,
}

/// A position's share of the portfolio duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionContribution {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bond_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isin: Option<String>,
    pub market_value: Money,
    /// market_value / total, rounded half-up
    pub weight: Rate,
    pub modified_duration: f64,
    /// weight * modified_duration
    pub contribution: f64,
}

/// Market-value-weighted portfolio duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioDurationOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio_name: Option<String>,
    pub weighted_modified_duration: f64,
    pub total_market_value: Money,
    pub positions: Vec<PositionContribution>,
}

struct Aggregate {
    total: Money,
    weights: Vec<Rate>,
    contributions: Vec<f64>,
    weighted_duration: f64,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Weighted average modified duration with weights rounded half-up to 8 dp.
///
/// Returns 0.0 for an empty portfolio or one with zero total value.
pub fn calculate_portfolio_duration(positions: &[BondPosition]) -> BondRiskResult<f64> {
    calculate_portfolio_duration_with_scale(positions, DEFAULT_WEIGHT_SCALE)
}

/// Same as [`calculate_portfolio_duration`] with an explicit weight scale.
pub fn calculate_portfolio_duration_with_scale(
    positions: &[BondPosition],
    weight_scale: u32,
) -> BondRiskResult<f64> {
    Ok(aggregate(positions, weight_scale)?.weighted_duration)
}

/// Aggregate precomputed positions and report each one's contribution.
pub fn weighted_average_duration(
    input: &PortfolioDurationInput,
    config: &SolverConfig,
) -> BondRiskResult<ComputationOutput<PortfolioDurationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let agg = aggregate(&input.positions, config.weight_scale)?;
    if input.positions.is_empty() {
        warnings.push("Portfolio has no positions; duration reported as 0".into());
    } else if agg.total.is_zero() {
        warnings.push("Total market value is zero; duration reported as 0".into());
    }

    let positions = input
        .positions
        .iter()
        .enumerate()
        .map(|(i, p)| PositionContribution {
            bond_id: None,
            isin: None,
            market_value: p.market_value,
            weight: agg.weights[i],
            modified_duration: p.modified_duration,
            contribution: agg.contributions[i],
        })
        .collect();

    let output = PortfolioDurationOutput {
        portfolio_id: None,
        portfolio_name: None,
        weighted_modified_duration: agg.weighted_duration,
        total_market_value: agg.total,
        positions,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Market-value-weighted average modified duration",
        &aggregation_assumptions(config),
        warnings,
        elapsed,
        output,
    ))
}

/// Value every bond in the portfolio, then aggregate by market price.
///
/// Each holding is one unit at its market price. The first failing bond, in
/// input order, aborts the roll-up.
pub fn portfolio_duration_from_bonds(
    portfolio: &BondPortfolio,
    frequency: u32,
    settlement: NaiveDate,
    config: &SolverConfig,
) -> BondRiskResult<ComputationOutput<PortfolioDurationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let valued = maybe_parallel_map(&portfolio.bonds, config, |bond| {
        bond_modified_duration(&bond.terms, frequency, settlement, config)
    });

    let mut positions: Vec<BondPosition> = Vec::with_capacity(valued.len());
    for (bond, result) in portfolio.bonds.iter().zip(valued) {
        let (modified_duration, solution) = result?;
        if let Some(w) = solution.warning() {
            warnings.push(format!("bond {}: {w}", bond.id));
        }
        positions.push(BondPosition {
            market_value: bond.terms.market_price,
            modified_duration,
        });
    }

    let agg = aggregate(&positions, config.weight_scale)?;
    if portfolio.bonds.is_empty() {
        warnings.push("Portfolio has no bonds; duration reported as 0".into());
    }

    debug!(
        portfolio_id = portfolio.id,
        bonds = portfolio.bonds.len(),
        total = %agg.total,
        duration = agg.weighted_duration,
        "aggregated portfolio duration"
    );

    let contributions = portfolio
        .bonds
        .iter()
        .zip(&positions)
        .enumerate()
        .map(|(i, (bond, p))| PositionContribution {
            bond_id: Some(bond.id),
            isin: bond.isin.clone(),
            market_value: p.market_value,
            weight: agg.weights[i],
            modified_duration: p.modified_duration,
            contribution: agg.contributions[i],
        })
        .collect();

    let output = PortfolioDurationOutput {
        portfolio_id: Some(portfolio.id),
        portfolio_name: Some(portfolio.portfolio_name.clone()),
        weighted_modified_duration: agg.weighted_duration,
        total_market_value: agg.total,
        positions: contributions,
    };

    let mut assumptions = aggregation_assumptions(config);
    assumptions["settlement_date"] = serde_json::json!(settlement.to_string());
    assumptions["coupon_frequency"] = serde_json::json!(frequency);
    assumptions["position_size"] = serde_json::json!("one unit at market price");

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Portfolio modified duration (per-bond YTM, market-value weights)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn aggregate(positions: &[BondPosition], weight_scale: u32) -> BondRiskResult<Aggregate> {
    let mut total = Decimal::ZERO;
    for (i, p) in positions.iter().enumerate() {
        if p.market_value < Decimal::ZERO {
            return Err(BondRiskError::InvalidInput {
                field: format!("positions[{i}].market_value"),
                reason: "Market value must be non-negative".into(),
            });
        }
        if !p.modified_duration.is_finite() {
            return Err(BondRiskError::InvalidInput {
                field: format!("positions[{i}].modified_duration"),
                reason: "Modified duration must be finite".into(),
            });
        }
        total = total
            .checked_add(p.market_value)
            .ok_or_else(|| BondRiskError::domain("total market value overflows"))?;
    }

    if total.is_zero() {
        return Ok(Aggregate {
            total,
            weights: vec![Decimal::ZERO; positions.len()],
            contributions: vec![0.0; positions.len()],
            weighted_duration: 0.0,
        });
    }

    let mut weights = Vec::with_capacity(positions.len());
    let mut contributions = Vec::with_capacity(positions.len());
    let mut weighted_duration = 0.0;

    for p in positions {
        let weight = (p.market_value / total)
            .round_dp_with_strategy(weight_scale, RoundingStrategy::MidpointAwayFromZero);
        let contribution = to_f64(weight, "weight")? * p.modified_duration;
        weighted_duration += contribution;
        weights.push(weight);
        contributions.push(contribution);
    }

    Ok(Aggregate {
        total,
        weights,
        contributions,
        weighted_duration,
    })
}

fn aggregation_assumptions(config: &SolverConfig) -> serde_json::Value {
    serde_json::json!({
        "weighting": "market value",
        "weight_rounding": format!("half-up to {} dp", config.weight_scale),
        "empty_or_zero_value": "0.0",
    })
}
