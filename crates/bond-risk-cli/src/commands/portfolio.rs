use clap::Args;
use serde_json::Value;

use bond_risk_core::portfolio::duration::{self, BondPortfolio, PortfolioDurationInput};

use super::RunContext;
use crate::input;

/// Arguments for aggregating precomputed positions
#[derive(Args)]
pub struct PositionsArgs {
    /// Path to a positions file: {"positions": [{"market_value", "modified_duration"}]}
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_portfolio_duration(
    args: PositionsArgs,
    ctx: &RunContext,
) -> Result<Value, Box<dyn std::error::Error>> {
    let positions: PortfolioDurationInput = if let Some(ref path) = args.input {
        input::file::read_structured(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <positions.json> or stdin required for portfolio duration".into());
    };
    let result = duration::weighted_average_duration(&positions, &ctx.config)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for a full portfolio roll-up
#[derive(Args)]
pub struct PortfolioArgs {
    /// Path to a portfolio record with its bonds (JSON or YAML)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_portfolio(
    args: PortfolioArgs,
    ctx: &RunContext,
) -> Result<Value, Box<dyn std::error::Error>> {
    let portfolio: BondPortfolio = if let Some(ref path) = args.input {
        input::file::read_structured(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <portfolio.json> or stdin required for portfolio".into());
    };
    let result = duration::portfolio_duration_from_bonds(
        &portfolio,
        ctx.frequency,
        ctx.settlement,
        &ctx.config,
    )?;
    Ok(serde_json::to_value(result)?)
}
