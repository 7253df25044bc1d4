use clap::Args;
use serde_json::Value;

use bond_risk_core::fixed_income::analytics::{self, MetricKind};
use bond_risk_core::fixed_income::bond::Bond;

use super::RunContext;
use crate::input;

/// Arguments for single-bond metrics
#[derive(Args)]
pub struct BondArgs {
    /// Path to a bond record (JSON or YAML)
    #[arg(long)]
    pub input: Option<String>,
}

fn read_bond(args: &BondArgs) -> Result<Bond, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        input::file::read_structured(path)
    } else if let Some(data) = input::stdin::read_stdin()? {
        Ok(serde_json::from_value(data)?)
    } else {
        Err("--input <bond.json> or stdin required".into())
    }
}

fn run_metric(
    args: BondArgs,
    ctx: &RunContext,
    metric: MetricKind,
) -> Result<Value, Box<dyn std::error::Error>> {
    let bond = read_bond(&args)?;
    let result = analytics::bond_metric(
        &bond.terms,
        metric,
        ctx.frequency,
        ctx.settlement,
        &ctx.config,
    )?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_ytm(args: BondArgs, ctx: &RunContext) -> Result<Value, Box<dyn std::error::Error>> {
    run_metric(args, ctx, MetricKind::Ytm)
}

pub fn run_duration(args: BondArgs, ctx: &RunContext) -> Result<Value, Box<dyn std::error::Error>> {
    run_metric(args, ctx, MetricKind::MacaulayDuration)
}

pub fn run_modified_duration(
    args: BondArgs,
    ctx: &RunContext,
) -> Result<Value, Box<dyn std::error::Error>> {
    run_metric(args, ctx, MetricKind::ModifiedDuration)
}

pub fn run_analyze(args: BondArgs, ctx: &RunContext) -> Result<Value, Box<dyn std::error::Error>> {
    let bond = read_bond(&args)?;
    let result = analytics::analyze_bond(&bond.terms, ctx.frequency, ctx.settlement, &ctx.config)?;
    Ok(serde_json::to_value(result)?)
}
