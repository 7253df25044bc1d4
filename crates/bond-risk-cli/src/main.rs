mod commands;
mod input;
mod output;

use chrono::{Local, NaiveDate};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bond_risk_core::SolverConfig;
use commands::fixed_income::BondArgs;
use commands::portfolio::{PortfolioArgs, PositionsArgs};
use commands::RunContext;

/// Bond yield, duration and portfolio interest-rate risk
#[derive(Parser)]
#[command(
    name = "bpra",
    version,
    about = "Bond yield, duration and portfolio interest-rate risk",
    long_about = "Solves yield to maturity by Newton-Raphson from a bond's coupon \
                  schedule and market price, derives Macaulay and modified duration, \
                  and rolls bond durations up into a market-value-weighted portfolio \
                  duration. Inputs are JSON or YAML files, or JSON piped on stdin."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Settlement date (YYYY-MM-DD); defaults to today
    #[arg(long, global = true)]
    settlement: Option<NaiveDate>,

    /// Coupon payments per year; defaults to the configured frequency
    #[arg(long, global = true)]
    frequency: Option<u32>,

    /// Solver configuration file (JSON or YAML)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Yield to maturity of a single bond
    Ytm(BondArgs),
    /// Macaulay duration of a single bond
    Duration(BondArgs),
    /// Modified duration of a single bond
    ModifiedDuration(BondArgs),
    /// Yield, Macaulay and modified duration of a single bond
    Analyze(BondArgs),
    /// Weighted average modified duration of precomputed positions
    PortfolioDuration(PositionsArgs),
    /// Value every bond in a portfolio and aggregate its duration
    Portfolio(PortfolioArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_context(cli: &Cli) -> Result<RunContext, Box<dyn std::error::Error>> {
    let config = match cli.config {
        Some(ref path) => input::file::read_config(path)?,
        None => SolverConfig::default(),
    };
    let frequency = cli.frequency.unwrap_or(config.default_frequency);
    // The only wall-clock read: everything below takes the date explicitly.
    let settlement = cli.settlement.unwrap_or_else(|| Local::now().date_naive());
    tracing::info!(%settlement, frequency, "run context");
    Ok(RunContext {
        settlement,
        frequency,
        config,
    })
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> =
        build_context(&cli).and_then(|ctx| match cli.command {
            Commands::Ytm(args) => commands::fixed_income::run_ytm(args, &ctx),
            Commands::Duration(args) => commands::fixed_income::run_duration(args, &ctx),
            Commands::ModifiedDuration(args) => {
                commands::fixed_income::run_modified_duration(args, &ctx)
            }
            Commands::Analyze(args) => commands::fixed_income::run_analyze(args, &ctx),
            Commands::PortfolioDuration(args) => {
                commands::portfolio::run_portfolio_duration(args, &ctx)
            }
            Commands::Portfolio(args) => commands::portfolio::run_portfolio(args, &ctx),
            Commands::Version => {
                println!("bpra {}", env!("CARGO_PKG_VERSION"));
                process::exit(0);
            }
        });

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
