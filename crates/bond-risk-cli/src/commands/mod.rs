pub mod fixed_income;
pub mod portfolio;

use bond_risk_core::SolverConfig;
use chrono::NaiveDate;

/// Resolved global options shared by every command.
pub struct RunContext {
    pub settlement: NaiveDate,
    pub frequency: u32,
    pub config: SolverConfig,
}
