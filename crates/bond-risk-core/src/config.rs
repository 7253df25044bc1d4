use serde::{Deserialize, Serialize};

use crate::error::BondRiskError;
use crate::BondRiskResult;

/// Newton-Raphson iteration cap.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Price-unit convergence tolerance.
pub const DEFAULT_TOLERANCE: f64 = 1e-8;

/// Decimal places kept on the solved yield.
pub const DEFAULT_YIELD_SCALE: u32 = 6;

/// Decimal places kept on portfolio weights.
pub const DEFAULT_WEIGHT_SCALE: u32 = 8;

/// Actual/365.25 day basis.
pub const DEFAULT_DAYS_PER_YEAR: f64 = 365.25;

/// Semi-annual coupons.
pub const DEFAULT_FREQUENCY: u32 = 2;

/// Portfolios larger than this are valued on the rayon pool when the
/// `parallel` feature is enabled.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 64;

/// Numerical settings shared by the solver, the duration engine and the
/// portfolio roll-up. Every field has a default, so a partial file is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub max_iterations: u32,
    pub tolerance: f64,
    pub yield_scale: u32,
    pub weight_scale: u32,
    pub days_per_year: f64,
    pub default_frequency: u32,
    pub parallel_threshold: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
            yield_scale: DEFAULT_YIELD_SCALE,
            weight_scale: DEFAULT_WEIGHT_SCALE,
            days_per_year: DEFAULT_DAYS_PER_YEAR,
            default_frequency: DEFAULT_FREQUENCY,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl SolverConfig {
    pub fn from_json_str(s: &str) -> BondRiskResult<Self> {
        let config: SolverConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(s: &str) -> BondRiskResult<Self> {
        let config: SolverConfig = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> BondRiskResult<()> {
        if self.max_iterations == 0 {
            return Err(BondRiskError::InvalidInput {
                field: "max_iterations".into(),
                reason: "At least one iteration is required".into(),
            });
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(BondRiskError::InvalidInput {
                field: "tolerance".into(),
                reason: "Tolerance must be a positive finite number".into(),
            });
        }
        if !self.days_per_year.is_finite() || self.days_per_year <= 0.0 {
            return Err(BondRiskError::InvalidInput {
                field: "days_per_year".into(),
                reason: "Day basis must be a positive finite number".into(),
            });
        }
        if self.default_frequency == 0 {
            return Err(BondRiskError::InvalidInput {
                field: "default_frequency".into(),
                reason: "Coupon frequency must be positive".into(),
            });
        }
        // Decimal supports at most 28 fractional digits.
        if self.yield_scale > 28 || self.weight_scale > 28 {
            return Err(BondRiskError::InvalidInput {
                field: "yield_scale/weight_scale".into(),
                reason: "Rounding scale must not exceed 28".into(),
            });
        }
        Ok(())
    }

    /// Whether a batch of `len` items should be fanned out across threads.
    pub fn should_parallelize(&self, len: usize) -> bool {
        len > self.parallel_threshold
    }
}
