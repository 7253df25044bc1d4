pub mod config;
pub mod error;
pub mod types;

#[cfg(feature = "fixed_income")]
pub mod fixed_income;

#[cfg(feature = "portfolio")]
pub mod portfolio;

pub use config::SolverConfig;
pub use error::BondRiskError;
pub use types::*;

/// Standard result type for all bond-risk operations
pub type BondRiskResult<T> = Result<T, BondRiskError>;
