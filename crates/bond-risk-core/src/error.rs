use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BondRiskError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid date ordering: maturity {maturity} precedes settlement {settlement}")]
    InvalidDateOrdering {
        settlement: NaiveDate,
        maturity: NaiveDate,
    },

    #[error("Domain error: {context}")]
    Domain { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl BondRiskError {
    pub(crate) fn domain(context: impl Into<String>) -> Self {
        BondRiskError::Domain {
            context: context.into(),
        }
    }
}

impl From<serde_json::Error> for BondRiskError {
    fn from(e: serde_json::Error) -> Self {
        BondRiskError::SerializationError(e.to_string())
    }
}

impl From<serde_yaml::Error> for BondRiskError {
    fn from(e: serde_yaml::Error) -> Self {
        BondRiskError::SerializationError(e.to_string())
    }
}
