use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Year fractions. Kept in f64: they only ever feed fractional exponents.
pub type Years = f64;

/// Annual coupon rate with an explicit unit.
///
/// Serialises as `{"fraction": "0.04"}` or `{"percent": "4.00"}`. A bare
/// number is also accepted on input and goes through [`CouponRate::infer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "CouponRateRepr")]
pub enum CouponRate {
    /// Already a decimal fraction (0.04 = 4%).
    Fraction(Rate),
    /// Whole-number percentage (4.00 = 4%).
    Percent(Decimal),
}

impl CouponRate {
    /// Guess the unit of an untyped rate: anything with a non-zero integer
    /// part is read as a percentage, everything else as a fraction.
    ///
    /// Misreads rates of 100% or more given as fractions, and rates below 1%
    /// given as percentages. Only use it where the source carries no unit.
    pub fn infer(raw: Decimal) -> Self {
        if raw.trunc() > Decimal::ZERO {
            CouponRate::Percent(raw)
        } else {
            CouponRate::Fraction(raw)
        }
    }

    /// The rate as a decimal fraction.
    pub fn as_fraction(&self) -> Rate {
        match *self {
            CouponRate::Fraction(r) => r,
            CouponRate::Percent(p) => p / Decimal::ONE_HUNDRED,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CouponRateRepr {
    Tagged(TaggedCouponRate),
    Raw(Decimal),
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum TaggedCouponRate {
    Fraction(Rate),
    Percent(Decimal),
}

impl From<CouponRateRepr> for CouponRate {
    fn from(repr: CouponRateRepr) -> Self {
        match repr {
            CouponRateRepr::Tagged(TaggedCouponRate::Fraction(r)) => CouponRate::Fraction(r),
            CouponRateRepr::Tagged(TaggedCouponRate::Percent(p)) => CouponRate::Percent(p),
            CouponRateRepr::Raw(raw) => CouponRate::infer(raw),
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "decimal_money_f64_yield".to_string(),
        },
    }
}
