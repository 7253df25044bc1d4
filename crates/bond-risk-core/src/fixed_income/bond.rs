use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::BondRiskError;
use crate::types::{CouponRate, Money};
use crate::BondRiskResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Contractual terms and observed price of a fixed-coupon bond.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondTerms {
    /// Par value repaid at maturity (e.g. 1000)
    pub face_value: Money,
    /// Observed (dirty) market price
    pub market_price: Money,
    /// Annual coupon rate with its unit
    pub coupon_rate: CouponRate,
    /// Principal repayment date
    pub maturity_date: NaiveDate,
    /// Scheduled coupon dates; past dates are allowed and ignored
    #[serde(default)]
    pub coupon_dates: Vec<NaiveDate>,
}

/// A bond record as handed over by the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bond {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isin: Option<String>,
    #[serde(flatten)]
    pub terms: BondTerms,
}

/// Money converted to `f64` once per calculation, ahead of any iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CashFlowAmounts {
    pub face_value: f64,
    pub coupon_payment: f64,
    pub market_price: f64,
    /// Normalised annual coupon rate as a fraction
    pub coupon_rate: f64,
}

// ---------------------------------------------------------------------------
// Validation and conversion
// ---------------------------------------------------------------------------

impl BondTerms {
    pub fn validate(&self) -> BondRiskResult<()> {
        if self.face_value <= Decimal::ZERO {
            return Err(BondRiskError::InvalidInput {
                field: "face_value".into(),
                reason: "Face value must be positive".into(),
            });
        }
        if self.market_price <= Decimal::ZERO {
            return Err(BondRiskError::InvalidInput {
                field: "market_price".into(),
                reason: "Market price must be positive".into(),
            });
        }
        if self.coupon_rate.as_fraction() < Decimal::ZERO {
            return Err(BondRiskError::InvalidInput {
                field: "coupon_rate".into(),
                reason: "Coupon rate must be non-negative".into(),
            });
        }
        Ok(())
    }

    /// Per-period coupon = face * rate / frequency, computed in Decimal.
    pub fn coupon_payment(&self, frequency: u32) -> BondRiskResult<Money> {
        validate_frequency(frequency)?;
        self.face_value
            .checked_mul(self.coupon_rate.as_fraction())
            .and_then(|annual| annual.checked_div(Decimal::from(frequency)))
            .ok_or_else(|| BondRiskError::InvalidInput {
                field: "coupon_rate".into(),
                reason: format!(
                    "Coupon on face value {} at rate {} overflows",
                    self.face_value,
                    self.coupon_rate.as_fraction()
                ),
            })
    }

    /// The Decimal/f64 boundary: validates, then converts each amount once.
    pub fn cash_flow_amounts(&self, frequency: u32) -> BondRiskResult<CashFlowAmounts> {
        self.validate()?;
        let coupon_payment = self.coupon_payment(frequency)?;
        Ok(CashFlowAmounts {
            face_value: to_f64(self.face_value, "face_value")?,
            coupon_payment: to_f64(coupon_payment, "coupon_payment")?,
            market_price: to_f64(self.market_price, "market_price")?,
            coupon_rate: to_f64(self.coupon_rate.as_fraction(), "coupon_rate")?,
        })
    }
}

pub(crate) fn validate_frequency(frequency: u32) -> BondRiskResult<()> {
    if frequency == 0 {
        return Err(BondRiskError::InvalidInput {
            field: "frequency".into(),
            reason: "Coupon frequency must be a positive number of payments per year".into(),
        });
    }
    Ok(())
}

pub(crate) fn to_f64(value: Decimal, field: &str) -> BondRiskResult<f64> {
    value
        .to_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| BondRiskError::InvalidInput {
            field: field.into(),
            reason: format!("{value} cannot be represented as a float"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn terms() -> BondTerms {
        BondTerms {
            face_value: dec!(1000),
            market_price: dec!(980),
            coupon_rate: CouponRate::Percent(dec!(4.00)),
            maturity_date: NaiveDate::from_ymd_opt(2027, 1, 15).unwrap(),
            coupon_dates: vec![],
        }
    }

    #[test]
    fn test_coupon_payment_semi_annual() {
        assert_eq!(terms().coupon_payment(2).unwrap(), dec!(20));
    }

    #[test]
    fn test_cash_flow_amounts() {
        let amounts = terms().cash_flow_amounts(2).unwrap();
        assert_eq!(
            amounts,
            CashFlowAmounts {
                face_value: 1000.0,
                coupon_payment: 20.0,
                market_price: 980.0,
                coupon_rate: 0.04,
            }
        );
    }

    #[test]
    fn test_zero_frequency_rejected() {
        assert!(terms().coupon_payment(0).is_err());
    }

    #[test]
    fn test_coupon_overflow_is_an_input_error() {
        let mut t = terms();
        t.face_value = Decimal::MAX / dec!(2);
        t.coupon_rate = CouponRate::Fraction(dec!(3));
        assert!(t.validate().is_ok());

        let err = t.coupon_payment(2).unwrap_err();
        assert!(matches!(err, BondRiskError::InvalidInput { ref field, .. } if field == "coupon_rate"));
        assert!(t.cash_flow_amounts(2).is_err());
    }

    #[test]
    fn test_non_positive_amounts_rejected() {
        let mut t = terms();
        t.market_price = Decimal::ZERO;
        assert!(t.validate().is_err());

        let mut t = terms();
        t.face_value = dec!(-1);
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_negative_coupon_rejected() {
        let mut t = terms();
        t.coupon_rate = CouponRate::Fraction(dec!(-0.01));
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_bond_record_from_json() {
        let json = r#"{
            "id": 7,
            "portfolio_id": 3,
            "isin": "US0000000001",
            "face_value": "1000.00",
            "market_price": 995.5,
            "coupon_rate": 4.25,
            "maturity_date": "2030-01-15",
            "coupon_dates": ["2025-07-15", "2026-01-15"]
        }"#;
        let bond: Bond = serde_json::from_str(json).unwrap();

        assert_eq!(bond.id, 7);
        assert_eq!(bond.isin.as_deref(), Some("US0000000001"));
        assert_eq!(bond.terms.market_price, dec!(995.5));
        assert_eq!(bond.terms.coupon_rate.as_fraction(), dec!(0.0425));
        assert_eq!(bond.terms.coupon_dates.len(), 2);
    }
}
