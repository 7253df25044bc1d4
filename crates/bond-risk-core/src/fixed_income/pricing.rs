//! Discrete discounting of a [`CashFlowSchedule`] at an annual yield with
//! fractional-year exponents, plus the analytic slope used by the YTM solver.
//!
//! Amounts arrive as `f64`; the conversion from `Decimal` money happens once
//! in the caller, outside any iteration loop.

use crate::error::BondRiskError;
use crate::BondRiskResult;

use super::schedule::CashFlowSchedule;

/// PV = sum_t [ coupon / (1+y)^t ] + face / (1+y)^T
pub fn price(
    face_value: f64,
    coupon_payment: f64,
    annual_yield: f64,
    schedule: &CashFlowSchedule,
) -> BondRiskResult<f64> {
    let base = discount_base(annual_yield)?;

    let coupons: f64 = schedule
        .coupon_times
        .iter()
        .map(|&t| coupon_payment / base.powf(t))
        .sum();
    let principal = face_value / base.powf(schedule.maturity_time);

    finite(coupons + principal, "bond price")
}

/// dPV/dy = sum_t [ -t * coupon * (1+y)^(-t-1) ] - T * face * (1+y)^(-T-1)
pub fn price_derivative(
    face_value: f64,
    coupon_payment: f64,
    annual_yield: f64,
    schedule: &CashFlowSchedule,
) -> BondRiskResult<f64> {
    let base = discount_base(annual_yield)?;

    let coupons: f64 = schedule
        .coupon_times
        .iter()
        .map(|&t| -t * coupon_payment * base.powf(-t - 1.0))
        .sum();
    let t_mat = schedule.maturity_time;
    let principal = -t_mat * face_value * base.powf(-t_mat - 1.0);

    finite(coupons + principal, "price derivative")
}

/// `1 + y`, rejected unless strictly positive and finite.
pub(crate) fn discount_base(annual_yield: f64) -> BondRiskResult<f64> {
    let base = 1.0 + annual_yield;
    if !base.is_finite() || base <= 0.0 {
        return Err(BondRiskError::domain(format!(
            "yield {annual_yield} makes (1 + y) non-positive or non-finite"
        )));
    }
    Ok(base)
}

pub(crate) fn finite(value: f64, what: &str) -> BondRiskResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(BondRiskError::domain(format!("{what} is not finite ({value})")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn semi_annual(years: u32) -> CashFlowSchedule {
        CashFlowSchedule {
            coupon_times: (1..=years * 2).map(|i| i as f64 * 0.5).collect(),
            maturity_time: years as f64,
        }
    }

    #[test]
    fn test_zero_yield_price_is_sum_of_flows() {
        let schedule = semi_annual(2);
        let p = price(1000.0, 20.0, 0.0, &schedule).unwrap();
        assert_relative_eq!(p, 1080.0);
    }

    #[test]
    fn test_single_flow_discounting() {
        let schedule = CashFlowSchedule {
            coupon_times: vec![],
            maturity_time: 2.0,
        };
        let p = price(1000.0, 0.0, 0.05, &schedule).unwrap();
        assert_relative_eq!(p, 1000.0 / 1.1025, epsilon = 1e-9);
    }

    #[test]
    fn test_price_decreases_with_yield() {
        let schedule = semi_annual(5);
        let low = price(1000.0, 25.0, 0.03, &schedule).unwrap();
        let high = price(1000.0, 25.0, 0.07, &schedule).unwrap();
        assert!(low > high, "price should fall as yield rises: {low} vs {high}");
    }

    #[test]
    fn test_derivative_matches_finite_difference() {
        let schedule = semi_annual(10);
        let y = 0.045;
        let h = 1e-6;
        let up = price(1000.0, 22.5, y + h, &schedule).unwrap();
        let down = price(1000.0, 22.5, y - h, &schedule).unwrap();
        let numeric = (up - down) / (2.0 * h);
        let analytic = price_derivative(1000.0, 22.5, y, &schedule).unwrap();

        assert!(analytic < 0.0);
        assert_relative_eq!(analytic, numeric, max_relative = 1e-6);
    }

    #[test]
    fn test_derivative_zero_when_all_flows_at_settlement() {
        let schedule = CashFlowSchedule {
            coupon_times: vec![],
            maturity_time: 0.0,
        };
        assert_eq!(price(1000.0, 0.0, 0.05, &schedule).unwrap(), 1000.0);
        assert_eq!(price_derivative(1000.0, 0.0, 0.05, &schedule).unwrap(), 0.0);
    }

    #[test]
    fn test_yield_at_minus_one_is_domain_error() {
        let schedule = semi_annual(1);
        assert!(matches!(
            price(1000.0, 20.0, -1.0, &schedule),
            Err(BondRiskError::Domain { .. })
        ));
        assert!(matches!(
            price_derivative(1000.0, 20.0, -1.5, &schedule),
            Err(BondRiskError::Domain { .. })
        ));
    }

    #[test]
    fn test_nan_yield_is_domain_error() {
        assert!(price(1000.0, 20.0, f64::NAN, &semi_annual(1)).is_err());
    }

    #[test]
    fn test_overflowing_price_is_domain_error() {
        let schedule = CashFlowSchedule {
            coupon_times: vec![],
            maturity_time: 400.0,
        };
        // (1e-9)^400 underflows to zero
        assert!(price(1000.0, 0.0, -0.999_999_999, &schedule).is_err());
    }
}
