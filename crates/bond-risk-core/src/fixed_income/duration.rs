use crate::error::BondRiskError;
use crate::BondRiskResult;

use super::bond::validate_frequency;
use super::pricing::{discount_base, finite};
use super::schedule::CashFlowSchedule;

/// Macaulay duration in years:
///
/// (sum_t [ t * coupon / (1+y)^t ] + T * face / (1+y)^T) / market_price
///
/// Divides by the observed market price rather than the model price, so the
/// two only agree once `ytm` reprices the bond.
pub fn macaulay_duration(
    face_value: f64,
    coupon_payment: f64,
    ytm: f64,
    schedule: &CashFlowSchedule,
    market_price: f64,
) -> BondRiskResult<f64> {
    if market_price <= 0.0 || !market_price.is_finite() {
        return Err(BondRiskError::domain(format!(
            "Macaulay duration: market price must be positive, got {market_price}"
        )));
    }
    let base = discount_base(ytm)?;

    let coupons: f64 = schedule
        .coupon_times
        .iter()
        .map(|&t| t * (coupon_payment / base.powf(t)))
        .sum();
    let t_mat = schedule.maturity_time;
    let principal = t_mat * (face_value / base.powf(t_mat));

    finite((coupons + principal) / market_price, "Macaulay duration")
}

/// Modified duration = Macaulay / (1 + y / frequency).
pub fn modified_duration(macaulay: f64, ytm: f64, frequency: u32) -> BondRiskResult<f64> {
    validate_frequency(frequency)?;
    let denominator = 1.0 + ytm / f64::from(frequency);
    if denominator <= 0.0 || !denominator.is_finite() {
        return Err(BondRiskError::domain(format!(
            "modified duration: (1 + y/{frequency}) is non-positive for y = {ytm}"
        )));
    }
    finite(macaulay / denominator, "modified duration")
}
