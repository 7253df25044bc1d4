use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_DAYS_PER_YEAR;
use crate::error::BondRiskError;
use crate::types::Years;
use crate::BondRiskResult;

/// Future cash-flow times, in years from settlement.
///
/// Coupon times keep the relative order of the source dates. Principal is a
/// separate flow even when the final coupon falls on the maturity date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowSchedule {
    pub coupon_times: Vec<Years>,
    pub maturity_time: Years,
}

impl CashFlowSchedule {
    /// Total number of discounted flows (coupons + principal).
    pub fn flow_count(&self) -> usize {
        self.coupon_times.len() + 1
    }
}

/// Build the schedule on an Actual/365.25 basis.
///
/// Coupon dates on or before `settlement` are dropped. Fails if `maturity`
/// precedes `settlement`.
pub fn build_schedule(
    settlement: NaiveDate,
    maturity: NaiveDate,
    coupon_dates: &[NaiveDate],
) -> BondRiskResult<CashFlowSchedule> {
    build_schedule_with_basis(settlement, maturity, coupon_dates, DEFAULT_DAYS_PER_YEAR)
}

/// Same as [`build_schedule`] with an explicit days-per-year divisor.
pub fn build_schedule_with_basis(
    settlement: NaiveDate,
    maturity: NaiveDate,
    coupon_dates: &[NaiveDate],
    days_per_year: f64,
) -> BondRiskResult<CashFlowSchedule> {
    if maturity < settlement {
        return Err(BondRiskError::InvalidDateOrdering {
            settlement,
            maturity,
        });
    }
    if !days_per_year.is_finite() || days_per_year <= 0.0 {
        return Err(BondRiskError::InvalidInput {
            field: "days_per_year".into(),
            reason: "Day basis must be a positive finite number".into(),
        });
    }

    let coupon_times = coupon_dates
        .iter()
        .filter(|date| **date > settlement)
        .map(|date| year_fraction(settlement, *date, days_per_year))
        .collect();

    Ok(CashFlowSchedule {
        coupon_times,
        maturity_time: year_fraction(settlement, maturity, days_per_year),
    })
}

/// Whole elapsed days between two dates divided by the day basis.
pub fn year_fraction(from: NaiveDate, to: NaiveDate, days_per_year: f64) -> Years {
    (to - from).num_days() as f64 / days_per_year
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Months;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_past_and_settlement_dated_coupons_dropped() {
        let settlement = date(2025, 1, 15);
        let coupons = vec![
            date(2024, 7, 15),
            date(2025, 1, 15),
            date(2025, 7, 15),
            date(2026, 1, 15),
        ];
        let schedule = build_schedule(settlement, date(2026, 1, 15), &coupons).unwrap();

        assert_eq!(schedule.coupon_times.len(), 2);
        assert_relative_eq!(schedule.coupon_times[0], 181.0 / 365.25);
        assert_relative_eq!(schedule.coupon_times[1], 365.0 / 365.25);
    }

    #[test]
    fn test_order_preserved() {
        let settlement = date(2025, 1, 1);
        let coupons = vec![date(2026, 1, 1), date(2025, 7, 1)];
        let schedule = build_schedule(settlement, date(2026, 1, 1), &coupons).unwrap();

        assert!(schedule.coupon_times[0] > schedule.coupon_times[1]);
    }

    #[test]
    fn test_final_coupon_not_merged_with_principal() {
        let settlement = date(2025, 1, 15);
        let maturity = date(2027, 1, 15);
        let coupons: Vec<NaiveDate> = (1..=4)
            .map(|i| settlement.checked_add_months(Months::new(6 * i)).unwrap())
            .collect();
        let schedule = build_schedule(settlement, maturity, &coupons).unwrap();

        assert_eq!(schedule.flow_count(), 5);
        assert_eq!(schedule.coupon_times[3], schedule.maturity_time);
        assert_relative_eq!(schedule.maturity_time, 730.0 / 365.25);
    }

    #[test]
    fn test_empty_coupon_dates() {
        let schedule = build_schedule(date(2025, 1, 1), date(2030, 1, 1), &[]).unwrap();
        assert!(schedule.coupon_times.is_empty());
        assert_relative_eq!(schedule.maturity_time, 1826.0 / 365.25);
    }

    #[test]
    fn test_maturity_on_settlement_is_zero() {
        let schedule = build_schedule(date(2025, 1, 1), date(2025, 1, 1), &[]).unwrap();
        assert_eq!(schedule.maturity_time, 0.0);
    }

    #[test]
    fn test_maturity_before_settlement_rejected() {
        let err = build_schedule(date(2025, 1, 2), date(2025, 1, 1), &[]).unwrap_err();
        assert!(matches!(err, BondRiskError::InvalidDateOrdering { .. }));
    }

    #[test]
    fn test_custom_basis() {
        let schedule =
            build_schedule_with_basis(date(2025, 1, 1), date(2026, 1, 1), &[], 365.0).unwrap();
        assert_relative_eq!(schedule.maturity_time, 1.0);
    }

    #[test]
    fn test_invalid_basis_rejected() {
        assert!(build_schedule_with_basis(date(2025, 1, 1), date(2026, 1, 1), &[], 0.0).is_err());
    }
}
