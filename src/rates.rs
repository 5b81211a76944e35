//! Interest-rate equivalence between compounding frequencies
//!
//! Every conversion goes through the effective annual rate, which makes the
//! result independent of the path taken: monthly → quarterly → monthly
//! returns the starting rate up to floating error.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{require_finite, CalcError, CalcResult};

/// Nominal rate quoted with one compounding frequency, to be re-quoted with another
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateConversionInput {
    /// Nominal annual rate in percent
    pub nominal_rate_pct: f64,
    /// Compounding periods per year of the quoted rate (12 = monthly)
    pub source_periods_per_year: u32,
    /// Compounding periods per year wanted
    pub target_periods_per_year: u32,
}

fn validate_periods(field: &str, periods: u32) -> CalcResult<f64> {
    if periods == 0 {
        return Err(CalcError::invalid_input(
            field,
            periods,
            "must be at least one period per year",
        ));
    }
    Ok(periods as f64)
}

fn validate_rate(nominal_rate_pct: f64) -> CalcResult<f64> {
    require_finite("nominal_rate_pct", nominal_rate_pct)?;
    if nominal_rate_pct < 0.0 {
        return Err(CalcError::invalid_input(
            "nominal_rate_pct",
            nominal_rate_pct,
            "must not be negative",
        ));
    }
    Ok(nominal_rate_pct / 100.0)
}

/// Huge nominal rates overflow `powf`; report that instead of returning infinity
fn finite_rate(rate: f64) -> CalcResult<f64> {
    if rate.is_finite() {
        Ok(rate)
    } else {
        Err(CalcError::invalid_input(
            "nominal_rate_pct",
            rate,
            "rate is too large to compound",
        ))
    }
}

/// Effective annual rate (APY) in percent for a nominal rate compounded `periods_per_year` times
pub fn effective_annual_rate_pct(nominal_rate_pct: f64, periods_per_year: u32) -> CalcResult<f64> {
    let nominal = validate_rate(nominal_rate_pct)?;
    let m = validate_periods("periods_per_year", periods_per_year)?;

    finite_rate(((1.0 + nominal / m).powf(m) - 1.0) * 100.0)
}

/// Equivalent nominal rate in percent at the target compounding frequency
pub fn convert_rate(input: &RateConversionInput) -> CalcResult<f64> {
    let nominal = validate_rate(input.nominal_rate_pct)?;
    let source = validate_periods("source_periods_per_year", input.source_periods_per_year)?;
    let target = validate_periods("target_periods_per_year", input.target_periods_per_year)?;

    let effective = (1.0 + nominal / source).powf(source) - 1.0;
    let converted = target * ((1.0 + effective).powf(1.0 / target) - 1.0);

    debug!(
        "rate {}% x{} -> {:.10}% x{} (effective {:.10}%)",
        input.nominal_rate_pct,
        input.source_periods_per_year,
        converted * 100.0,
        input.target_periods_per_year,
        effective * 100.0
    );

    finite_rate(effective)?;
    finite_rate(converted * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn input(rate: f64, source: u32, target: u32) -> RateConversionInput {
        RateConversionInput {
            nominal_rate_pct: rate,
            source_periods_per_year: source,
            target_periods_per_year: target,
        }
    }

    #[test]
    fn test_monthly_to_annual() {
        // 12% compounded monthly is 12.6825% effective
        let annual = convert_rate(&input(12.0, 12, 1)).unwrap();
        assert_abs_diff_eq!(annual, 12.682503, epsilon = 1e-6);
    }

    #[test]
    fn test_same_frequency_is_identity() {
        let rate = convert_rate(&input(4.5, 4, 4)).unwrap();
        assert_relative_eq!(rate, 4.5, max_relative = 1e-12);
    }

    #[test]
    fn test_round_trip() {
        let periods = [1, 2, 4, 12, 52, 365];
        for &rate in &[0.5, 3.0, 7.25, 18.0, 35.0] {
            for &a in &periods {
                for &b in &periods {
                    let there = convert_rate(&input(rate, a, b)).unwrap();
                    let back = convert_rate(&input(there, b, a)).unwrap();
                    assert_relative_eq!(back, rate, max_relative = 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_zero_rate() {
        assert_eq!(convert_rate(&input(0.0, 12, 1)).unwrap(), 0.0);
    }

    #[test]
    fn test_effective_annual_rate() {
        let apy = effective_annual_rate_pct(5.0, 12).unwrap();
        assert_abs_diff_eq!(apy, 5.116190, epsilon = 1e-6);

        let same = effective_annual_rate_pct(5.0, 1).unwrap();
        assert_relative_eq!(same, 5.0, max_relative = 1e-12);
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        assert!(convert_rate(&input(5.0, 0, 12)).is_err());
        assert!(convert_rate(&input(5.0, 12, 0)).is_err());
        assert!(convert_rate(&input(-1.0, 12, 1)).is_err());
        assert!(convert_rate(&input(f64::INFINITY, 12, 1)).is_err());
        assert!(effective_annual_rate_pct(5.0, 0).is_err());
    }

    #[test]
    fn test_rejects_rate_that_overflows() {
        let err = convert_rate(&input(1e30, 12, 1)).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(effective_annual_rate_pct(1e30, 12).is_err());
    }
}
