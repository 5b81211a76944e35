//! Annuity payment and month-by-month amortization schedule

use log::debug;
use serde::{Deserialize, Serialize};

use super::schedule::{AmortizationResult, AmortizationRow};
use crate::error::{require_finite, CalcError, CalcResult};

/// Longest accepted term (100 years of monthly payments)
pub const MAX_TERM_MONTHS: u32 = 1200;

/// Loan terms as entered on the calculator form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanInput {
    /// Purchase price or loan amount before the down payment
    pub principal: f64,

    /// Nominal annual rate in percent (5.0 = 5%)
    pub annual_rate_pct: f64,

    /// Number of monthly payments
    pub term_months: u32,

    /// Amount paid up front, subtracted from the principal
    #[serde(default)]
    pub down_payment: f64,
}

impl LoanInput {
    pub fn new(principal: f64, annual_rate_pct: f64, term_months: u32, down_payment: f64) -> Self {
        Self {
            principal,
            annual_rate_pct,
            term_months,
            down_payment,
        }
    }

    /// Amount actually financed
    pub fn financed_amount(&self) -> f64 {
        self.principal - self.down_payment
    }

    /// Monthly periodic rate as a decimal
    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate_pct / 100.0 / 12.0
    }

    fn validate(&self) -> CalcResult<()> {
        require_finite("principal", self.principal)?;
        require_finite("annual_rate_pct", self.annual_rate_pct)?;
        require_finite("down_payment", self.down_payment)?;

        if self.down_payment < 0.0 {
            return Err(CalcError::invalid_input(
                "down_payment",
                self.down_payment,
                "must not be negative",
            ));
        }
        if self.financed_amount() <= 0.0 {
            return Err(CalcError::invalid_input(
                "principal",
                self.principal,
                "principal minus down payment must be positive",
            ));
        }
        if self.annual_rate_pct <= 0.0 {
            return Err(CalcError::invalid_input(
                "annual_rate_pct",
                self.annual_rate_pct,
                "rate must be positive",
            ));
        }
        if self.term_months == 0 || self.term_months > MAX_TERM_MONTHS {
            return Err(CalcError::invalid_input(
                "term_months",
                self.term_months,
                format!("term must be between 1 and {} months", MAX_TERM_MONTHS),
            ));
        }
        Ok(())
    }
}

/// Level payment for a fixed-rate annuity
///
/// `payment = P * r * (1+r)^n / ((1+r)^n - 1)`
pub fn monthly_payment(loan: &LoanInput) -> CalcResult<f64> {
    loan.validate()?;

    let p = loan.financed_amount();
    let r = loan.monthly_rate();
    let n = i32::try_from(loan.term_months).map_err(|_| {
        CalcError::invalid_input("term_months", loan.term_months, "term is too long")
    })?;
    let growth = (1.0 + r).powi(n);

    // A rate too small to move (1+r)^n off 1.0 leaves a zero denominator
    require_finite("annual_rate_pct", p * r * growth / (growth - 1.0)).map_err(|_| {
        CalcError::invalid_input(
            "annual_rate_pct",
            loan.annual_rate_pct,
            "payment is not a finite number for this rate and term",
        )
    })
}

/// Build the full amortization schedule for a loan
///
/// Balances are carried unrounded from month to month; rounding belongs to
/// the presentation layer.
pub fn amortize(loan: &LoanInput) -> CalcResult<AmortizationResult> {
    let payment = monthly_payment(loan)?;
    let rate = loan.monthly_rate();
    let financed = loan.financed_amount();

    debug!(
        "amortizing {:.2} at {}% over {} months, payment {:.6}",
        financed, loan.annual_rate_pct, loan.term_months, payment
    );

    let mut balance = financed;
    let mut schedule = Vec::with_capacity(loan.term_months as usize);

    for period in 1..=loan.term_months {
        let interest = balance * rate;
        let principal = payment - interest;
        balance -= principal;

        schedule.push(AmortizationRow {
            period,
            payment,
            principal_paid: principal,
            interest_paid: interest,
            remaining_balance: balance,
        });
    }

    let total_payment = payment * loan.term_months as f64;

    Ok(AmortizationResult {
        financed_amount: financed,
        monthly_payment: payment,
        total_payment,
        total_interest: total_payment - financed,
        schedule,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn mortgage() -> LoanInput {
        LoanInput::new(100_000.0, 5.0, 360, 20_000.0)
    }

    #[test]
    fn test_reference_mortgage() {
        let result = amortize(&mortgage()).unwrap();

        assert_abs_diff_eq!(result.monthly_payment, 429.46, epsilon = 0.005);
        assert_abs_diff_eq!(result.total_interest, 74_605.60, epsilon = 0.5);
        assert_eq!(result.schedule.len(), 360);
    }

    #[test]
    fn test_schedule_sums() {
        let loan = LoanInput::new(25_000.0, 7.25, 60, 0.0);
        let result = amortize(&loan).unwrap();

        let principal: f64 = result.schedule.iter().map(|r| r.principal_paid).sum();
        let interest: f64 = result.schedule.iter().map(|r| r.interest_paid).sum();

        assert_abs_diff_eq!(principal, 25_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(interest, result.total_interest, epsilon = 1e-6);
    }

    #[test]
    fn test_balance_decreases_to_zero() {
        let result = amortize(&mortgage()).unwrap();

        let mut previous = result.financed_amount;
        for row in &result.schedule {
            assert!(row.remaining_balance < previous, "period {} did not decrease", row.period);
            previous = row.remaining_balance;
        }
        assert_abs_diff_eq!(previous, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_first_month_split() {
        let result = amortize(&mortgage()).unwrap();
        let first = &result.schedule[0];

        // 80,000 * 5% / 12
        assert_abs_diff_eq!(first.interest_paid, 333.333333, epsilon = 1e-5);
        assert_abs_diff_eq!(
            first.principal_paid,
            result.monthly_payment - first.interest_paid,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_single_period_loan() {
        let result = amortize(&LoanInput::new(1_000.0, 12.0, 1, 0.0)).unwrap();

        assert_abs_diff_eq!(result.monthly_payment, 1_010.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.schedule[0].remaining_balance, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rejects_degenerate_inputs() {
        let zero_financed = LoanInput::new(20_000.0, 5.0, 360, 20_000.0);
        let zero_rate = LoanInput::new(100_000.0, 0.0, 360, 0.0);
        let zero_term = LoanInput::new(100_000.0, 5.0, 0, 0.0);
        let negative_down = LoanInput::new(100_000.0, 5.0, 360, -1.0);
        let nan_rate = LoanInput::new(100_000.0, f64::NAN, 360, 0.0);

        for loan in [zero_financed, zero_rate, zero_term, negative_down, nan_rate] {
            let err = amortize(&loan).unwrap_err();
            assert_eq!(err.error_code(), "INVALID_INPUT", "{:?}", loan);
        }
    }

    #[test]
    fn test_rejects_rate_too_small_to_compound() {
        let loan = LoanInput::new(100_000.0, 1e-14, 360, 0.0);
        let err = amortize(&loan).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(monthly_payment(&loan).is_err());
    }

    #[test]
    fn test_term_upper_bound() {
        assert!(amortize(&LoanInput::new(100_000.0, 5.0, MAX_TERM_MONTHS, 0.0)).is_ok());

        let too_long = LoanInput::new(100_000.0, 5.0, MAX_TERM_MONTHS + 1, 0.0);
        assert_eq!(amortize(&too_long).unwrap_err().error_code(), "INVALID_INPUT");

        let wraps_i32 = LoanInput::new(100_000.0, 5.0, 3_000_000_000, 0.0);
        assert_eq!(monthly_payment(&wraps_i32).unwrap_err().error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_down_payment_defaults_to_zero() {
        let loan: LoanInput =
            serde_json::from_str(r#"{"principal": 1000, "annual_rate_pct": 6, "term_months": 12}"#)
                .unwrap();
        assert_eq!(loan.down_payment, 0.0);
        assert_eq!(loan.financed_amount(), 1000.0);
    }
}
