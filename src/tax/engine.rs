//! Progressive marginal-bracket income tax

use log::debug;
use serde::{Deserialize, Serialize};

use super::brackets::{FilingStatus, TaxTable, TaxTables};
use crate::error::{require_finite, CalcError, CalcResult};

/// Income tax question for one filer and year
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxInput {
    pub gross_income: f64,
    pub filing_status: FilingStatus,
    pub year: i32,
}

/// Tax owed on one bracket slice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BracketSlice {
    pub rate: f64,
    /// Income taxed at this rate
    pub taxable_amount: f64,
    pub tax: f64,
}

/// Result of walking the bracket ladder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxResult {
    pub standard_deduction: f64,
    pub taxable_income: f64,
    pub total_tax: f64,
    /// Rate of the last bracket touched
    pub marginal_rate: f64,
    /// total_tax / taxable_income (0 when nothing is taxable)
    pub effective_rate: f64,
    pub slices: Vec<BracketSlice>,
}

/// Look up the table for the input's year and compute the tax
pub fn compute_tax(input: &TaxInput, tables: &TaxTables) -> CalcResult<TaxResult> {
    let table = tables.table_for(input.year)?;
    compute_tax_with_table(input, table)
}

/// Compute tax against an explicit table
///
/// The table year must match the input year; the engine itself holds no
/// year-specific data.
pub fn compute_tax_with_table(input: &TaxInput, table: &TaxTable) -> CalcResult<TaxResult> {
    require_finite("gross_income", input.gross_income)?;
    if input.gross_income < 0.0 {
        return Err(CalcError::invalid_input(
            "gross_income",
            input.gross_income,
            "must not be negative",
        ));
    }
    if table.year != input.year {
        return Err(CalcError::unsupported_year(input.year, "tax"));
    }

    let standard_deduction = table.standard_deduction(input.filing_status);
    let taxable_income = (input.gross_income - standard_deduction).max(0.0);
    let brackets = table.ladder(input.filing_status).brackets();

    let mut total_tax = 0.0;
    let mut marginal_rate = brackets[0].rate;
    let mut slices = Vec::new();
    let mut lower = 0.0;

    for bracket in brackets {
        if taxable_income <= lower {
            break;
        }
        let upper = bracket
            .upper_limit
            .map_or(taxable_income, |limit| limit.min(taxable_income));
        let amount = upper - lower;
        let tax = amount * bracket.rate;

        total_tax += tax;
        marginal_rate = bracket.rate;
        slices.push(BracketSlice {
            rate: bracket.rate,
            taxable_amount: amount,
            tax,
        });

        match bracket.upper_limit {
            Some(limit) => lower = limit,
            None => break,
        }
    }

    let effective_rate = if taxable_income > 0.0 {
        total_tax / taxable_income
    } else {
        0.0
    };

    debug!(
        "{} {} gross {:.2}: taxable {:.2}, tax {:.2}, marginal {}",
        input.year,
        input.filing_status.as_str(),
        input.gross_income,
        taxable_income,
        total_tax,
        marginal_rate
    );

    Ok(TaxResult {
        standard_deduction,
        taxable_income,
        total_tax,
        marginal_rate,
        effective_rate,
        slices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn input(gross_income: f64, filing_status: FilingStatus, year: i32) -> TaxInput {
        TaxInput {
            gross_income,
            filing_status,
            year,
        }
    }

    #[test]
    fn test_single_2024_reference() {
        let tables = TaxTables::us_federal();
        let result = compute_tax(&input(60_000.0, FilingStatus::Single, 2024), &tables).unwrap();

        assert_abs_diff_eq!(result.standard_deduction, 14_600.0);
        assert_abs_diff_eq!(result.taxable_income, 45_400.0);
        // 10% of 11,600 + 12% of (45,400 - 11,600)
        assert_abs_diff_eq!(result.total_tax, 5_216.0, epsilon = 1e-6);
        assert_eq!(result.marginal_rate, 0.12);
        assert_eq!(result.slices.len(), 2);
    }

    #[test]
    fn test_income_below_deduction() {
        let tables = TaxTables::us_federal();
        let result = compute_tax(&input(10_000.0, FilingStatus::Single, 2024), &tables).unwrap();

        assert_eq!(result.taxable_income, 0.0);
        assert_eq!(result.total_tax, 0.0);
        assert_eq!(result.effective_rate, 0.0);
        assert_eq!(result.marginal_rate, 0.10);
        assert!(result.slices.is_empty());
    }

    #[test]
    fn test_top_bracket() {
        let tables = TaxTables::us_federal();
        let result =
            compute_tax(&input(1_000_000.0, FilingStatus::MarriedJointly, 2024), &tables).unwrap();

        assert_eq!(result.marginal_rate, 0.37);
        assert_eq!(result.slices.len(), 7);
        let sliced: f64 = result.slices.iter().map(|s| s.taxable_amount).sum();
        assert_abs_diff_eq!(sliced, result.taxable_income, epsilon = 1e-6);
    }

    #[test]
    fn test_income_exactly_at_limit() {
        let tables = TaxTables::us_federal();
        // taxable = 11,600 lands exactly on the first limit
        let result = compute_tax(&input(26_200.0, FilingStatus::Single, 2024), &tables).unwrap();

        assert_abs_diff_eq!(result.total_tax, 1_160.0, epsilon = 1e-9);
        assert_eq!(result.marginal_rate, 0.10);
    }

    #[test]
    fn test_monotonic_and_effective_below_marginal() {
        let tables = TaxTables::us_federal();
        for status in FilingStatus::ALL {
            let mut previous = 0.0;
            for step in 0..200 {
                let gross = step as f64 * 5_000.0;
                let result = compute_tax(&input(gross, status, 2023), &tables).unwrap();
                assert!(result.total_tax >= previous, "{:?} at {}", status, gross);
                assert!(result.effective_rate <= result.marginal_rate + 1e-12);
                previous = result.total_tax;
            }
        }
    }

    #[test]
    fn test_unsupported_year() {
        let tables = TaxTables::us_federal();
        let err = compute_tax(&input(50_000.0, FilingStatus::Single, 2019), &tables).unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_YEAR");
    }

    #[test]
    fn test_table_year_mismatch() {
        let table = crate::tax::us_federal_2023();
        let err = compute_tax_with_table(&input(50_000.0, FilingStatus::Single, 2024), &table)
            .unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_YEAR");
    }

    #[test]
    fn test_rejects_negative_income() {
        let tables = TaxTables::us_federal();
        assert!(compute_tax(&input(-1.0, FilingStatus::Single, 2024), &tables).is_err());
        assert!(compute_tax(&input(f64::NAN, FilingStatus::Single, 2024), &tables).is_err());
    }
}
