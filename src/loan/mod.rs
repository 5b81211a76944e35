//! Fixed-rate loan amortization for the mortgage, loan and auto-loan calculators

mod engine;
mod schedule;

pub use engine::{amortize, monthly_payment, LoanInput, MAX_TERM_MONTHS};
pub use schedule::{AmortizationResult, AmortizationRow, AnnualSummaryRow};
