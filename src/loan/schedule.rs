//! Amortization output structures

use serde::{Deserialize, Serialize};

/// One month of the repayment schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// Payment number (1-indexed)
    pub period: u32,
    pub payment: f64,
    pub principal_paid: f64,
    pub interest_paid: f64,
    pub remaining_balance: f64,
}

/// One loan year of the repayment schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnualSummaryRow {
    /// Loan year (1-indexed)
    pub year: u32,
    pub principal_paid: f64,
    pub interest_paid: f64,
    /// Balance after the last payment in the year
    pub remaining_balance: f64,
}

/// Complete amortization result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationResult {
    /// Principal minus down payment
    pub financed_amount: f64,
    pub monthly_payment: f64,
    pub total_payment: f64,
    pub total_interest: f64,

    /// Monthly rows in payment order
    pub schedule: Vec<AmortizationRow>,
}

impl AmortizationResult {
    /// Roll the monthly schedule up into loan years
    ///
    /// A row is emitted after every 12th payment and after the final payment,
    /// so a 30-month loan yields years 1, 2 and a partial year 3.
    pub fn yearly_summary(&self) -> Vec<AnnualSummaryRow> {
        let mut years = Vec::with_capacity(self.schedule.len() / 12 + 1);
        let mut principal = 0.0;
        let mut interest = 0.0;
        let last_period = self.schedule.last().map(|r| r.period).unwrap_or(0);

        for row in &self.schedule {
            principal += row.principal_paid;
            interest += row.interest_paid;

            if row.period % 12 == 0 || row.period == last_period {
                years.push(AnnualSummaryRow {
                    year: (row.period + 11) / 12,
                    principal_paid: principal,
                    interest_paid: interest,
                    remaining_balance: row.remaining_balance,
                });
                principal = 0.0;
                interest = 0.0;
            }
        }

        years
    }

    /// Final balance after the last payment (≈0 for a complete schedule)
    pub fn final_balance(&self) -> f64 {
        self.schedule
            .last()
            .map(|r| r.remaining_balance)
            .unwrap_or(self.financed_amount)
    }
}
