//! Amortize a block of loans from CSV
//!
//! Reads loans (LoanId, Principal, AnnualRatePct, TermMonths, DownPayment),
//! amortizes them in parallel and writes one summary row per loan. Loans
//! with invalid terms are reported in the Error column instead of stopping
//! the run.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use calculator_engines::format::round_money;
use calculator_engines::{amortize, LoanInput};
use clap::Parser;
use log::warn;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Parser)]
#[command(name = "amortize_batch", about = "Amortize every loan in a CSV file")]
struct Args {
    /// Input CSV of loans
    input: PathBuf,

    /// Output summary CSV
    #[arg(long, default_value = "amortization_summary.csv")]
    output: PathBuf,
}

/// Raw CSV row matching the loan file columns
#[derive(Debug, Deserialize)]
struct LoanRow {
    #[serde(rename = "LoanId")]
    loan_id: String,
    #[serde(rename = "Principal")]
    principal: f64,
    #[serde(rename = "AnnualRatePct")]
    annual_rate_pct: f64,
    #[serde(rename = "TermMonths")]
    term_months: u32,
    #[serde(rename = "DownPayment", default)]
    down_payment: Option<f64>,
}

/// Summary for one loan; amounts are rounded to cents
#[derive(Debug, Default, Serialize)]
struct SummaryRow {
    #[serde(rename = "LoanId")]
    loan_id: String,
    #[serde(rename = "FinancedAmount")]
    financed_amount: f64,
    #[serde(rename = "MonthlyPayment")]
    monthly_payment: f64,
    #[serde(rename = "TotalPayment")]
    total_payment: f64,
    #[serde(rename = "TotalInterest")]
    total_interest: f64,
    #[serde(rename = "Error")]
    error: Option<String>,
}

fn load_loans(path: &Path) -> Result<Vec<LoanRow>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut reader = csv::Reader::from_reader(file);
    let mut loans = Vec::new();
    for (i, result) in reader.deserialize().enumerate() {
        let row: LoanRow = result.with_context(|| format!("Bad loan record {}", i + 1))?;
        loans.push(row);
    }
    Ok(loans)
}

fn summarize(row: &LoanRow) -> SummaryRow {
    let loan = LoanInput::new(
        row.principal,
        row.annual_rate_pct,
        row.term_months,
        row.down_payment.unwrap_or(0.0),
    );
    match amortize(&loan) {
        Ok(result) => SummaryRow {
            loan_id: row.loan_id.clone(),
            financed_amount: round_money(result.financed_amount),
            monthly_payment: round_money(result.monthly_payment),
            total_payment: round_money(result.total_payment),
            total_interest: round_money(result.total_interest),
            error: None,
        },
        Err(e) => {
            warn!("loan {}: {}", row.loan_id, e);
            SummaryRow {
                loan_id: row.loan_id.clone(),
                error: Some(e.to_string()),
                ..Default::default()
            }
        }
    }
}

fn write_summaries<W: io::Write>(out: W, rows: &[SummaryRow]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write summary for {}", row.loan_id))?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();
    println!("Loading loans from {}...", args.input.display());
    let loans = load_loans(&args.input)?;
    println!("Loaded {} loans in {:?}", loans.len(), start.elapsed());

    let calc_start = Instant::now();
    let summaries: Vec<SummaryRow> = loans.par_iter().map(summarize).collect();
    println!("Amortization complete in {:?}", calc_start.elapsed());

    let file = File::create(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    write_summaries(file, &summaries)?;
    println!("Output written to {}", args.output.display());

    let failed = summaries.iter().filter(|r| r.error.is_some()).count();
    let total_interest: f64 = summaries.iter().map(|r| r.total_interest).sum();
    println!("\nBlock Summary:");
    println!("  Loans:          {} ({} rejected)", summaries.len(), failed);
    println!("  Total interest: ${:.2}", total_interest);
    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
