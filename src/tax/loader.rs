//! CSV-based tax table loader
//!
//! Loads bracket ladders and standard deductions from data/tax/ so that a new
//! tax year is a data change, not a code change.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use csv::Reader;
use log::info;

use super::brackets::{BracketLadder, FilingStatus, TaxBracket, TaxTable, TaxTables};
use crate::error::{CalcError, CalcResult};

/// Default path to the tax table directory
pub const DEFAULT_TAX_PATH: &str = "data/tax";

const BRACKETS_FILE: &str = "brackets.csv";
const DEDUCTIONS_FILE: &str = "standard_deductions.csv";

/// Raw CSV row matching brackets.csv columns
#[derive(Debug, serde::Deserialize)]
struct BracketRow {
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "FilingStatus")]
    filing_status: String,
    #[serde(rename = "Rate")]
    rate: f64,
    /// Empty for the unbounded top bracket
    #[serde(rename = "UpperLimit")]
    upper_limit: Option<f64>,
}

/// Raw CSV row matching standard_deductions.csv columns
#[derive(Debug, serde::Deserialize)]
struct DeductionRow {
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "FilingStatus")]
    filing_status: String,
    #[serde(rename = "Deduction")]
    deduction: f64,
}

fn read_rows<T, R>(reader: R, source: &str) -> CalcResult<Vec<T>>
where
    T: serde::de::DeserializeOwned,
    R: Read,
{
    let mut csv_reader = Reader::from_reader(reader);
    let mut rows = Vec::new();
    for result in csv_reader.deserialize() {
        let row: T = result.map_err(|e| CalcError::data_load(source, e))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Build tax tables from bracket and deduction CSV readers
pub fn load_tax_tables_from_readers<B: Read, D: Read>(
    brackets: B,
    deductions: D,
) -> CalcResult<TaxTables> {
    let bracket_rows: Vec<BracketRow> = read_rows(brackets, BRACKETS_FILE)?;
    let deduction_rows: Vec<DeductionRow> = read_rows(deductions, DEDUCTIONS_FILE)?;

    let mut ladders: BTreeMap<i32, BTreeMap<FilingStatus, Vec<TaxBracket>>> = BTreeMap::new();
    for row in bracket_rows {
        let status = FilingStatus::parse(&row.filing_status)?;
        ladders
            .entry(row.year)
            .or_default()
            .entry(status)
            .or_default()
            .push(TaxBracket {
                rate: row.rate,
                upper_limit: row.upper_limit,
            });
    }

    let mut deductions_by_year: BTreeMap<i32, BTreeMap<FilingStatus, f64>> = BTreeMap::new();
    for row in deduction_rows {
        let status = FilingStatus::parse(&row.filing_status)?;
        deductions_by_year
            .entry(row.year)
            .or_default()
            .insert(status, row.deduction);
    }

    let mut tables = TaxTables::new();
    for (year, by_status) in ladders {
        let mut year_ladders = BTreeMap::new();
        for (status, mut brackets) in by_status {
            // Unbounded bracket sorts last
            brackets.sort_by(|a, b| {
                let a = a.upper_limit.unwrap_or(f64::INFINITY);
                let b = b.upper_limit.unwrap_or(f64::INFINITY);
                a.total_cmp(&b)
            });
            year_ladders.insert(status, BracketLadder::new(brackets)?);
        }
        let deductions = deductions_by_year.remove(&year).unwrap_or_default();
        tables.insert(TaxTable::new(year, year_ladders, deductions)?);
    }

    if let Some(year) = deductions_by_year.keys().next() {
        return Err(CalcError::invalid_config(format!(
            "standard deductions given for {} but no brackets",
            year
        )));
    }

    Ok(tables)
}

/// Load tax tables from a directory holding brackets.csv and standard_deductions.csv
pub fn load_tax_tables(path: &Path) -> CalcResult<TaxTables> {
    let brackets_path = path.join(BRACKETS_FILE);
    let deductions_path = path.join(DEDUCTIONS_FILE);

    let brackets = std::fs::File::open(&brackets_path)
        .map_err(|e| CalcError::data_load(brackets_path.display().to_string(), e))?;
    let deductions = std::fs::File::open(&deductions_path)
        .map_err(|e| CalcError::data_load(deductions_path.display().to_string(), e))?;

    let tables = load_tax_tables_from_readers(brackets, deductions)?;
    info!("loaded tax tables for {:?} from {}", tables.years(), path.display());
    Ok(tables)
}

/// Load tax tables from the default location
pub fn load_default_tax_tables() -> CalcResult<TaxTables> {
    load_tax_tables(Path::new(DEFAULT_TAX_PATH))
}
