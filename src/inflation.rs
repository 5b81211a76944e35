//! CPI-based inflation adjustment
//!
//! CPI history is reference data: a built-in US CPI-U annual-average table,
//! replaceable by data/cpi.csv.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use csv::Reader;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{require_finite, CalcError, CalcResult};

/// Default path to the CPI table
pub const DEFAULT_CPI_PATH: &str = "data/cpi.csv";

/// US CPI-U, annual average (1982-84 = 100)
const CPI_U_ANNUAL: [(i32, f64); 34] = [
    (1990, 130.7),
    (1991, 136.2),
    (1992, 140.3),
    (1993, 144.5),
    (1994, 148.2),
    (1995, 152.4),
    (1996, 156.9),
    (1997, 160.5),
    (1998, 163.0),
    (1999, 166.6),
    (2000, 172.2),
    (2001, 177.1),
    (2002, 179.9),
    (2003, 184.0),
    (2004, 188.9),
    (2005, 195.3),
    (2006, 201.6),
    (2007, 207.342),
    (2008, 215.303),
    (2009, 214.537),
    (2010, 218.056),
    (2011, 224.939),
    (2012, 229.594),
    (2013, 232.957),
    (2014, 236.736),
    (2015, 237.017),
    (2016, 240.007),
    (2017, 245.120),
    (2018, 251.107),
    (2019, 255.657),
    (2020, 258.811),
    (2021, 270.970),
    (2022, 292.655),
    (2023, 304.702),
];

/// Price index by year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpiTable {
    index: BTreeMap<i32, f64>,
}

impl CpiTable {
    /// Build from (year, index) pairs; every index must be positive
    pub fn new(entries: impl IntoIterator<Item = (i32, f64)>) -> CalcResult<Self> {
        let mut index = BTreeMap::new();
        for (year, value) in entries {
            if !value.is_finite() || value <= 0.0 {
                return Err(CalcError::invalid_config(format!(
                    "CPI for {} must be positive, got {}",
                    year, value
                )));
            }
            if index.insert(year, value).is_some() {
                return Err(CalcError::invalid_config(format!("duplicate CPI year {}", year)));
            }
        }
        Ok(Self { index })
    }

    /// Built-in US CPI-U table
    pub fn us_cpi_u() -> Self {
        Self {
            index: CPI_U_ANNUAL.iter().copied().collect(),
        }
    }

    pub fn get(&self, year: i32) -> CalcResult<f64> {
        self.index
            .get(&year)
            .copied()
            .ok_or_else(|| CalcError::unsupported_year(year, "CPI"))
    }

    /// First and last year covered
    pub fn span(&self) -> Option<(i32, i32)> {
        let first = self.index.keys().next()?;
        let last = self.index.keys().next_back()?;
        Some((*first, *last))
    }
}

/// Raw CSV row matching cpi.csv columns
#[derive(Debug, serde::Deserialize)]
struct CpiRow {
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "CPI")]
    cpi: f64,
}

/// Load a CPI table from any reader
pub fn load_cpi_from_reader<R: Read>(reader: R) -> CalcResult<CpiTable> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut entries = Vec::new();
    for result in csv_reader.deserialize() {
        let row: CpiRow = result.map_err(|e| CalcError::data_load("cpi.csv", e))?;
        entries.push((row.year, row.cpi));
    }
    CpiTable::new(entries)
}

/// Load a CPI table from a CSV file
pub fn load_cpi_table(path: &Path) -> CalcResult<CpiTable> {
    let file = std::fs::File::open(path)
        .map_err(|e| CalcError::data_load(path.display().to_string(), e))?;
    let table = load_cpi_from_reader(file)?;
    info!("loaded CPI table {:?} from {}", table.span(), path.display());
    Ok(table)
}

/// Amount in one year's dollars to be restated in another year's dollars
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InflationInput {
    pub amount: f64,
    pub from_year: i32,
    pub to_year: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InflationResult {
    pub adjusted_amount: f64,
    /// Total price change between the two years, in percent
    pub cumulative_inflation_pct: f64,
    /// Compound annual rate over the span, in percent (0 for the same year)
    pub average_annual_rate_pct: f64,
}

/// Restate an amount using the ratio of CPI values
pub fn adjust_for_inflation(
    input: &InflationInput,
    table: &CpiTable,
) -> CalcResult<InflationResult> {
    require_finite("amount", input.amount)?;
    let from = table.get(input.from_year)?;
    let to = table.get(input.to_year)?;

    let ratio = to / from;
    let years = (input.to_year - input.from_year).abs();
    let average_annual_rate_pct = if years == 0 {
        0.0
    } else {
        // Rate is expressed forward in time regardless of direction
        let forward = if input.to_year > input.from_year { ratio } else { 1.0 / ratio };
        (forward.powf(1.0 / years as f64) - 1.0) * 100.0
    };

    debug!(
        "{:.2} in {} -> {:.2} in {}",
        input.amount,
        input.from_year,
        input.amount * ratio,
        input.to_year
    );

    Ok(InflationResult {
        adjusted_amount: input.amount * ratio,
        cumulative_inflation_pct: (ratio - 1.0) * 100.0,
        average_annual_rate_pct,
    })
}
