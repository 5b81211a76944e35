//! Bracket ladders and per-year tax tables

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};

/// Filing status selecting one bracket ladder and one standard deduction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    Single,
    MarriedJointly,
    HeadOfHousehold,
}

impl FilingStatus {
    pub const ALL: [FilingStatus; 3] = [
        FilingStatus::Single,
        FilingStatus::MarriedJointly,
        FilingStatus::HeadOfHousehold,
    ];

    /// Parse the identifiers used in the CSV tables and on the command line
    pub fn parse(value: &str) -> CalcResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(FilingStatus::Single),
            "married_jointly" | "mfj" => Ok(FilingStatus::MarriedJointly),
            "head_of_household" | "hoh" => Ok(FilingStatus::HeadOfHousehold),
            other => Err(CalcError::invalid_input(
                "filing_status",
                other,
                "expected single, married_jointly or head_of_household",
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilingStatus::Single => "single",
            FilingStatus::MarriedJointly => "married_jointly",
            FilingStatus::HeadOfHousehold => "head_of_household",
        }
    }
}

/// One rung of a progressive ladder
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Marginal rate as a decimal in [0, 1]
    pub rate: f64,
    /// Upper limit of taxable income for this rate; `None` = unbounded
    pub upper_limit: Option<f64>,
}

impl TaxBracket {
    pub fn new(rate: f64, upper_limit: f64) -> Self {
        Self {
            rate,
            upper_limit: Some(upper_limit),
        }
    }

    pub fn unbounded(rate: f64) -> Self {
        Self {
            rate,
            upper_limit: None,
        }
    }
}

/// Ordered brackets for one filing status
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BracketLadder {
    brackets: Vec<TaxBracket>,
}

impl BracketLadder {
    /// Validate and build a ladder
    ///
    /// Rates must lie in [0, 1], upper limits must strictly increase, and
    /// only the last bracket may (and must) be unbounded.
    pub fn new(brackets: Vec<TaxBracket>) -> CalcResult<Self> {
        if brackets.is_empty() {
            return Err(CalcError::invalid_config("bracket ladder is empty"));
        }

        let mut previous = 0.0;
        let last = brackets.len() - 1;
        for (i, bracket) in brackets.iter().enumerate() {
            if !(0.0..=1.0).contains(&bracket.rate) {
                return Err(CalcError::invalid_config(format!(
                    "bracket {} rate {} outside [0, 1]",
                    i + 1,
                    bracket.rate
                )));
            }
            match (bracket.upper_limit, i == last) {
                (Some(limit), false) => {
                    if !limit.is_finite() || limit <= previous {
                        return Err(CalcError::invalid_config(format!(
                            "bracket {} upper limit {} must exceed {}",
                            i + 1,
                            limit,
                            previous
                        )));
                    }
                    previous = limit;
                }
                (None, true) => {}
                (Some(_), true) => {
                    return Err(CalcError::invalid_config("last bracket must be unbounded"));
                }
                (None, false) => {
                    return Err(CalcError::invalid_config(format!(
                        "bracket {} is unbounded but is not the last bracket",
                        i + 1
                    )));
                }
            }
        }

        Ok(Self { brackets })
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }
}

/// Ladders and standard deductions for one tax year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxTable {
    pub year: i32,
    ladders: BTreeMap<FilingStatus, BracketLadder>,
    standard_deductions: BTreeMap<FilingStatus, f64>,
}

impl TaxTable {
    /// Build a table; every filing status needs a ladder and a deduction
    pub fn new(
        year: i32,
        ladders: BTreeMap<FilingStatus, BracketLadder>,
        standard_deductions: BTreeMap<FilingStatus, f64>,
    ) -> CalcResult<Self> {
        for status in FilingStatus::ALL {
            if !ladders.contains_key(&status) {
                return Err(CalcError::invalid_config(format!(
                    "{} has no {} bracket ladder",
                    year,
                    status.as_str()
                )));
            }
            match standard_deductions.get(&status) {
                Some(d) if d.is_finite() && *d >= 0.0 => {}
                Some(d) => {
                    return Err(CalcError::invalid_config(format!(
                        "{} {} standard deduction {} is invalid",
                        year,
                        status.as_str(),
                        d
                    )))
                }
                None => {
                    return Err(CalcError::invalid_config(format!(
                        "{} has no {} standard deduction",
                        year,
                        status.as_str()
                    )))
                }
            }
        }

        Ok(Self {
            year,
            ladders,
            standard_deductions,
        })
    }

    pub fn ladder(&self, status: FilingStatus) -> &BracketLadder {
        // Presence of every status is checked in `new`
        &self.ladders[&status]
    }

    pub fn standard_deduction(&self, status: FilingStatus) -> f64 {
        self.standard_deductions[&status]
    }
}

/// Tax tables keyed by year
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaxTables {
    tables: BTreeMap<i32, TaxTable>,
}

impl TaxTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in US federal tables for 2023 and 2024
    pub fn us_federal() -> Self {
        let mut tables = Self::new();
        tables.insert(us_federal_2023());
        tables.insert(us_federal_2024());
        tables
    }

    /// Add or replace the table for its year
    pub fn insert(&mut self, table: TaxTable) {
        self.tables.insert(table.year, table);
    }

    /// Table for a year, or an unsupported-year failure
    pub fn table_for(&self, year: i32) -> CalcResult<&TaxTable> {
        self.tables
            .get(&year)
            .ok_or_else(|| CalcError::unsupported_year(year, "tax"))
    }

    pub fn years(&self) -> Vec<i32> {
        self.tables.keys().copied().collect()
    }
}

fn ladder(limits: [f64; 6]) -> BracketLadder {
    const RATES: [f64; 7] = [0.10, 0.12, 0.22, 0.24, 0.32, 0.35, 0.37];
    let mut brackets: Vec<TaxBracket> = limits
        .iter()
        .zip(RATES.iter())
        .map(|(&limit, &rate)| TaxBracket::new(rate, limit))
        .collect();
    brackets.push(TaxBracket::unbounded(RATES[6]));
    BracketLadder { brackets }
}

fn us_federal_table(
    year: i32,
    single: [f64; 6],
    married: [f64; 6],
    head: [f64; 6],
    deductions: [f64; 3],
) -> TaxTable {
    let ladders = BTreeMap::from([
        (FilingStatus::Single, ladder(single)),
        (FilingStatus::MarriedJointly, ladder(married)),
        (FilingStatus::HeadOfHousehold, ladder(head)),
    ]);
    let standard_deductions = BTreeMap::from([
        (FilingStatus::Single, deductions[0]),
        (FilingStatus::MarriedJointly, deductions[1]),
        (FilingStatus::HeadOfHousehold, deductions[2]),
    ]);
    TaxTable {
        year,
        ladders,
        standard_deductions,
    }
}

/// IRS Rev. Proc. 2022-38
pub fn us_federal_2023() -> TaxTable {
    us_federal_table(
        2023,
        [11_000.0, 44_725.0, 95_375.0, 182_100.0, 231_250.0, 578_125.0],
        [22_000.0, 89_450.0, 190_750.0, 364_200.0, 462_500.0, 693_750.0],
        [15_700.0, 59_850.0, 95_350.0, 182_100.0, 231_250.0, 578_100.0],
        [13_850.0, 27_700.0, 20_800.0],
    )
}

/// IRS Rev. Proc. 2023-34
pub fn us_federal_2024() -> TaxTable {
    us_federal_table(
        2024,
        [11_600.0, 47_150.0, 100_525.0, 191_950.0, 243_725.0, 609_350.0],
        [23_200.0, 94_300.0, 201_050.0, 383_900.0, 487_450.0, 731_200.0],
        [16_550.0, 63_100.0, 100_500.0, 191_950.0, 243_700.0, 609_350.0],
        [14_600.0, 29_200.0, 21_900.0],
    )
}
