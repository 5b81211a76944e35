//! Request pipeline for batch and remote calculation
//!
//! Loads reference tables once, then dispatches any number of requests to
//! the engines without re-reading CSV files.

use std::path::Path;

use chrono::{Local, NaiveDate};
use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::dates::{age_breakdown, interval_breakdown, DateInterval, DurationBreakdown};
use crate::error::CalcResult;
use crate::expr::{evaluate, AngleMode};
use crate::inflation::{
    adjust_for_inflation, load_cpi_table, CpiTable, InflationInput, InflationResult,
};
use crate::loan::{amortize, AmortizationResult, AnnualSummaryRow, LoanInput};
use crate::password::{generate_password, GeneratedPassword, PasswordOptions};
use crate::rates::{convert_rate, effective_annual_rate_pct, RateConversionInput};
use crate::stats::{describe, Description, SampleSet};
use crate::subnet::{subnet_v4_cidr, subnet_v6_cidr, SubnetV4, SubnetV6};
use crate::tax::{compute_tax, load_tax_tables, TaxInput, TaxResult, TaxTables};

/// Default reference data directory (tax/ and cpi.csv)
pub const DEFAULT_DATA_PATH: &str = "data";

/// One calculation, tagged by calculator name
///
/// ```json
/// {"calculator": "convert_rate", "nominal_rate_pct": 12.0,
///  "source_periods_per_year": 12, "target_periods_per_year": 1}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "calculator", rename_all = "snake_case")]
pub enum CalcRequest {
    Amortize(LoanInput),
    ConvertRate(RateConversionInput),
    Tax(TaxInput),
    SubnetV4 {
        cidr: String,
    },
    SubnetV6 {
        cidr: String,
    },
    Describe(SampleSet),
    /// Age as of a date, today when omitted
    Age {
        date_of_birth: NaiveDate,
        #[serde(default)]
        as_of: Option<NaiveDate>,
    },
    Interval(DateInterval),
    Evaluate {
        expression: String,
        #[serde(default)]
        angle_mode: AngleMode,
    },
    Inflation(InflationInput),
    Password(PasswordOptions),
}

impl CalcRequest {
    pub fn name(&self) -> &'static str {
        match self {
            CalcRequest::Amortize(_) => "amortize",
            CalcRequest::ConvertRate(_) => "convert_rate",
            CalcRequest::Tax(_) => "tax",
            CalcRequest::SubnetV4 { .. } => "subnet_v4",
            CalcRequest::SubnetV6 { .. } => "subnet_v6",
            CalcRequest::Describe(_) => "describe",
            CalcRequest::Age { .. } => "age",
            CalcRequest::Interval(_) => "interval",
            CalcRequest::Evaluate { .. } => "evaluate",
            CalcRequest::Inflation(_) => "inflation",
            CalcRequest::Password(_) => "password",
        }
    }
}

/// Engine output matching the request that produced it
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "calculator", rename_all = "snake_case")]
pub enum CalcResponse {
    Amortize {
        #[serde(flatten)]
        result: AmortizationResult,
        yearly_summary: Vec<AnnualSummaryRow>,
    },
    ConvertRate {
        converted_rate_pct: f64,
        effective_annual_rate_pct: f64,
    },
    Tax(TaxResult),
    SubnetV4(SubnetV4),
    SubnetV6(SubnetV6),
    Describe(Description),
    Age(DurationBreakdown),
    Interval(DurationBreakdown),
    Evaluate {
        value: f64,
    },
    Inflation(InflationResult),
    Password(GeneratedPassword),
}

/// Pre-loaded calculator for repeated requests
#[derive(Debug, Clone)]
pub struct Calculator {
    tax_tables: TaxTables,
    cpi: CpiTable,
}

impl Calculator {
    /// Calculator with the built-in reference tables
    pub fn new() -> Self {
        Self {
            tax_tables: TaxTables::us_federal(),
            cpi: CpiTable::us_cpi_u(),
        }
    }

    /// Load tax/ and cpi.csv from a data directory
    pub fn from_data_dir(path: &Path) -> CalcResult<Self> {
        Ok(Self {
            tax_tables: load_tax_tables(&path.join("tax"))?,
            cpi: load_cpi_table(&path.join("cpi.csv"))?,
        })
    }

    /// Calculator with caller-supplied tables
    pub fn with_tables(tax_tables: TaxTables, cpi: CpiTable) -> Self {
        Self { tax_tables, cpi }
    }

    pub fn tax_tables(&self) -> &TaxTables {
        &self.tax_tables
    }

    pub fn cpi(&self) -> &CpiTable {
        &self.cpi
    }

    /// Run a single request
    pub fn run(&self, request: &CalcRequest) -> CalcResult<CalcResponse> {
        debug!("running {} request", request.name());
        let response = match request {
            CalcRequest::Amortize(loan) => {
                let result = amortize(loan)?;
                CalcResponse::Amortize {
                    yearly_summary: result.yearly_summary(),
                    result,
                }
            }
            CalcRequest::ConvertRate(input) => CalcResponse::ConvertRate {
                converted_rate_pct: convert_rate(input)?,
                effective_annual_rate_pct: effective_annual_rate_pct(
                    input.nominal_rate_pct,
                    input.source_periods_per_year,
                )?,
            },
            CalcRequest::Tax(input) => CalcResponse::Tax(compute_tax(input, &self.tax_tables)?),
            CalcRequest::SubnetV4 { cidr } => CalcResponse::SubnetV4(subnet_v4_cidr(cidr)?),
            CalcRequest::SubnetV6 { cidr } => CalcResponse::SubnetV6(subnet_v6_cidr(cidr)?),
            CalcRequest::Describe(samples) => CalcResponse::Describe(describe(samples)?),
            CalcRequest::Age {
                date_of_birth,
                as_of,
            } => {
                let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
                CalcResponse::Age(age_breakdown(*date_of_birth, as_of)?)
            }
            CalcRequest::Interval(interval) => {
                CalcResponse::Interval(interval_breakdown(*interval)?)
            }
            CalcRequest::Evaluate {
                expression,
                angle_mode,
            } => CalcResponse::Evaluate {
                value: evaluate(expression, *angle_mode)?,
            },
            CalcRequest::Inflation(input) => {
                CalcResponse::Inflation(adjust_for_inflation(input, &self.cpi)?)
            }
            CalcRequest::Password(options) => CalcResponse::Password(generate_password(options)?),
        };
        Ok(response)
    }

    /// Run many requests in parallel; each failure stays with its request
    pub fn run_batch(&self, requests: &[CalcRequest]) -> Vec<CalcResult<CalcResponse>> {
        requests
            .par_iter()
            .map(|request| {
                let result = self.run(request);
                if let Err(e) = &result {
                    warn!("{} request failed: {}", request.name(), e);
                }
                result
            })
            .collect()
    }
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}
