//! Calculator Engines - Pure calculation engines for a catalog of everyday calculators
//!
//! This library provides:
//! - Loan amortization schedules with yearly summaries
//! - Interest-rate conversion between compounding frequencies
//! - Progressive income tax over configurable bracket tables
//! - IPv4/IPv6 subnet analysis
//! - Descriptive statistics with sample/population variance
//! - Calendar-aware age and interval breakdowns
//! - Expression evaluation, CPI inflation adjustment, password generation
//! - A request pipeline for batch and remote calculation

pub mod error;
pub mod format;
pub mod loan;
pub mod rates;
pub mod tax;
pub mod subnet;
pub mod stats;
pub mod dates;
pub mod expr;
pub mod inflation;
pub mod password;
pub mod pipeline;

// Re-export commonly used types
pub use error::{CalcError, CalcResult};
pub use loan::{amortize, AmortizationResult, LoanInput};
pub use rates::{convert_rate, RateConversionInput};
pub use tax::{compute_tax, FilingStatus, TaxInput, TaxResult, TaxTables};
pub use subnet::{subnet_v4, subnet_v6, SubnetV4, SubnetV6};
pub use stats::{describe, Description, SampleSet, VarianceMode};
pub use dates::{age_breakdown, interval_breakdown, DateInterval, DurationBreakdown};
pub use expr::{evaluate, AngleMode};
pub use inflation::{adjust_for_inflation, CpiTable, InflationInput};
pub use password::{generate_password, PasswordOptions};
pub use pipeline::{CalcRequest, CalcResponse, Calculator, DEFAULT_DATA_PATH};
