//! Calculator CLI
//!
//! Command-line front end for the calculation engines. Every subcommand is
//! turned into a calculation request and run through the shared pipeline.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use calculator_engines::format::{format_currency, format_percent, round_money};
use calculator_engines::{
    AngleMode, CalcRequest, CalcResponse, Calculator, FilingStatus, InflationInput, LoanInput,
    PasswordOptions, RateConversionInput, SampleSet, TaxInput, VarianceMode,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "calc",
    version,
    about = "Everyday calculators: loans, rates, tax, subnets, statistics, dates"
)]
struct Cli {
    /// Reference data directory holding tax/ and cpi.csv (built-in tables when omitted)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Print the full result as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Monthly payment and amortization schedule
    Loan {
        /// Purchase price or loan principal
        principal: f64,
        /// Annual interest rate in percent
        rate: f64,
        /// Term in months
        #[arg(long, default_value_t = 360)]
        months: u32,
        #[arg(long, default_value_t = 0.0)]
        down_payment: f64,
        /// Print the month-by-month schedule
        #[arg(long)]
        schedule: bool,
        /// Print the year-by-year summary
        #[arg(long)]
        yearly: bool,
    },

    /// Convert a nominal rate between compounding frequencies
    Rate {
        /// Nominal annual rate in percent
        rate: f64,
        /// Compounding periods per year of the quoted rate
        #[arg(long, default_value_t = 12)]
        from: u32,
        /// Compounding periods per year wanted
        #[arg(long, default_value_t = 1)]
        to: u32,
    },

    /// Federal income tax for a gross income
    Tax {
        income: f64,
        /// single, married_jointly (mfj) or head_of_household (hoh)
        #[arg(long, default_value = "single")]
        status: String,
        #[arg(long, default_value_t = 2024)]
        year: i32,
    },

    /// Subnet breakdown for an IPv4 or IPv6 CIDR
    Subnet { cidr: String },

    /// Descriptive statistics for comma or space separated values
    Stats {
        values: String,
        /// Divide by n instead of n - 1
        #[arg(long)]
        population: bool,
    },

    /// Age in years, months and days
    Age {
        /// Date of birth (YYYY-MM-DD)
        date_of_birth: NaiveDate,
        /// Reference date, today when omitted
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },

    /// Evaluate an arithmetic expression
    Eval {
        expression: String,
        /// Trigonometric functions take and return degrees
        #[arg(long)]
        degrees: bool,
    },

    /// Restate an amount in another year's dollars
    Inflation {
        amount: f64,
        #[arg(long)]
        from: i32,
        #[arg(long)]
        to: i32,
    },

    /// Generate a random password
    Password {
        #[arg(long, default_value_t = 16)]
        length: usize,
        #[arg(long)]
        no_lowercase: bool,
        #[arg(long)]
        no_uppercase: bool,
        #[arg(long)]
        no_digits: bool,
        #[arg(long)]
        no_symbols: bool,
        /// Leave out look-alike characters (I, l, 1, O, 0, o)
        #[arg(long)]
        exclude_ambiguous: bool,
    },

    /// Run a JSON request (or array of requests) from a file or stdin
    Request {
        /// Request file; stdin when omitted
        file: Option<PathBuf>,
    },
}

/// Loan output switches that only affect printing
#[derive(Debug, Clone, Copy, Default)]
struct LoanView {
    schedule: bool,
    yearly: bool,
}

fn build_request(command: Command) -> Result<(CalcRequest, LoanView)> {
    let mut view = LoanView::default();
    let request = match command {
        Command::Loan {
            principal,
            rate,
            months,
            down_payment,
            schedule,
            yearly,
        } => {
            view = LoanView { schedule, yearly };
            CalcRequest::Amortize(LoanInput::new(principal, rate, months, down_payment))
        }
        Command::Rate { rate, from, to } => CalcRequest::ConvertRate(RateConversionInput {
            nominal_rate_pct: rate,
            source_periods_per_year: from,
            target_periods_per_year: to,
        }),
        Command::Tax {
            income,
            status,
            year,
        } => CalcRequest::Tax(TaxInput {
            gross_income: income,
            filing_status: FilingStatus::parse(&status)?,
            year,
        }),
        Command::Subnet { cidr } if cidr.contains(':') => CalcRequest::SubnetV6 { cidr },
        Command::Subnet { cidr } => CalcRequest::SubnetV4 { cidr },
        Command::Stats { values, population } => {
            let mode = if population {
                VarianceMode::Population
            } else {
                VarianceMode::Sample
            };
            CalcRequest::Describe(SampleSet::parse(&values, mode)?)
        }
        Command::Age {
            date_of_birth,
            as_of,
        } => CalcRequest::Age {
            date_of_birth,
            as_of,
        },
        Command::Eval {
            expression,
            degrees,
        } => CalcRequest::Evaluate {
            expression,
            angle_mode: if degrees {
                AngleMode::Degrees
            } else {
                AngleMode::Radians
            },
        },
        Command::Inflation { amount, from, to } => CalcRequest::Inflation(InflationInput {
            amount,
            from_year: from,
            to_year: to,
        }),
        Command::Password {
            length,
            no_lowercase,
            no_uppercase,
            no_digits,
            no_symbols,
            exclude_ambiguous,
        } => CalcRequest::Password(PasswordOptions {
            length,
            lowercase: !no_lowercase,
            uppercase: !no_uppercase,
            digits: !no_digits,
            symbols: !no_symbols,
            exclude_ambiguous,
        }),
        Command::Request { .. } => bail!("raw requests are handled separately"),
    };
    Ok((request, view))
}

fn print_response(response: &CalcResponse, view: LoanView) {
    match response {
        CalcResponse::Amortize {
            result,
            yearly_summary,
        } => {
            println!("Financed amount: {}", format_currency(result.financed_amount));
            println!("Monthly payment: {}", format_currency(result.monthly_payment));
            println!("Total payment:   {}", format_currency(result.total_payment));
            println!("Total interest:  {}", format_currency(result.total_interest));

            if view.yearly {
                println!();
                println!("{:>4} {:>14} {:>14} {:>14}", "Year", "Principal", "Interest", "Balance");
                println!("{}", "-".repeat(49));
                for row in yearly_summary {
                    println!(
                        "{:>4} {:>14.2} {:>14.2} {:>14.2}",
                        row.year,
                        round_money(row.principal_paid),
                        round_money(row.interest_paid),
                        round_money(row.remaining_balance)
                    );
                }
            }

            if view.schedule {
                println!();
                println!(
                    "{:>6} {:>12} {:>12} {:>12} {:>14}",
                    "Month", "Payment", "Principal", "Interest", "Balance"
                );
                println!("{}", "-".repeat(60));
                for row in &result.schedule {
                    println!(
                        "{:>6} {:>12.2} {:>12.2} {:>12.2} {:>14.2}",
                        row.period,
                        round_money(row.payment),
                        round_money(row.principal_paid),
                        round_money(row.interest_paid),
                        round_money(row.remaining_balance)
                    );
                }
            }
        }
        CalcResponse::ConvertRate {
            converted_rate_pct,
            effective_annual_rate_pct,
        } => {
            println!("Converted rate:        {:.6}%", converted_rate_pct);
            println!("Effective annual rate: {:.6}%", effective_annual_rate_pct);
        }
        CalcResponse::Tax(result) => {
            println!("Standard deduction: {}", format_currency(result.standard_deduction));
            println!("Taxable income:     {}", format_currency(result.taxable_income));
            println!("Total tax:          {}", format_currency(result.total_tax));
            println!("Marginal rate:      {}", format_percent(result.marginal_rate, 1));
            println!("Effective rate:     {}", format_percent(result.effective_rate, 2));
            for slice in &result.slices {
                println!(
                    "  {:>6} of {:>14} = {}",
                    format_percent(slice.rate, 0),
                    format_currency(slice.taxable_amount),
                    format_currency(slice.tax)
                );
            }
        }
        CalcResponse::SubnetV4(subnet) => {
            println!("Network:       {}", subnet.cidr);
            println!("Broadcast:     {}", subnet.broadcast);
            println!("Subnet mask:   {}", subnet.subnet_mask);
            println!("Wildcard mask: {}", subnet.wildcard_mask);
            match &subnet.usable_range {
                Some(range) => println!("Usable hosts:  {} - {}", range.first, range.last),
                None => println!("Usable hosts:  none"),
            }
            println!("Host count:    {}", subnet.usable_host_count);
            println!("Total:         {}", subnet.total_address_count);
            println!("Class:         {:?}", subnet.address_class);
            println!("Private:       {}", subnet.is_private);
        }
        CalcResponse::SubnetV6(subnet) => {
            println!("Network:      {}", subnet.cidr);
            println!("Expanded:     {}", subnet.expanded);
            println!("Range:        {} - {}", subnet.usable_range.first, subnet.usable_range.last);
            println!("Addresses:    {}", subnet.address_count);
            println!("Subnet ID:    {}", subnet.subnet_id);
            println!("Interface ID: {}", subnet.interface_id);
        }
        CalcResponse::Describe(d) => {
            println!("Count:     {}", d.count);
            println!("Sum:       {}", d.sum);
            println!("Mean:      {:.6}", d.mean);
            println!("Median:    {}", d.median);
            println!("Min/Max:   {} / {} (range {})", d.min, d.max, d.range);
            println!("Variance:  {:.6}", d.variance);
            println!("Std dev:   {:.6}", d.std_dev);
            println!("95% MoE:   ±{:.6}", d.margin_of_error_95);
        }
        CalcResponse::Age(b) | CalcResponse::Interval(b) => {
            println!("{} years, {} months, {} days", b.years, b.months, b.days);
            println!("Weeks:   {}", b.total_weeks);
            println!("Days:    {}", b.total_days);
            println!("Hours:   {}", b.total_hours);
            println!("Minutes: {}", b.total_minutes);
            println!("Seconds: {}", b.total_seconds);
        }
        CalcResponse::Evaluate { value } => println!("{}", value),
        CalcResponse::Inflation(result) => {
            println!("Adjusted amount:      {}", format_currency(result.adjusted_amount));
            println!("Cumulative inflation: {:.2}%", result.cumulative_inflation_pct);
            println!("Average annual rate:  {:.2}%", result.average_annual_rate_pct);
        }
        CalcResponse::Password(generated) => {
            println!("{}", generated.password);
            println!("Entropy: {:.1} bits", generated.entropy_bits);
        }
    }
}

/// Run raw JSON from a file or stdin; always prints JSON
fn run_raw(calculator: &Calculator, file: Option<PathBuf>) -> Result<()> {
    let text = match &file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            text
        }
    };

    let value: serde_json::Value = serde_json::from_str(&text).context("Invalid JSON")?;
    let requests: Vec<CalcRequest> = if value.is_array() {
        serde_json::from_value(value).context("Invalid request array")?
    } else {
        vec![serde_json::from_value(value).context("Invalid request")?]
    };

    let output: Vec<serde_json::Value> = calculator
        .run_batch(&requests)
        .into_iter()
        .map(|result| match result {
            Ok(response) => serde_json::to_value(response),
            Err(e) => Ok(serde_json::json!({
                "error": { "code": e.error_code(), "message": e.to_string(), "details": e }
            })),
        })
        .collect::<serde_json::Result<_>>()?;

    match output.as_slice() {
        [single] => println!("{}", serde_json::to_string_pretty(single)?),
        _ => println!("{}", serde_json::to_string_pretty(&output)?),
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let calculator = match &cli.data_dir {
        Some(dir) => Calculator::from_data_dir(dir)
            .with_context(|| format!("Failed to load reference data from {}", dir.display()))?,
        None => Calculator::new(),
    };

    if let Command::Request { file } = cli.command {
        return run_raw(&calculator, file);
    }

    let (request, view) = build_request(cli.command)?;
    let response = calculator
        .run(&request)
        .with_context(|| format!("{} calculation failed", request.name()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_response(&response, view);
    }
    Ok(())
}
