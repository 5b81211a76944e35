//! Calendar-aware age and interval decomposition

use chrono::{Datelike, Months, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};

/// Closed calendar interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateInterval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Elapsed time as a calendar breakdown plus flat totals
///
/// `years`/`months`/`days` come from cascading calendar subtraction; the
/// `total_*` fields are flat counts over the whole span. The two agree in
/// total elapsed time, not term by term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationBreakdown {
    pub years: u32,
    pub months: u32,
    pub days: u32,
    /// Whole weeks in the span
    pub total_weeks: i64,
    pub total_days: i64,
    pub total_hours: i64,
    pub total_minutes: i64,
    pub total_seconds: i64,
}

fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    // chrono clamps to the last day of shorter months (Jan 31 + 1 month = Feb 28/29)
    date.checked_add_months(Months::new(months))
}

/// Largest `n` such that `start + (n * step) months <= end`
fn whole_steps(start: NaiveDate, end: NaiveDate, step: u32, upper_bound: u32) -> u32 {
    let mut n = upper_bound;
    while n > 0 {
        match add_months(start, n * step) {
            Some(date) if date <= end => return n,
            _ => n -= 1,
        }
    }
    0
}

/// Break the interval from `start` to `end` into calendar and flat units
pub fn interval_breakdown(interval: DateInterval) -> CalcResult<DurationBreakdown> {
    let DateInterval { start, end } = interval;
    if start > end {
        return Err(CalcError::invalid_input(
            "start",
            start,
            format!("must not be after end date {}", end),
        ));
    }

    // Calendar-year difference is an upper bound; step back when the anniversary
    // has not been reached yet
    let year_bound = (end.year() - start.year()).max(0) as u32;
    let years = whole_steps(start, end, 12, year_bound);

    // Months are counted from `start` as well, so the anchor plus `days`
    // lands exactly on `end`
    let months = whole_steps(start, end, 1, years * 12 + 12).saturating_sub(years * 12);
    let anchor = add_months(start, years * 12 + months).unwrap_or(start);

    let days = (end - anchor).num_days() as u32;
    let total_days = (end - start).num_days();

    debug!("{} -> {}: {}y {}m {}d ({} days)", start, end, years, months, days, total_days);

    Ok(DurationBreakdown {
        years,
        months,
        days,
        total_weeks: total_days / 7,
        total_days,
        total_hours: total_days * 24,
        total_minutes: total_days * 24 * 60,
        total_seconds: total_days * 24 * 60 * 60,
    })
}

/// Age on `as_of` of someone born on `date_of_birth`
pub fn age_breakdown(date_of_birth: NaiveDate, as_of: NaiveDate) -> CalcResult<DurationBreakdown> {
    if date_of_birth > as_of {
        return Err(CalcError::invalid_input(
            "date_of_birth",
            date_of_birth,
            format!("must not be after {}", as_of),
        ));
    }
    interval_breakdown(DateInterval {
        start: date_of_birth,
        end: as_of,
    })
}
