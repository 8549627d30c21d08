//! Business-day arithmetic for requested date ranges.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::workflow::error::WorkflowError;

/// Returns true for Monday through Friday.
#[must_use]
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Counts business days between `start` and `end`, inclusive.
///
/// Returns 0 when `end < start`; ranges are validated separately by
/// [`validate_range`].
#[must_use]
pub fn business_days_between(start: NaiveDate, end: NaiveDate) -> u32 {
    let mut days = 0;
    let mut current = start;
    while current <= end {
        if is_business_day(current) {
            days += 1;
        }
        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }
    days
}

/// Validates a requested date range.
///
/// Rejects ranges where the end precedes the start, and starts further in
/// the past than the configured grace period allows.
pub fn validate_range(
    start: NaiveDate,
    end: Option<NaiveDate>,
    today: NaiveDate,
    grace_period_days: u32,
) -> Result<(), WorkflowError> {
    if let Some(end) = end
        && end < start
    {
        return Err(WorkflowError::InvalidDateRange(format!(
            "end date {end} is before start date {start}"
        )));
    }

    let earliest = today
        .checked_sub_days(Days::new(u64::from(grace_period_days)))
        .unwrap_or(NaiveDate::MIN);
    if start < earliest {
        return Err(WorkflowError::InvalidDateRange(format!(
            "start date {start} is more than {grace_period_days} days in the past"
        )));
    }

    Ok(())
}
