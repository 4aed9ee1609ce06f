//! Trading-day calendar: weekdays only, no exchange holidays.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::error::{BullbearError, Result};

/// Enumerate trading days over `[start, end]` inclusive, oldest first.
///
/// Saturdays and Sundays are skipped. Errors when the range is inverted;
/// a valid range containing no weekdays yields an empty list.
pub fn trading_days(start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>> {
    if start > end {
        return Err(BullbearError::InvalidDateRange(format!(
            "start {start} is after end {end}"
        )));
    }

    let mut days = Vec::new();
    let mut current = start;
    while current <= end {
        if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(current);
        }
        current += Duration::days(1);
    }
    Ok(days)
}
