//! Pure next-occurrence computation for recurring schedules.

use chrono::NaiveDate;

use crate::domain::Frequency;

/// Computes the date of the next occurrence on or after `today`.
///
/// Scans forward one period at a time from `start` rather than jumping
/// arithmetically, which keeps month-length and leap-year irregularities
/// correct at the cost of one iteration per elapsed period. Returns `None`
/// once any candidate would land past `end`, meaning the schedule has ended.
///
/// A start date in the future is its own first occurrence.
pub fn next_occurrence(
    start: NaiveDate,
    frequency: Frequency,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> Option<NaiveDate> {
    if start > today {
        return Some(start);
    }

    let mut candidate = start;
    while candidate < today {
        candidate = frequency.advance(candidate);
        if let Some(end) = end {
            if candidate > end {
                return None;
            }
        }
    }

    match end {
        Some(end) if candidate > end => None,
        _ => Some(candidate),
    }
}
