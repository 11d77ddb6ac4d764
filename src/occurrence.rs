//! Next-occurrence calculation for recurring reminders.

use chrono::{Datelike, Days, NaiveDateTime, TimeDelta};
use thiserror::Error;

use crate::interval::ParsedInterval;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OccurrenceError {
    #[error("reminder has no interval, nothing to compute")]
    NotRecurring,

    #[error("no weekday in the set matches within the next 7 days")]
    NoMatchingWeekday,

    #[error("next occurrence does not fit into the supported date range")]
    Overflow,
}

/// Computes the next occurrence strictly from the current scheduled instant.
///
/// Fixed offsets add exactly one step, even if the result is still in the
/// past relative to wall-clock time: a process that was down for several
/// intervals advances one interval per firing, it does not catch up. Weekly
/// intervals scan forward day by day and keep the original time-of-day.
///
/// Pure function of its two inputs; never consults the wall clock.
pub fn next_occurrence(
    current: NaiveDateTime,
    interval: &ParsedInterval,
) -> Result<NaiveDateTime, OccurrenceError> {
    match interval {
        ParsedInterval::None => Err(OccurrenceError::NotRecurring),
        ParsedInterval::FixedOffset {
            minutes,
            hours,
            days,
        } => {
            let offset = TimeDelta::days(i64::from(*days))
                + TimeDelta::hours(i64::from(*hours))
                + TimeDelta::minutes(i64::from(*minutes));
            current
                .checked_add_signed(offset)
                .ok_or(OccurrenceError::Overflow)
        }
        ParsedInterval::Weekly { days } => {
            // Starting at current+1 keeps a weekly reminder from refiring on
            // the day it just fired. Any non-empty set matches within 7 days.
            for ahead in 1..=7 {
                let date = current
                    .date()
                    .checked_add_days(Days::new(ahead))
                    .ok_or(OccurrenceError::Overflow)?;
                if days.contains(&date.weekday()) {
                    return Ok(date.and_time(current.time()));
                }
            }
            Err(OccurrenceError::NoMatchingWeekday)
        }
    }
}
