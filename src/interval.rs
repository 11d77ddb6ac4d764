//! Interval grammar for recurring reminders.
//!
//! Two forms are supported, persisted verbatim as the user typed them:
//! - fixed offset: `e[<N>m][<N>h][<N>d]`, components in that order
//! - weekly: `w:*` or `w:mon,wed,fri` (three-letter tokens, any order)
//!
//! An empty string means the reminder is one-shot.

use std::collections::HashSet;
use std::fmt;

use chrono::Weekday;
use thiserror::Error;

/// Minutes below this would let a reminder refire almost back to back.
pub const MIN_MINUTES: u32 = 10;
pub const MAX_MINUTES: u32 = 60;
pub const MAX_HOURS: u32 = 24;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IntervalError {
    #[error("unrecognized interval format: {0:?}")]
    Format(String),

    #[error("minutes must be between {MIN_MINUTES} and {MAX_MINUTES}, got {0}")]
    MinutesOutOfRange(u32),

    #[error("hours must be at most {MAX_HOURS}, got {0}")]
    HoursOutOfRange(u32),

    #[error("interval has no duration")]
    ZeroOffset,

    #[error("unknown weekday token: {0:?}")]
    UnknownWeekday(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedInterval {
    /// One-shot reminder, never rescheduled.
    None,
    FixedOffset { minutes: u32, hours: u32, days: u32 },
    Weekly { days: HashSet<Weekday> },
}

/// Parses an interval string into its typed form.
///
/// Pure function of its input; range checks for the fixed-offset form are
/// applied here so that anything accepted at the input boundary stays valid
/// when the scheduler re-parses it on every firing.
pub fn parse(raw: &str) -> Result<ParsedInterval, IntervalError> {
    if raw.is_empty() {
        return Ok(ParsedInterval::None);
    }

    if let Some(body) = raw.strip_prefix("w:") {
        return parse_weekly(body);
    }

    if let Some(body) = raw.strip_prefix('e') {
        return parse_fixed_offset(raw, body);
    }

    Err(IntervalError::Format(raw.to_string()))
}

/// Boundary check used when a reminder is created or edited.
pub fn validate(raw: &str) -> bool {
    parse(raw).is_ok()
}

fn parse_weekly(body: &str) -> Result<ParsedInterval, IntervalError> {
    if body == "*" {
        let days = [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ]
        .into_iter()
        .collect();
        return Ok(ParsedInterval::Weekly { days });
    }

    let mut days = HashSet::new();
    for token in body.split(',') {
        days.insert(weekday_from_token(token)?);
    }

    Ok(ParsedInterval::Weekly { days })
}

fn weekday_from_token(token: &str) -> Result<Weekday, IntervalError> {
    match token.to_ascii_lowercase().as_str() {
        "mon" => Ok(Weekday::Mon),
        "tue" => Ok(Weekday::Tue),
        "wed" => Ok(Weekday::Wed),
        "thu" => Ok(Weekday::Thu),
        "fri" => Ok(Weekday::Fri),
        "sat" => Ok(Weekday::Sat),
        "sun" => Ok(Weekday::Sun),
        _ => Err(IntervalError::UnknownWeekday(token.to_string())),
    }
}

fn weekday_token(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "mon",
        Weekday::Tue => "tue",
        Weekday::Wed => "wed",
        Weekday::Thu => "thu",
        Weekday::Fri => "fri",
        Weekday::Sat => "sat",
        Weekday::Sun => "sun",
    }
}

fn parse_fixed_offset(raw: &str, body: &str) -> Result<ParsedInterval, IntervalError> {
    let mut minutes: Option<u32> = None;
    let mut hours: Option<u32> = None;
    let mut days: Option<u32> = None;

    // Each unit may appear at most once and only in m < h < d order.
    let mut last_rank = 0u8;
    let mut rest = body;
    while !rest.is_empty() {
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| IntervalError::Format(raw.to_string()))?;
        if digits_end == 0 {
            return Err(IntervalError::Format(raw.to_string()));
        }

        let value: u32 = rest[..digits_end]
            .parse()
            .map_err(|_| IntervalError::Format(raw.to_string()))?;

        let (slot, rank) = match rest.as_bytes()[digits_end] {
            b'm' => (&mut minutes, 1),
            b'h' => (&mut hours, 2),
            b'd' => (&mut days, 3),
            _ => return Err(IntervalError::Format(raw.to_string())),
        };
        if rank <= last_rank {
            return Err(IntervalError::Format(raw.to_string()));
        }
        last_rank = rank;
        *slot = Some(value);

        rest = &rest[digits_end + 1..];
    }

    if let Some(m) = minutes {
        if !(MIN_MINUTES..=MAX_MINUTES).contains(&m) {
            return Err(IntervalError::MinutesOutOfRange(m));
        }
    }
    if let Some(h) = hours {
        if h > MAX_HOURS {
            return Err(IntervalError::HoursOutOfRange(h));
        }
    }

    let minutes = minutes.unwrap_or(0);
    let hours = hours.unwrap_or(0);
    let days = days.unwrap_or(0);

    // A bare "e" (or all-zero components) would fire again on the very next
    // tick, so it is rejected outright instead of parsed to a no-op offset.
    if minutes == 0 && hours == 0 && days == 0 {
        return Err(IntervalError::ZeroOffset);
    }

    Ok(ParsedInterval::FixedOffset {
        minutes,
        hours,
        days,
    })
}

impl fmt::Display for ParsedInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsedInterval::None => Ok(()),
            ParsedInterval::FixedOffset {
                minutes,
                hours,
                days,
            } => {
                write!(f, "e")?;
                if *minutes > 0 {
                    write!(f, "{minutes}m")?;
                }
                if *hours > 0 {
                    write!(f, "{hours}h")?;
                }
                if *days > 0 {
                    write!(f, "{days}d")?;
                }
                Ok(())
            }
            ParsedInterval::Weekly { days } => {
                if days.len() == 7 {
                    return write!(f, "w:*");
                }
                let mut sorted: Vec<Weekday> = days.iter().copied().collect();
                sorted.sort_by_key(|d| d.num_days_from_monday());
                let tokens: Vec<&str> = sorted.into_iter().map(weekday_token).collect();
                write!(f, "w:{}", tokens.join(","))
            }
        }
    }
}
