//! Reminder model, wire formats and boundary validation.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use crate::account::UserId;
use crate::interval::{self, IntervalError};

/// Wire format for dates, e.g. `01/01/2024`.
pub const DATE_FORMAT: &str = "%d/%m/%Y";
/// Wire format for times, 24-hour, e.g. `09:30`.
pub const TIME_FORMAT: &str = "%H:%M";

pub const MAX_NAME_LEN: usize = 50;
pub const MAX_MESSAGE_LEN: usize = 1024;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("invalid time, expected HH:MM (24-hour)")]
    InvalidTime,

    #[error("invalid date, expected DD/MM/YYYY")]
    InvalidDate,

    #[error("reminder name too long (max {MAX_NAME_LEN} chars)")]
    NameTooLong,

    #[error("a message is required")]
    EmptyMessage,

    #[error("message too long (max {MAX_MESSAGE_LEN} chars)")]
    MessageTooLong,

    #[error(transparent)]
    Interval(#[from] IntervalError),
}

/// A scheduled reminder. `(user_id, name)` is the natural key; the storage
/// layer may keep a surrogate row id but nothing here depends on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub user_id: UserId,
    pub name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// Interval string, persisted verbatim; empty means one-shot.
    pub intervals: String,
    pub message: String,
    pub active: bool,
}

impl Reminder {
    pub fn scheduled_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// Due predicate used by the scanner: active, scheduled for today, and
    /// the time-of-day has passed. Deliberately date-exact, not date-or-earlier.
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        self.active && self.date == now.date() && self.time <= now.time()
    }
}

/// Creation payload, validated from raw user input before it reaches storage.
#[derive(Debug, Clone)]
pub struct NewReminder {
    pub user_id: UserId,
    pub name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub intervals: String,
    pub message: String,
}

impl NewReminder {
    /// Validates all raw fields. An empty date means "today", the common
    /// case for reminders created for later the same day.
    pub fn from_wire(
        user_id: UserId,
        name: &str,
        time: &str,
        date: &str,
        intervals: &str,
        message: &str,
    ) -> Result<Self, FieldError> {
        if name.len() > MAX_NAME_LEN {
            return Err(FieldError::NameTooLong);
        }
        if message.is_empty() {
            return Err(FieldError::EmptyMessage);
        }
        if message.len() > MAX_MESSAGE_LEN {
            return Err(FieldError::MessageTooLong);
        }

        let time = parse_time(time)?;
        let date = if date.is_empty() {
            Local::now().date_naive()
        } else {
            parse_date(date)?
        };
        interval::parse(intervals)?;

        Ok(Self {
            user_id,
            name: name.to_string(),
            date,
            time,
            intervals: intervals.to_string(),
            message: message.to_string(),
        })
    }
}

pub fn parse_time(raw: &str) -> Result<NaiveTime, FieldError> {
    let time = NaiveTime::parse_from_str(raw, TIME_FORMAT).map_err(|_| FieldError::InvalidTime)?;
    // chrono tolerates unpadded fields; the wire format does not.
    if format_time(time) != raw {
        return Err(FieldError::InvalidTime);
    }
    Ok(time)
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, FieldError> {
    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| FieldError::InvalidDate)?;
    if format_date(date) != raw {
        return Err(FieldError::InvalidDate);
    }
    Ok(date)
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
