//! Calendar-date helpers for the `YYYY-MM-DD` wire format

use chrono::{DateTime, Local, NaiveDate, TimeZone};

use crate::error::{AppError, AppResult};

/// Wire format for every date exchanged with the API
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| AppError::invalid(format!("Invalid date '{}' (expected YYYY-MM-DD)", value)))
}

/// Calendar date of an instant as seen in its own offset, never converted to UTC
pub fn calendar_date<Tz: TimeZone>(instant: &DateTime<Tz>) -> NaiveDate {
    instant.date_naive()
}

/// Source of "today" for anything that buckets by day
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        calendar_date(&Local::now())
    }
}

/// Clock pinned to a single day
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Chart label for a day, e.g. `Jan 4`
pub fn day_label(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// Chart label for a month, e.g. `Jan 2025`
pub fn month_label(year: i32, month: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|| format!("{}-{:02}", year, month))
}
