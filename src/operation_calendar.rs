//! Year-agnostic operation calendar: how many days of each month a schedule operates on, and
//! which fraction of each hour of the day it is in operation.

use crate::core::units::{DAYS_IN_MONTH, HOURS_PER_DAY, MONTH_DAYS_BEGIN};
use crate::errors::ConfigurationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

// any non-leap year will do for validating month-day pairs
const NON_LEAP_YEAR: i32 = 2025;

/// A calendar day without a year, written as MM-DD.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthDay {
    month: u32,
    day: u32,
}

impl MonthDay {
    pub fn new(month: u32, day: u32) -> Result<Self, ConfigurationError> {
        NaiveDate::from_ymd_opt(NON_LEAP_YEAR, month, day)
            .map(|_| Self { month, day })
            .ok_or_else(|| ConfigurationError::InvalidDate(format!("{month:02}-{day:02}")))
    }

    /// Day of the year, 1 (January 1st) to 365 (December 31st).
    pub fn day_of_year(&self) -> u32 {
        MONTH_DAYS_BEGIN[(self.month - 1) as usize] + self.day - 1
    }
}

impl FromStr for MonthDay {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigurationError::InvalidDate(s.to_string());
        let (month, day) = s.trim().split_once('-').ok_or_else(invalid)?;
        Self::new(
            month.parse().map_err(|_| invalid())?,
            day.parse().map_err(|_| invalid())?,
        )
        .map_err(|_| invalid())
    }
}

impl TryFrom<String> for MonthDay {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthDay> for String {
    fn from(value: MonthDay) -> Self {
        value.to_string()
    }
}

impl Display for MonthDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

/// A time of day written as HH:MM. 24:00 is accepted and denotes the end of the day.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u32,
    minute: u32,
}

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Result<Self, ConfigurationError> {
        if (hour < HOURS_PER_DAY && minute < 60) || (hour == HOURS_PER_DAY && minute == 0) {
            Ok(Self { hour, minute })
        } else {
            Err(ConfigurationError::InvalidTime(format!(
                "{hour:02}:{minute:02}"
            )))
        }
    }

    /// Time as fractional hours since midnight.
    pub fn hours(&self) -> f64 {
        self.hour as f64 + self.minute as f64 / 60.
    }
}

impl FromStr for TimeOfDay {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigurationError::InvalidTime(s.to_string());
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        Self::new(
            hour.parse().map_err(|_| invalid())?,
            minute.parse().map_err(|_| invalid())?,
        )
        .map_err(|_| invalid())
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OperationCalendar {
    /// Operating days per month, January first
    pub operation_days: [u32; 12],
    /// Fraction of each hour of the day (0 to 23) in operation
    pub operation_hours: [f64; 24],
}

impl OperationCalendar {
    pub fn new(
        date_begin: MonthDay,
        date_end: MonthDay,
        time_begin: TimeOfDay,
        time_end: TimeOfDay,
    ) -> Self {
        Self {
            operation_days: monthly_operation_days(date_begin, date_end),
            operation_hours: daily_operation_hours(time_begin, time_end),
        }
    }

    pub fn days_in_month(&self, month: u32) -> u32 {
        self.operation_days[(month - 1) as usize]
    }

    pub fn hour_weight(&self, hour: u32) -> f64 {
        self.operation_hours[hour as usize]
    }
}

/// Number of operating days in each month for the (inclusive) date range. A range whose end
/// lies before its beginning wraps over the turn of the year.
pub fn monthly_operation_days(date_begin: MonthDay, date_end: MonthDay) -> [u32; 12] {
    let day_begin = date_begin.day_of_year();
    let day_end = date_end.day_of_year();

    let mut operation_days = [0; 12];
    for (month_idx, days) in operation_days.iter_mut().enumerate() {
        let month_first = MONTH_DAYS_BEGIN[month_idx];
        let month_last = MONTH_DAYS_BEGIN[month_idx + 1] - 1;

        *days = if day_begin <= day_end {
            overlapping_days((month_first, month_last), (day_begin, day_end))
        } else {
            // operate on every day except the gap between end and beginning
            DAYS_IN_MONTH[month_idx]
                - overlapping_days((month_first, month_last), (day_end + 1, day_begin - 1))
        };
    }

    operation_days
}

/// Fraction of each hour of the day falling within [begin, end). An end before the beginning
/// wraps past midnight. Equal begin and end times describe an empty window.
pub fn daily_operation_hours(time_begin: TimeOfDay, time_end: TimeOfDay) -> [f64; 24] {
    let hour_begin = time_begin.hours();
    let mut hour_end = time_end.hours();
    if hour_end < hour_begin {
        hour_end += HOURS_PER_DAY as f64;
    }

    let mut operation_hours = [0.; 24];
    if hour_end == hour_begin {
        return operation_hours;
    }

    for hour in (hour_begin.floor() as u32)..(hour_end.ceil() as u32) {
        let start = hour as f64;
        let fraction = hour_end.min(start + 1.) - hour_begin.max(start);
        if fraction > 0. {
            operation_hours[(hour % HOURS_PER_DAY) as usize] += fraction;
        }
    }

    operation_hours
}

fn overlapping_days(range: (u32, u32), other: (u32, u32)) -> u32 {
    let first = range.0.max(other.0) as i64;
    let last = range.1.min(other.1) as i64;
    (last - first + 1).max(0) as u32
}
