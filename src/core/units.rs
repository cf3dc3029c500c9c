use thiserror::Error;

pub const WATTS_PER_KILOWATT: u32 = 1_000;
pub const HOURS_PER_DAY: u32 = 24;
pub const MONTHS_PER_YEAR: u32 = 12;
pub const DAYS_PER_YEAR: u32 = 365;
pub const DAYS_IN_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

// Day of year (1-indexed, non-leap year) on which each month begins. There are 13 values so
// that the end of December is handled correctly.
pub(crate) const MONTH_DAYS_BEGIN: [u32; 13] =
    [1, 32, 60, 91, 121, 152, 182, 213, 244, 274, 305, 335, 366];
// Day of year representative of each month (mid-month)
pub(crate) const MONTH_DAYS_MID: [u32; 12] =
    [16, 46, 75, 106, 136, 167, 197, 228, 259, 289, 320, 350];

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub(crate) const ZERO_CELSIUS_IN_KELVIN: f64 = 273.15;

/// Name of a month given as 1 (January) to 12 (December).
pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES[(month - 1) as usize]
}

pub(crate) fn celsius_to_kelvin(temp_c: f64) -> f64 {
    temp_c + ZERO_CELSIUS_IN_KELVIN
}

pub(crate) fn check_above_absolute_zero(temp_c: f64) -> Result<(), BelowAbsoluteZeroError> {
    if temp_c <= -ZERO_CELSIUS_IN_KELVIN {
        Err(BelowAbsoluteZeroError::from_c(temp_c))
    } else {
        Ok(())
    }
}

pub(crate) fn watts_to_kilowatts(watts: f64) -> f64 {
    watts / WATTS_PER_KILOWATT as f64
}

#[derive(Debug, Error)]
#[error("A temperature of {k}ºK/{}ºC was encountered, which is not above absolute zero", k - ZERO_CELSIUS_IN_KELVIN)]
pub(crate) struct BelowAbsoluteZeroError {
    k: f64,
}

impl BelowAbsoluteZeroError {
    fn from_c(c: f64) -> Self {
        Self {
            k: c + ZERO_CELSIUS_IN_KELVIN,
        }
    }
}
