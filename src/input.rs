// Parsing of what the user types at the prompts. Everything here is pure so
// the handlers in `ui` only decide what to do with the result.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Comfort duration offered by the prompts, in minutes.
pub const DEFAULT_DURATION_MINUTES: u32 = 60;

/// Vacation setpoint offered by the prompts, in hundredths of a degree.
pub const DEFAULT_VACATION_TEMPERATURE: i32 = 1500;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum InputError {
    #[error("Invalid input. Please enter a valid temperature.")]
    Temperature(String),

    #[error("Invalid duration: {0}")]
    Duration(String),

    #[error("Invalid date {0:?}, expected YYYY-MM-DD")]
    Date(String),

    #[error("End date is required for vacation mode.")]
    MissingEndDate,

    #[error("Invalid selection.")]
    Selection,
}

/// Degrees Celsius as typed (`21.5`) to hundredths (`2150`).
pub fn parse_celsius(raw: &str) -> Result<i32, InputError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| InputError::Temperature(raw.to_string()))?;
    let hundredths = (value * 100.0).round();
    if !hundredths.is_finite() || hundredths.abs() > f64::from(i32::MAX) {
        return Err(InputError::Temperature(raw.to_string()));
    }
    Ok(hundredths as i32)
}

/// Like `parse_celsius`, but an empty answer takes `default`.
pub fn celsius_or(raw: &str, default: i32) -> Result<i32, InputError> {
    if raw.trim().is_empty() {
        Ok(default)
    } else {
        parse_celsius(raw)
    }
}

pub fn duration_or_default(raw: &str) -> Result<u32, InputError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(DEFAULT_DURATION_MINUTES);
    }
    raw.parse()
        .map_err(|_| InputError::Duration(raw.to_string()))
}

pub fn parse_date(raw: &str) -> Result<NaiveDateTime, InputError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| InputError::Date(raw.to_string()))
}
