//! Display helpers shared by every front-end.
//!
//! Temperatures arrive from the provider in Kelvin; everything here turns
//! raw snapshot fields into what a user reads.

use chrono::{DateTime, Duration, Utc};

use crate::model::UnitPreference;

const KELVIN_OFFSET: f64 = 273.15;

/// Regional indicator 'A' minus ASCII 'A'.
const FLAG_OFFSET: u32 = 127_397;

/// Round half toward positive infinity, so -0.5 becomes 0 rather than -1.
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

pub fn celsius(kelvin: f64) -> i64 {
    round_half_up(kelvin - KELVIN_OFFSET)
}

pub fn fahrenheit(kelvin: f64) -> i64 {
    round_half_up((kelvin - KELVIN_OFFSET) * 1.8 + 32.0)
}

/// Convert a Kelvin reading for display. Used for temperature and feels-like alike.
pub fn temperature(kelvin: f64, unit: UnitPreference) -> i64 {
    match unit {
        UnitPreference::Metric => celsius(kelvin),
        UnitPreference::Imperial => fahrenheit(kelvin),
    }
}

pub fn temperature_symbol(unit: UnitPreference) -> &'static str {
    match unit {
        UnitPreference::Metric => "°C",
        UnitPreference::Imperial => "°F",
    }
}

/// Label for wind speed and gust.
///
/// Follows the temperature unit, not the units the wind data was fetched in.
pub fn speed_label(unit: UnitPreference) -> &'static str {
    match unit {
        UnitPreference::Metric => "M/S",
        UnitPreference::Imperial => "MPH",
    }
}

/// Turn a two-letter ISO country code into its flag emoji.
///
/// Returns `None` for a missing code or anything that is not exactly two ASCII letters.
pub fn country_flag(code: Option<&str>) -> Option<String> {
    let code = code?.trim();
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    code.chars()
        .map(|c| char::from_u32(FLAG_OFFSET + c.to_ascii_uppercase() as u32))
        .collect()
}

/// Long English weekday at a location `offset_secs` away from UTC.
///
/// The offset shifts `now`; it is not read as a timestamp of its own.
/// An offset that does not fit in a date leaves `now` unshifted.
pub fn day_label(offset_secs: i64, now: DateTime<Utc>) -> String {
    let local = Duration::try_seconds(offset_secs)
        .and_then(|offset| now.checked_add_signed(offset))
        .unwrap_or(now);
    local.format("%A").to_string()
}
