//! Plain-text rendering of controller state.

use chrono::{DateTime, Utc};
use std::fmt::Write;

use weather_core::{
    RecentSearchHistory, SearchController, UnitPreference, WeatherSnapshot,
    format::{country_flag, day_label, speed_label, temperature, temperature_symbol},
};

pub const BUSY_INDICATOR: &str = "⏳ Searching...";

/// Everything the user should currently see.
pub fn screen(ctl: &SearchController, now: DateTime<Utc>) -> String {
    let mut out = String::new();

    if let Some(msg) = ctl.state().error_message() {
        let _ = writeln!(out, "Oops! {msg}");
    }

    if ctl.state().is_loading() {
        let _ = writeln!(out, "{BUSY_INDICATOR}");
    }

    if let Some(snapshot) = ctl.displayable_snapshot() {
        out.push_str(&panel(snapshot, ctl.unit(), ctl.recent_searches(), now));
    }

    out
}

pub fn heading(snapshot: &WeatherSnapshot) -> String {
    match snapshot.country() {
        Some(country) => match country_flag(Some(country)) {
            Some(flag) => format!("{}, {country} {flag}", snapshot.name),
            None => format!("{}, {country}", snapshot.name),
        },
        None => snapshot.name.clone(),
    }
}

fn degrees(kelvin: f64, unit: UnitPreference) -> String {
    format!("{} {}", temperature(kelvin, unit), temperature_symbol(unit))
}

fn speed(value: Option<f64>, unit: UnitPreference) -> String {
    match value {
        Some(v) => format!("{v} {}", speed_label(unit)),
        None => "-".to_string(),
    }
}

fn optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Result panel: conditions, wind, then recent searches.
pub fn panel(
    snapshot: &WeatherSnapshot,
    unit: UnitPreference,
    history: &RecentSearchHistory,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    let wind = snapshot.wind.clone().unwrap_or_default();

    let _ = writeln!(out, "{}", heading(snapshot));
    let _ = writeln!(out, "Weather · {}", day_label(snapshot.timezone, now));

    if let Some(condition) = snapshot.condition() {
        let _ = writeln!(out, "{}", condition.description);
        let _ = writeln!(out, "{}", condition.icon_url());
        let _ = writeln!(out);
        let _ = writeln!(out, "Current temperature");
        let _ = writeln!(out, "  {}  {}", condition.main, degrees(snapshot.main.temp, unit));
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Current Weather");
    let _ = writeln!(out, "  Feels like  {}", degrees(snapshot.main.feels_like, unit));
    let _ = writeln!(out, "  Humidity    {}", snapshot.main.humidity);
    let _ = writeln!(out, "  Pressure    {}", snapshot.main.pressure);

    let _ = writeln!(out);
    let _ = writeln!(out, "Current Wind");
    let _ = writeln!(out, "  Speed   {}", speed(wind.speed, unit));
    let _ = writeln!(out, "  Degree  {}", optional(wind.deg));
    let _ = writeln!(out, "  Gust    {}", speed(wind.gust, unit));

    let _ = writeln!(out);
    let _ = writeln!(out, "Recent Search");
    out.push_str(&recent_searches(history));

    out
}

/// One numbered line per entry; nothing for an empty history.
pub fn recent_searches(history: &RecentSearchHistory) -> String {
    history
        .iter()
        .enumerate()
        .map(|(i, city)| format!("  {}. {city}\n", i + 1))
        .collect()
}
