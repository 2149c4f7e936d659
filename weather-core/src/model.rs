use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A trimmed, non-empty city name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyQuery);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display units. Never affects what is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitPreference {
    #[default]
    Metric,
    Imperial,
}

impl UnitPreference {
    pub fn toggled(self) -> Self {
        match self {
            UnitPreference::Metric => UnitPreference::Imperial,
            UnitPreference::Imperial => UnitPreference::Metric,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UnitPreference::Metric => "metric",
            UnitPreference::Imperial => "imperial",
        }
    }
}

impl std::fmt::Display for UnitPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Error(String),
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            RequestState::Error(msg) => Some(msg.as_str()),
            _ => None,
        }
    }
}

/// Core metrics, Kelvin for temperatures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainMetrics {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub pressure: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub icon: String,
    pub main: String,
    pub description: String,
}

impl Condition {
    pub fn icon_url(&self) -> String {
        format!("http://openweathermap.org/img/wn/{}.png", self.icon)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Wind {
    pub speed: Option<f64>,
    pub deg: Option<f64>,
    pub gust: Option<f64>,
}

/// Everything one successful lookup returned.
///
/// Field names follow the provider's JSON so the body deserializes directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub name: String,
    pub main: MainMetrics,
    #[serde(default)]
    pub sys: Option<SystemInfo>,
    #[serde(default)]
    pub weather: Vec<Condition>,
    /// Offset from UTC in seconds.
    #[serde(default)]
    pub timezone: i64,
    #[serde(default)]
    pub wind: Option<Wind>,
}

impl WeatherSnapshot {
    /// Whether the result panel has enough to show.
    pub fn is_displayable(&self) -> bool {
        !self.name.is_empty() && !self.weather.is_empty()
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.weather.first()
    }

    pub fn country(&self) -> Option<&str> {
        self.sys.as_ref().and_then(|s| s.country.as_deref())
    }
}
