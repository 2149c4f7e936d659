use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::{error::FetchError, model::{SearchQuery, WeatherSnapshot}};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    /// Point at another host, e.g. a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, FetchError> {
        self.http = Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip_all, fields(city = %city))]
    async fn current_weather(&self, city: &SearchQuery) -> Result<WeatherSnapshot, FetchError> {
        let url = format!("{}/weather", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[("q", city.as_str()), ("APPID", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            warn!(%status, "OpenWeather current request failed");
            return Err(FetchError::NotFound { status: status.as_u16() });
        }

        let body = res.text().await?;
        let snapshot: WeatherSnapshot = serde_json::from_str(&body)?;

        debug!(name = %snapshot.name, conditions = snapshot.weather.len(), "weather fetched");
        Ok(snapshot)
    }
}
