//! OpenWeather client: direct geocoding followed by current conditions.

use std::sync::Arc;
use std::time::Duration;

use quickcalc_core::WeatherConfig;
use reqwest::Client;
use tracing::instrument;

use crate::types::{ApiCurrentWeather, GeocodeResult, LookupError, WeatherReport};

const USER_AGENT: &str = concat!("QuickCalc/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    api_key: String,
    geocode_url: String,
    weather_url: String,
    units: String,
    lang: String,
}

impl WeatherProvider {
    pub fn new(config: &WeatherConfig) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            api_key: config.api_key.trim().to_string(),
            geocode_url: config.geocode_url.clone(),
            weather_url: config.weather_url.clone(),
            units: config.units.clone(),
            lang: config.lang.clone(),
        })
    }

    /// Geocode `city`, then fetch current conditions for the first match.
    #[instrument(skip(self), level = "info")]
    pub async fn lookup(&self, city: &str) -> Result<WeatherReport, LookupError> {
        let place = self.geocode(city).await?;
        tracing::info!(
            "Fetching weather for {} at coordinates: {}, {}",
            place.name,
            place.lat,
            place.lon
        );
        self.current_weather(&place).await
    }

    /// First geocoding match for `city`.
    ///
    /// A non-2xx status and an empty match list both mean the city was not found.
    #[instrument(skip(self), level = "debug")]
    pub async fn geocode(&self, city: &str) -> Result<GeocodeResult, LookupError> {
        let api_key = self.api_key()?;
        let query = city.trim();
        let url = self.geocode_request_url(query, api_key);
        tracing::debug!("Geocoding request: {}", redact(&url));

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Geocoding returned status {}", status);
            return Err(LookupError::CityNotFound(query.to_string()));
        }

        let body = response.text().await?;
        let matches: Vec<GeocodeResult> = serde_json::from_str(&body)
            .map_err(|e| LookupError::Parse(format!("geocoding response: {}", e)))?;

        matches
            .into_iter()
            .next()
            .ok_or_else(|| LookupError::CityNotFound(query.to_string()))
    }

    /// Current conditions at a geocoded place.
    #[instrument(skip(self, place), fields(place = %place.name), level = "debug")]
    pub async fn current_weather(&self, place: &GeocodeResult) -> Result<WeatherReport, LookupError> {
        let api_key = self.api_key()?;
        let url = self.weather_request_url(place.lat, place.lon, api_key);
        tracing::debug!("Weather request: {}", redact(&url));

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::WeatherUnavailable {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let api: ApiCurrentWeather = serde_json::from_str(&body)
            .map_err(|e| LookupError::Parse(format!("weather response: {}", e)))?;

        let report = WeatherReport::from_api(api, place, &self.units);
        tracing::info!(
            "Weather data received for {}: {} {}",
            report.name,
            report.temperature_label(),
            report.description
        );
        Ok(report)
    }

    fn api_key(&self) -> Result<&str, LookupError> {
        if self.api_key.is_empty() {
            Err(LookupError::MissingApiKey)
        } else {
            Ok(&self.api_key)
        }
    }

    fn geocode_request_url(&self, city: &str, api_key: &str) -> String {
        format!(
            "{}?q={}&limit=1&appid={}",
            self.geocode_url,
            urlencoding::encode(city),
            urlencoding::encode(api_key)
        )
    }

    fn weather_request_url(&self, lat: f64, lon: f64, api_key: &str) -> String {
        format!(
            "{}?lat={}&lon={}&appid={}&units={}&lang={}",
            self.weather_url,
            lat,
            lon,
            urlencoding::encode(api_key),
            urlencoding::encode(&self.units),
            urlencoding::encode(&self.lang)
        )
    }

}

/// URL with the `appid` query value masked, for logging.
fn redact(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };

    let pairs: Vec<&str> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some(("appid", _)) => "appid=***",
            _ => pair,
        })
        .collect();

    format!("{}?{}", base, pairs.join("&"))
}
