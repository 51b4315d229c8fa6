use chrono::{DateTime, Utc};
use quickcalc_core::error::ReqwestErrorExt;
use quickcalc_core::{AppError, NetworkError, WeatherError};
use serde::{Deserialize, Serialize};

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

/// Localized names attached to a geocoding match
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalNames {
    pub en: Option<String>,
}

/// One match from the direct geocoding endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub name: String,
    #[serde(default)]
    pub local_names: Option<LocalNames>,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub country: String,
}

impl GeocodeResult {
    /// English name when the API provides one, otherwise the primary name
    pub fn display_name(&self) -> &str {
        self.local_names
            .as_ref()
            .and_then(|n| n.en.as_deref())
            .unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiCurrentWeather {
    pub main: ApiMain,
    #[serde(default)]
    pub weather: Vec<ApiCondition>,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiMain {
    pub temp: f64,
    pub humidity: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiCondition {
    pub description: String,
    pub icon: String,
}

/// Current conditions for a searched city
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReport {
    /// Station name reported by the weather endpoint
    pub name: String,
    /// ISO country code from geocoding
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Temperature in the configured unit system
    pub temperature: f64,
    /// Suffix for `temperature`, e.g. `°F`
    pub unit_symbol: String,
    /// Relative humidity, percent
    pub humidity: u8,
    pub description: String,
    /// OpenWeather icon code, e.g. `02d`
    pub icon: String,
    pub fetched_at: DateTime<Utc>,
}

impl WeatherReport {
    pub(crate) fn from_api(api: ApiCurrentWeather, place: &GeocodeResult, units: &str) -> Self {
        let (description, icon) = api
            .weather
            .into_iter()
            .next()
            .map(|c| (c.description, c.icon))
            .unwrap_or_default();

        let name = if api.name.is_empty() {
            place.display_name().to_string()
        } else {
            api.name
        };

        Self {
            name,
            country: place.country.clone(),
            latitude: place.lat,
            longitude: place.lon,
            temperature: api.main.temp,
            unit_symbol: unit_symbol(units).to_string(),
            humidity: api.main.humidity,
            description,
            icon,
            fetched_at: Utc::now(),
        }
    }

    /// Rounded temperature with unit, e.g. `73°F`
    pub fn temperature_label(&self) -> String {
        format!("{}{}", self.temperature.round() as i64, self.unit_symbol)
    }

    pub fn humidity_label(&self) -> String {
        format!("Humidity: {}%", self.humidity)
    }

    /// Condition icon image URL, empty when no icon was reported
    pub fn icon_url(&self) -> String {
        if self.icon.is_empty() {
            return String::new();
        }
        format!("{}/{}@4x.png", ICON_BASE_URL, self.icon)
    }
}

/// Temperature suffix for an OpenWeather `units` value
pub fn unit_symbol(units: &str) -> &'static str {
    match units {
        "metric" => "°C",
        "standard" => "K",
        _ => "°F",
    }
}

/// Weather lookup errors
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("City not found: {0}")]
    CityNotFound(String),
    #[error("Weather request failed with status {status}")]
    WeatherUnavailable { status: u16 },
    #[error("Weather API key is not configured")]
    MissingApiKey,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    Parse(String),
}

impl LookupError {
    /// Message shown inline in the weather panel
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::CityNotFound(_) => "City not found",
            Self::WeatherUnavailable { .. } => "Failed to fetch weather data",
            Self::MissingApiKey => "Weather API key is not configured",
            Self::Network(_) | Self::Parse(_) => "An error occurred",
        }
    }
}

impl From<LookupError> for AppError {
    fn from(e: LookupError) -> Self {
        match e {
            LookupError::CityNotFound(city) => AppError::Weather(WeatherError::CityNotFound(city)),
            LookupError::WeatherUnavailable { status } => {
                AppError::Weather(WeatherError::ApiError(format!("HTTP {}", status)))
            }
            LookupError::MissingApiKey => AppError::Weather(WeatherError::MissingApiKey),
            LookupError::Network(e) => AppError::Network(e.into_network_error()),
            LookupError::Parse(msg) => AppError::Network(NetworkError::InvalidResponse(msg)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place() -> GeocodeResult {
        GeocodeResult {
            name: "San Francisco".to_string(),
            local_names: None,
            lat: 37.7749,
            lon: -122.4194,
            country: "US".to_string(),
        }
    }

    fn api(temp: f64) -> ApiCurrentWeather {
        serde_json::from_value(serde_json::json!({
            "main": { "temp": temp, "humidity": 65 },
            "weather": [{ "description": "partly cloudy", "icon": "02d" }],
            "name": "San Francisco"
        }))
        .unwrap()
    }

    #[test]
    fn test_report_labels() {
        let report = WeatherReport::from_api(api(72.5), &place(), "imperial");
        assert_eq!(report.temperature_label(), "73°F");
        assert_eq!(report.humidity_label(), "Humidity: 65%");
        assert_eq!(report.description, "partly cloudy");
        assert_eq!(
            report.icon_url(),
            "https://openweathermap.org/img/wn/02d@4x.png"
        );
        assert_eq!(report.country, "US");
    }

    #[test]
    fn test_negative_temperature_rounds() {
        let report = WeatherReport::from_api(api(-3.6), &place(), "imperial");
        assert_eq!(report.temperature_label(), "-4°F");
    }

    #[test]
    fn test_missing_conditions() {
        let api: ApiCurrentWeather = serde_json::from_value(serde_json::json!({
            "main": { "temp": 50.0, "humidity": 10 },
            "weather": [],
            "name": ""
        }))
        .unwrap();
        let report = WeatherReport::from_api(api, &place(), "imperial");
        assert_eq!(report.description, "");
        assert_eq!(report.icon_url(), "");
        assert_eq!(report.name, "San Francisco");
    }

    #[test]
    fn test_metric_label() {
        let report = WeatherReport::from_api(api(21.2), &place(), "metric");
        assert_eq!(report.temperature_label(), "21°C");
        assert_eq!(unit_symbol("standard"), "K");
    }

    #[test]
    fn test_geocode_display_name_prefers_english() {
        let geo: GeocodeResult = serde_json::from_value(serde_json::json!({
            "name": "München",
            "local_names": { "en": "Munich", "de": "München" },
            "lat": 48.137,
            "lon": 11.575,
            "country": "DE"
        }))
        .unwrap();
        assert_eq!(geo.display_name(), "Munich");
        assert_eq!(place().display_name(), "San Francisco");
    }

    #[test]
    fn test_lookup_error_messages() {
        assert_eq!(
            LookupError::CityNotFound("x".into()).user_message(),
            "City not found"
        );
        assert_eq!(
            LookupError::WeatherUnavailable { status: 500 }.user_message(),
            "Failed to fetch weather data"
        );
        assert_eq!(
            LookupError::Parse("bad json".into()).user_message(),
            "An error occurred"
        );
    }

    #[test]
    fn test_lookup_error_into_app_error() {
        let app: AppError = LookupError::CityNotFound("Atlantis".into()).into();
        assert_eq!(app.user_message(), "City not found");

        let app: AppError = LookupError::MissingApiKey.into();
        assert!(matches!(app, AppError::Weather(WeatherError::MissingApiKey)));
    }
}
