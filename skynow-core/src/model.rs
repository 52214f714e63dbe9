use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// One candidate place returned by the geocoding API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodingResult {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl GeocodingResult {
    pub fn named(name: impl Into<String>, coords: Coordinates) -> Self {
        Self {
            name: name.into(),
            lat: coords.lat,
            lon: coords.lon,
            country: None,
            state: None,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }

    /// Exact coordinate equality, the identity used by favorites.
    pub fn same_position(&self, other: &GeocodingResult) -> bool {
        self.lat == other.lat && self.lon == other.lon
    }

    /// "state, country" with missing parts skipped.
    pub fn region_label(&self) -> String {
        [self.state.as_deref(), self.country.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Current conditions, already normalized to display units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    /// Whole degrees Celsius.
    pub temperature: f64,
    pub description: String,
    pub icon: String,
    /// Percent.
    pub humidity: u8,
    /// km/h, rounded.
    pub wind_speed: f64,
    /// hPa.
    pub pressure: Option<f64>,
    pub feels_like: Option<f64>,
    /// Kilometres.
    pub visibility: Option<f64>,
    pub uv_index: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastTemperature {
    pub min: f64,
    pub max: f64,
}

/// One calendar day of forecast, folded from the 3-hour entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherForecast {
    /// `YYYY-MM-DD`
    pub date: String,
    pub temperature: ForecastTemperature,
    pub description: String,
    pub icon: String,
    pub humidity: u8,
    /// km/h, rounded.
    pub wind_speed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub city: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl HistoryEntry {
    pub fn for_location(location: &GeocodingResult, weather: &WeatherData) -> Self {
        Self {
            city: location.name.clone(),
            timestamp: Utc::now(),
            temperature: Some(weather.temperature),
            description: Some(weather.description.clone()),
            coordinates: Some(location.coordinates()),
        }
    }

    /// Re-activatable only when coordinates were recorded.
    pub fn location(&self) -> Option<GeocodingResult> {
        self.coordinates
            .map(|coords| GeocodingResult::named(self.city.clone(), coords))
    }
}
