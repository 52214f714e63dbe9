use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    config::{Config, Endpoints},
    error::{Result, WeatherError},
    forecast::{ForecastSample, fold_forecast},
    model::{Coordinates, GeocodingResult, WeatherData, WeatherForecast},
    units,
};

use super::{Geocoder, WeatherSource};

/// Client for the OpenWeather geocoding and weather APIs.
///
/// The key is checked per request so that a client without credentials can
/// still answer blank queries and report `MissingApiKey` on real lookups.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: Option<String>,
    endpoints: Endpoints,
    language: String,
    suggestion_limit: u8,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: Option<String>, endpoints: Endpoints) -> Result<Self> {
        let http = Client::builder()
            .timeout(endpoints.timeout())
            .build()
            .map_err(|source| WeatherError::Http {
                operation: "client setup",
                source,
            })?;

        Ok(Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            endpoints,
            language: "fr".to_string(),
            suggestion_limit: 5,
            http,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.api_key().ok().map(str::to_string);
        Ok(Self::new(api_key, config.endpoints.clone())?
            .with_language(config.language.clone())
            .with_suggestion_limit(config.search.suggestion_limit))
    }

    pub fn with_language(mut self, language: String) -> Self {
        self.language = language;
        self
    }

    pub fn with_suggestion_limit(mut self, limit: u8) -> Self {
        self.suggestion_limit = limit.max(1);
        self
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or(WeatherError::MissingApiKey)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, String)],
        operation: &'static str,
    ) -> Result<T> {
        let api_key = self.api_key()?;

        tracing::debug!(%url, operation, "OpenWeather request");

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", api_key)])
            .send()
            .await
            .map_err(|source| WeatherError::Http { operation, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| WeatherError::Http { operation, source })?;

        if !status.is_success() {
            tracing::warn!(%status, operation, "OpenWeather returned an error status");
            tracing::debug!(%status, operation, body = %truncate_body(&body), "error response body");
            return Err(WeatherError::Status {
                operation,
                status,
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| WeatherError::Decode { operation, source })
    }

    async fn direct(&self, query: &str, limit: u8) -> Result<Vec<GeocodingResult>> {
        let places: Vec<OwPlace> = self
            .get_json(
                format!("{}/direct", self.endpoints.geo),
                &[("q", query.to_string()), ("limit", limit.to_string())],
                "geocoding",
            )
            .await?;

        Ok(places.into_iter().map(GeocodingResult::from).collect())
    }

    fn weather_query(&self, coords: Coordinates) -> Vec<(&'static str, String)> {
        vec![
            ("lat", coords.lat.to_string()),
            ("lon", coords.lon.to_string()),
            ("units", "metric".to_string()),
            ("lang", self.language.clone()),
        ]
    }
}

#[async_trait]
impl Geocoder for OpenWeatherClient {
    async fn geocode(&self, city: &str) -> Result<Option<Coordinates>> {
        let city = city.trim();
        if city.is_empty() {
            return Ok(None);
        }

        let places = match self.direct(city, 1).await {
            Ok(places) => places,
            Err(WeatherError::Status { status, .. }) => {
                tracing::debug!(%status, city, "geocoding status treated as not found");
                return Err(WeatherError::NotFound(city.to_string()));
            }
            Err(err) => return Err(err),
        };

        places
            .first()
            .map(|place| Some(place.coordinates()))
            .ok_or_else(|| WeatherError::NotFound(city.to_string()))
    }

    async fn search_suggestions(&self, query: &str) -> Result<Vec<GeocodingResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut places = self.direct(query, self.suggestion_limit).await?;
        places.truncate(self.suggestion_limit as usize);
        Ok(places)
    }

    async fn reverse_geocode(&self, coords: Coordinates) -> Result<Option<GeocodingResult>> {
        let places: Vec<OwPlace> = self
            .get_json(
                format!("{}/reverse", self.endpoints.geo),
                &[
                    ("lat", coords.lat.to_string()),
                    ("lon", coords.lon.to_string()),
                    ("limit", "1".to_string()),
                ],
                "reverse geocoding",
            )
            .await?;

        Ok(places.into_iter().next().map(GeocodingResult::from))
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn fetch_current(&self, coords: Coordinates) -> Result<WeatherData> {
        let parsed: OwCurrentResponse = self
            .get_json(
                format!("{}/weather", self.endpoints.weather),
                &self.weather_query(coords),
                "current weather",
            )
            .await?;

        Ok(parsed.into())
    }

    async fn fetch_forecast(&self, coords: Coordinates) -> Result<Vec<WeatherForecast>> {
        let parsed: OwForecastResponse = self
            .get_json(
                format!("{}/forecast", self.endpoints.weather),
                &self.weather_query(coords),
                "forecast",
            )
            .await?;

        Ok(fold_forecast(
            parsed.list.into_iter().map(ForecastSample::from),
        ))
    }
}

#[derive(Debug, Deserialize)]
struct OwPlace {
    name: String,
    lat: f64,
    lon: f64,
    country: Option<String>,
    state: Option<String>,
}

impl From<OwPlace> for GeocodingResult {
    fn from(p: OwPlace) -> Self {
        GeocodingResult {
            name: p.name,
            lat: p.lat,
            lon: p.lon,
            country: p.country,
            state: p.state,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: Option<f64>,
    humidity: u8,
    pressure: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
    visibility: Option<f64>,
    uvi: Option<f64>,
}

impl From<OwCurrentResponse> for WeatherData {
    fn from(parsed: OwCurrentResponse) -> Self {
        let (description, icon) = first_condition(parsed.weather);

        WeatherData {
            temperature: units::round_temperature(parsed.main.temp),
            description,
            icon,
            humidity: parsed.main.humidity,
            wind_speed: units::wind_kmh(parsed.wind.speed),
            pressure: parsed.main.pressure,
            feels_like: parsed.main.feels_like.map(units::round_temperature),
            visibility: units::visibility_km(parsed.visibility),
            uv_index: parsed.uvi,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt_txt: String,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

impl From<OwForecastEntry> for ForecastSample {
    fn from(entry: OwForecastEntry) -> Self {
        let (description, icon) = first_condition(entry.weather);

        ForecastSample {
            dt_txt: entry.dt_txt,
            temp: entry.main.temp,
            humidity: entry.main.humidity,
            wind_speed_mps: entry.wind.speed,
            description,
            icon,
        }
    }
}

fn first_condition(weather: Vec<OwWeather>) -> (String, String) {
    weather
        .into_iter()
        .next()
        .map(|w| (w.description, w.icon))
        .unwrap_or_else(|| ("Unknown".to_string(), String::new()))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_response_is_normalized() {
        let raw = r#"{
            "main": {"temp": 28.6, "feels_like": 32.4, "humidity": 84, "pressure": 1011},
            "weather": [{"description": "ciel dégagé", "icon": "01d"}],
            "wind": {"speed": 4.1},
            "visibility": 8000
        }"#;
        let parsed: OwCurrentResponse = serde_json::from_str(raw).expect("valid json");
        let data = WeatherData::from(parsed);

        assert_eq!(data.temperature, 29.0);
        assert_eq!(data.feels_like, Some(32.0));
        assert_eq!(data.wind_speed, 15.0);
        assert_eq!(data.visibility, Some(8.0));
        assert_eq!(data.pressure, Some(1011.0));
        assert_eq!(data.uv_index, None);
        assert_eq!(data.description, "ciel dégagé");
        assert_eq!(data.icon, "01d");
    }

    #[test]
    fn missing_optional_fields_stay_absent() {
        let raw = r#"{
            "main": {"temp": 10.2, "humidity": 40},
            "weather": [],
            "wind": {"speed": 0}
        }"#;
        let parsed: OwCurrentResponse = serde_json::from_str(raw).expect("valid json");
        let data = WeatherData::from(parsed);

        assert_eq!(data.feels_like, None);
        assert_eq!(data.pressure, None);
        assert_eq!(data.visibility, None);
        assert_eq!(data.description, "Unknown");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let body = "é".repeat(300);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 203);
    }

    #[tokio::test]
    async fn blank_queries_do_not_need_credentials() {
        let client = OpenWeatherClient::new(None, Endpoints::default()).expect("client");

        assert_eq!(client.geocode("   ").await.expect("blank geocode"), None);
        assert!(
            client
                .search_suggestions("")
                .await
                .expect("blank suggestions")
                .is_empty()
        );
    }

    #[tokio::test]
    async fn from_config_ignores_blank_key() {
        let mut config = Config::default();
        config.upsert_api_key("   ".into());
        let client = OpenWeatherClient::from_config(&config).expect("client");

        let err = client.geocode("Douala").await.unwrap_err();
        assert!(matches!(err, WeatherError::MissingApiKey));
    }

    #[tokio::test]
    async fn missing_key_is_reported_for_real_lookups() {
        let client = OpenWeatherClient::new(Some(" ".into()), Endpoints::default()).expect("client");

        let err = client.geocode("Douala").await.unwrap_err();
        assert!(matches!(err, WeatherError::MissingApiKey));

        let err = client
            .fetch_current(Coordinates::new(4.05, 9.77))
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherError::MissingApiKey));
    }
}
