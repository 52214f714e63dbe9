//! In-memory provider for unit tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use crate::{
    error::{Result, WeatherError},
    model::{Coordinates, GeocodingResult, WeatherData, WeatherForecast},
};

use super::{Geocoder, WeatherSource};

#[derive(Debug, Default)]
pub struct FakeProvider {
    places: Vec<GeocodingResult>,
    weather: Vec<(Coordinates, WeatherData)>,
    forecast: Vec<WeatherForecast>,
    suggestion_delays: HashMap<String, Duration>,
    weather_failure: Mutex<Option<&'static str>>,
    suggestion_failure: Mutex<Option<&'static str>>,
    network_calls: AtomicUsize,
}

pub fn weather(temperature: f64, description: &str) -> WeatherData {
    WeatherData {
        temperature,
        description: description.to_string(),
        icon: "01d".to_string(),
        humidity: 60,
        wind_speed: 12.0,
        pressure: Some(1012.0),
        feels_like: Some(temperature),
        visibility: Some(10.0),
        uv_index: None,
    }
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_place(mut self, name: &str, lat: f64, lon: f64, data: WeatherData) -> Self {
        let place = GeocodingResult::named(name, Coordinates::new(lat, lon));
        self.weather.push((place.coordinates(), data));
        self.places.push(place);
        self
    }

    pub fn with_forecast(mut self, forecast: Vec<WeatherForecast>) -> Self {
        self.forecast = forecast;
        self
    }

    pub fn with_suggestion_delay(mut self, query: &str, delay: Duration) -> Self {
        self.suggestion_delays.insert(query.to_string(), delay);
        self
    }

    pub fn fail_weather(&self, reason: Option<&'static str>) {
        *self.weather_failure.lock() = reason;
    }

    pub fn fail_suggestions(&self, reason: Option<&'static str>) {
        *self.suggestion_failure.lock() = reason;
    }

    pub fn network_calls(&self) -> usize {
        self.network_calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.network_calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn unavailable(operation: &'static str, reason: &str) -> WeatherError {
    WeatherError::Status {
        operation,
        status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
        body: reason.to_string(),
    }
}

#[async_trait]
impl Geocoder for FakeProvider {
    async fn geocode(&self, city: &str) -> Result<Option<Coordinates>> {
        let city = city.trim();
        if city.is_empty() {
            return Ok(None);
        }
        self.hit();

        self.places
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(city))
            .map(|p| Some(p.coordinates()))
            .ok_or_else(|| WeatherError::NotFound(city.to_string()))
    }

    async fn search_suggestions(&self, query: &str) -> Result<Vec<GeocodingResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.hit();

        if let Some(delay) = self.suggestion_delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(reason) = *self.suggestion_failure.lock() {
            return Err(unavailable("geocoding", reason));
        }

        let needle = query.to_lowercase();
        Ok(self
            .places
            .iter()
            .filter(|p| p.name.to_lowercase().starts_with(&needle))
            .take(5)
            .cloned()
            .collect())
    }

    async fn reverse_geocode(&self, coords: Coordinates) -> Result<Option<GeocodingResult>> {
        self.hit();
        Ok(self
            .places
            .iter()
            .find(|p| p.coordinates() == coords)
            .cloned())
    }
}

#[async_trait]
impl WeatherSource for FakeProvider {
    async fn fetch_current(&self, coords: Coordinates) -> Result<WeatherData> {
        self.hit();
        if let Some(reason) = *self.weather_failure.lock() {
            return Err(unavailable("current weather", reason));
        }

        self.weather
            .iter()
            .find(|(c, _)| *c == coords)
            .map(|(_, data)| data.clone())
            .ok_or_else(|| WeatherError::NotFound(format!("{},{}", coords.lat, coords.lon)))
    }

    async fn fetch_forecast(&self, _coords: Coordinates) -> Result<Vec<WeatherForecast>> {
        self.hit();
        if let Some(reason) = *self.weather_failure.lock() {
            return Err(unavailable("forecast", reason));
        }
        Ok(self.forecast.clone())
    }
}
