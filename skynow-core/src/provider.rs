use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::{Result, WeatherError},
    model::{Coordinates, GeocodingResult, WeatherData, WeatherForecast},
};

pub mod openweather;

#[cfg(test)]
pub(crate) mod fake;

pub use openweather::OpenWeatherClient;

/// Place-name lookups.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// Best match for a free-text name. Blank input yields `Ok(None)`
    /// without touching the network.
    async fn geocode(&self, city: &str) -> Result<Option<Coordinates>>;

    /// Ranked candidates for autocomplete. Blank input yields an empty list.
    async fn search_suggestions(&self, query: &str) -> Result<Vec<GeocodingResult>>;

    /// Place name for device coordinates, if the provider knows one.
    async fn reverse_geocode(&self, coords: Coordinates) -> Result<Option<GeocodingResult>>;
}

/// Current conditions and daily forecast for a position.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch_current(&self, coords: Coordinates) -> Result<WeatherData>;

    async fn fetch_forecast(&self, coords: Coordinates) -> Result<Vec<WeatherForecast>>;
}

/// Geocodes `city` and fetches its current conditions.
pub async fn current_for_city(
    geocoder: &dyn Geocoder,
    source: &dyn WeatherSource,
    city: &str,
) -> Result<(Coordinates, WeatherData)> {
    let coords = geocoder
        .geocode(city)
        .await?
        .ok_or_else(|| WeatherError::NotFound(city.trim().to_string()))?;
    let weather = source.fetch_current(coords).await?;
    Ok((coords, weather))
}
