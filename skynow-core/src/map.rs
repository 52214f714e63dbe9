//! Map pins. Drawing is left to whatever renders the markers.

use std::sync::Arc;

use serde::Serialize;

use crate::{
    error::Result,
    explore::fetch_presets,
    model::{Coordinates, GeocodingResult, WeatherData},
    presets,
    provider::{Geocoder, WeatherSource, current_for_city},
};

/// Yaoundé.
pub const DEFAULT_CENTER: Coordinates = Coordinates {
    lat: 3.848,
    lon: 11.5021,
};
pub const DEFAULT_ZOOM: u8 = 6;
pub const CITY_ZOOM: u8 = 10;
pub const REGION_ZOOM: u8 = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub position: Coordinates,
    pub popup: String,
    pub city: String,
    pub temp: f64,
}

impl MapMarker {
    pub fn new(city: &str, position: Coordinates, weather: &WeatherData) -> Self {
        Self {
            position,
            popup: format!("{city}: {}°C - {}", weather.temperature, weather.description),
            city: city.to_string(),
            temp: weather.temperature,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: Coordinates,
    pub zoom: u8,
    pub markers: Vec<MapMarker>,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            markers: Vec::new(),
        }
    }
}

impl MapView {
    /// Recenters on a device position; markers are kept.
    pub fn center_on(&mut self, position: Coordinates) {
        self.center = position;
        self.zoom = CITY_ZOOM;
    }

    /// Replaces the markers with a single pin for `city`.
    pub async fn search(
        &mut self,
        geocoder: &dyn Geocoder,
        source: &dyn WeatherSource,
        city: &str,
    ) -> Result<()> {
        let (coords, weather) = current_for_city(geocoder, source, city).await?;
        self.pin(city.trim(), coords, &weather);
        Ok(())
    }

    /// Pins a place that was already resolved, e.g. a picked suggestion.
    pub async fn show_place(
        &mut self,
        source: &dyn WeatherSource,
        place: &GeocodingResult,
    ) -> Result<()> {
        let coords = place.coordinates();
        let weather = source.fetch_current(coords).await?;
        self.pin(&place.name, coords, &weather);
        Ok(())
    }

    fn pin(&mut self, city: &str, coords: Coordinates, weather: &WeatherData) {
        self.center_on(coords);
        self.markers = vec![MapMarker::new(city, coords, weather)];
    }

    /// Pins the popular cities that answered; failures are skipped.
    pub async fn show_popular(&mut self, source: Arc<dyn WeatherSource>) {
        let cities = fetch_presets(source, presets::map_cities()).await;

        self.markers = cities
            .iter()
            .filter_map(|c| {
                let weather = c.weather.as_ref()?;
                Some(MapMarker::new(&c.name, Coordinates::new(c.lat, c.lon), weather))
            })
            .collect();

        if !self.markers.is_empty() {
            self.center = DEFAULT_CENTER;
            self.zoom = REGION_ZOOM;
        }
    }
}
