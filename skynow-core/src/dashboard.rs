//! The active-location flow behind the home screen.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    error::{Result, WeatherError},
    location::{FALLBACK_LOCATION_NAME, Locator},
    model::{GeocodingResult, HistoryEntry, WeatherData, WeatherForecast},
    provider::{Geocoder, WeatherSource},
    state::StateStore,
};

/// Holds the active location and whatever was last fetched for it.
#[derive(Debug)]
pub struct Dashboard {
    geocoder: Arc<dyn Geocoder>,
    source: Arc<dyn WeatherSource>,
    store: Arc<StateStore>,

    active: Option<GeocodingResult>,
    weather: Option<WeatherData>,
    forecast: Vec<WeatherForecast>,
    last_updated: Option<DateTime<Utc>>,
    error: Option<String>,
}

impl Dashboard {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        source: Arc<dyn WeatherSource>,
        store: Arc<StateStore>,
    ) -> Self {
        Self {
            geocoder,
            source,
            store,
            active: None,
            weather: None,
            forecast: Vec::new(),
            last_updated: None,
            error: None,
        }
    }

    pub fn active(&self) -> Option<&GeocodingResult> {
        self.active.as_ref()
    }

    pub fn weather(&self) -> Option<&WeatherData> {
        self.weather.as_ref()
    }

    pub fn forecast(&self) -> &[WeatherForecast] {
        &self.forecast
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Makes `location` active and loads its weather.
    ///
    /// Current conditions and forecast are fetched concurrently. On success a
    /// history entry is written and `last_updated` is stamped; on failure the
    /// previous weather stays cleared and the error is kept for display.
    pub async fn activate(&mut self, location: GeocodingResult) -> Result<()> {
        tracing::info!(city = %location.name, lat = location.lat, lon = location.lon, "activating location");

        let coords = location.coordinates();
        self.active = Some(location);
        self.weather = None;
        self.forecast.clear();
        self.error = None;

        let fetched = tokio::try_join!(
            self.source.fetch_current(coords),
            self.source.fetch_forecast(coords),
        );

        let (current, forecast) = match fetched {
            Ok(pair) => pair,
            Err(err) => return Err(self.fail(err)),
        };

        if let Some(active) = &self.active {
            let entry = HistoryEntry::for_location(active, &current);
            if let Err(err) = self.store.record_history(entry) {
                tracing::warn!(error = %err, "could not persist search history");
            }
        }
        self.weather = Some(current);
        self.forecast = forecast;
        self.last_updated = Some(Utc::now());
        Ok(())
    }

    /// Enter-key submission of raw text. The typed text names the location.
    /// Returns `false` for blank input.
    pub async fn submit(&mut self, text: &str) -> Result<bool> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(false);
        }

        let coords = match self.geocoder.geocode(text).await {
            Ok(Some(coords)) => coords,
            Ok(None) => return Err(self.fail(WeatherError::NotFound(text.to_string()))),
            Err(err) => return Err(self.fail(err)),
        };

        self.activate(GeocodingResult::named(text, coords)).await?;
        Ok(true)
    }

    pub async fn select_suggestion(&mut self, suggestion: GeocodingResult) -> Result<()> {
        self.activate(suggestion).await
    }

    pub async fn select_favorite(&mut self, favorite: GeocodingResult) -> Result<()> {
        self.activate(favorite).await
    }

    /// Popular cities are names only and go through the geocoder.
    pub async fn select_popular(&mut self, city: &str) -> Result<bool> {
        self.submit(city).await
    }

    /// Entries recorded without coordinates cannot be re-opened; returns `false`.
    pub async fn select_history(&mut self, entry: &HistoryEntry) -> Result<bool> {
        let Some(location) = entry.location() else {
            return Ok(false);
        };
        self.activate(location).await?;
        Ok(true)
    }

    /// Activates the device position, named by reverse geocoding when possible.
    pub async fn locate(&mut self, locator: &dyn Locator) -> Result<()> {
        let coords = match locator.locate().await {
            Ok(coords) => coords,
            Err(err) => return Err(self.fail(err)),
        };

        let place = match self.geocoder.reverse_geocode(coords).await {
            Ok(place) => place,
            Err(WeatherError::MissingApiKey) => return Err(self.fail(WeatherError::MissingApiKey)),
            Err(err) => {
                tracing::warn!(error = %err, "reverse geocoding failed, using fallback name");
                None
            }
        };

        let location = GeocodingResult {
            name: place
                .as_ref()
                .map(|p| p.name.clone())
                .unwrap_or_else(|| FALLBACK_LOCATION_NAME.to_string()),
            lat: coords.lat,
            lon: coords.lon,
            country: place.as_ref().and_then(|p| p.country.clone()),
            state: place.and_then(|p| p.state),
        };

        self.activate(location).await
    }

    pub fn is_favorite(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| self.store.is_favorite(active))
    }

    /// Toggles the active location; `None` when nothing is active.
    pub fn toggle_favorite(&self) -> Result<Option<bool>> {
        match &self.active {
            Some(active) => Ok(Some(self.store.toggle_favorite(active)?)),
            None => Ok(None),
        }
    }

    /// Toggles a favorite by city name without opening it, so neither the
    /// active location nor the history changes. `None` for blank input.
    pub async fn toggle_favorite_city(&self, city: &str) -> Result<Option<bool>> {
        let city = city.trim();
        if city.is_empty() {
            return Ok(None);
        }

        let coords = self
            .geocoder
            .geocode(city)
            .await?
            .ok_or_else(|| WeatherError::NotFound(city.to_string()))?;
        let added = self.store.toggle_favorite(&GeocodingResult::named(city, coords))?;
        Ok(Some(added))
    }

    fn fail(&mut self, err: WeatherError) -> WeatherError {
        tracing::warn!(error = %err, "weather lookup failed");
        self.weather = None;
        self.forecast.clear();
        self.error = Some(err.to_string());
        err
    }
}
