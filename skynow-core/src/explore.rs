//! Current conditions for a fixed set of cities, fetched concurrently.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinSet;

use crate::{model::WeatherData, presets::CityPreset, provider::WeatherSource};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExploreCity {
    pub name: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    pub weather: Option<WeatherData>,
    pub error: Option<String>,
}

impl ExploreCity {
    fn pending(preset: &CityPreset) -> Self {
        Self {
            name: preset.name.to_string(),
            country: preset.country.to_string(),
            lat: preset.lat,
            lon: preset.lon,
            weather: None,
            error: None,
        }
    }
}

/// One result per preset, in preset order. A failing city carries its error
/// and does not affect the others.
pub async fn fetch_presets(
    source: Arc<dyn WeatherSource>,
    presets: &[CityPreset],
) -> Vec<ExploreCity> {
    let mut cities: Vec<ExploreCity> = presets.iter().map(ExploreCity::pending).collect();
    let mut tasks = JoinSet::new();

    for (index, preset) in presets.iter().enumerate() {
        let source = Arc::clone(&source);
        let coords = preset.coordinates();
        tasks.spawn(async move { (index, source.fetch_current(coords).await) });
    }

    while let Some(joined) = tasks.join_next().await {
        let (index, result) = match joined {
            Ok(done) => done,
            Err(err) => {
                tracing::error!(error = %err, "explore task failed to complete");
                continue;
            }
        };
        let Some(city) = cities.get_mut(index) else {
            continue;
        };
        match result {
            Ok(weather) => city.weather = Some(weather),
            Err(err) => {
                tracing::warn!(city = %city.name, error = %err, "explore lookup failed");
                city.error = Some(err.to_string());
            }
        }
    }

    cities
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::fake::{FakeProvider, weather};

    const PRESETS: &[CityPreset] = &[
        CityPreset { name: "Douala", country: "Cameroun", lat: 4.0511, lon: 9.7679 },
        CityPreset { name: "Nowhere", country: "??", lat: 0.0, lon: 0.0 },
        CityPreset { name: "Dakar", country: "Sénégal", lat: 14.7167, lon: -17.4677 },
    ];

    #[tokio::test]
    async fn results_keep_preset_order_and_isolate_failures() {
        let provider = Arc::new(
            FakeProvider::new()
                .with_place("Douala", 4.0511, 9.7679, weather(29.0, "ciel dégagé"))
                .with_place("Dakar", 14.7167, -17.4677, weather(26.0, "brume")),
        );

        let cities = fetch_presets(provider, PRESETS).await;

        let names: Vec<_> = cities.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Douala", "Nowhere", "Dakar"]);
        assert_eq!(cities[0].weather.as_ref().map(|w| w.temperature), Some(29.0));
        assert!(cities[1].weather.is_none());
        assert!(cities[1].error.is_some());
        assert_eq!(cities[2].weather.as_ref().map(|w| w.description.as_str()), Some("brume"));
    }
}
