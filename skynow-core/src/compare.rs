//! Side-by-side comparison of several cities.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinSet;

use crate::{
    model::{Coordinates, WeatherData},
    provider::{Geocoder, WeatherSource, current_for_city},
};

/// The board never shrinks below this many slots.
pub const MIN_SLOTS: usize = 2;

/// Temperature considered most comfortable, °C.
pub const COMFORT_TEMPERATURE: f64 = 22.0;

/// One city column; each slot tracks its own loading and error state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompareSlot {
    pub name: String,
    pub coordinates: Option<Coordinates>,
    pub weather: Option<WeatherData>,
    pub loading: bool,
    pub error: Option<String>,
}

impl CompareSlot {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extreme {
    pub city: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompareSummary {
    pub hottest: Option<Extreme>,
    pub coldest: Option<Extreme>,
    pub most_humid: Option<Extreme>,
    pub windiest: Option<Extreme>,
    /// Closest to [`COMFORT_TEMPERATURE`]; `value` is the temperature.
    pub most_comfortable: Option<Extreme>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompareBoard {
    slots: Vec<CompareSlot>,
}

impl Default for CompareBoard {
    fn default() -> Self {
        Self {
            slots: vec![CompareSlot::default(); MIN_SLOTS],
        }
    }
}

impl CompareBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Board with one slot per name, padded to [`MIN_SLOTS`].
    pub fn with_cities<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut slots: Vec<CompareSlot> = names.into_iter().map(CompareSlot::named).collect();
        while slots.len() < MIN_SLOTS {
            slots.push(CompareSlot::default());
        }
        Self { slots }
    }

    pub fn slots(&self) -> &[CompareSlot] {
        &self.slots
    }

    pub fn add_slot(&mut self) {
        self.slots.push(CompareSlot::default());
    }

    /// Refuses to drop below [`MIN_SLOTS`].
    pub fn remove_slot(&mut self, index: usize) -> bool {
        if self.slots.len() <= MIN_SLOTS || index >= self.slots.len() {
            return false;
        }
        self.slots.remove(index);
        true
    }

    /// Editing a name resets the slot.
    pub fn set_name(&mut self, index: usize, name: impl Into<String>) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = CompareSlot::named(name);
        }
    }

    /// Fetches every named slot concurrently. Blank slots are left untouched.
    pub async fn fetch_all(
        &mut self,
        geocoder: Arc<dyn Geocoder>,
        source: Arc<dyn WeatherSource>,
    ) {
        let mut tasks = JoinSet::new();

        for (index, slot) in self.slots.iter_mut().enumerate() {
            let name = slot.name.trim().to_string();
            if name.is_empty() {
                continue;
            }
            slot.loading = true;
            slot.error = None;

            let geocoder = Arc::clone(&geocoder);
            let source = Arc::clone(&source);
            tasks.spawn(async move {
                let result = current_for_city(geocoder.as_ref(), source.as_ref(), &name).await;
                (index, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let (index, result) = match joined {
                Ok(done) => done,
                Err(err) => {
                    tracing::error!(error = %err, "compare task failed to complete");
                    continue;
                }
            };
            let Some(slot) = self.slots.get_mut(index) else {
                continue;
            };

            slot.loading = false;
            match result {
                Ok((coords, weather)) => {
                    slot.coordinates = Some(coords);
                    slot.weather = Some(weather);
                }
                Err(err) => {
                    tracing::warn!(city = %slot.name, error = %err, "compare lookup failed");
                    slot.weather = None;
                    slot.error = Some(err.to_string());
                }
            }
        }

        // Slots whose task panicked never report back.
        for slot in &mut self.slots {
            if slot.loading {
                slot.loading = false;
                slot.error.get_or_insert_with(|| "lookup aborted".to_string());
            }
        }
    }

    pub fn has_data(&self) -> bool {
        self.slots.iter().any(|s| s.weather.is_some())
    }

    pub fn summary(&self) -> CompareSummary {
        summarize(&self.slots)
    }
}

/// Extremes across the slots that currently hold data. Ties keep the first slot.
pub fn summarize(slots: &[CompareSlot]) -> CompareSummary {
    let loaded: Vec<(&str, &WeatherData)> = slots
        .iter()
        .filter_map(|s| s.weather.as_ref().map(|w| (s.name.as_str(), w)))
        .collect();

    CompareSummary {
        hottest: pick(&loaded, |w| w.temperature, |a, b| a > b),
        coldest: pick(&loaded, |w| w.temperature, |a, b| a < b),
        most_humid: pick(&loaded, |w| f64::from(w.humidity), |a, b| a > b),
        windiest: pick(&loaded, |w| w.wind_speed, |a, b| a > b),
        most_comfortable: pick(&loaded, |w| w.temperature, |a, b| {
            (a - COMFORT_TEMPERATURE).abs() < (b - COMFORT_TEMPERATURE).abs()
        }),
    }
}

fn pick(
    loaded: &[(&str, &WeatherData)],
    key: impl Fn(&WeatherData) -> f64,
    better: impl Fn(f64, f64) -> bool,
) -> Option<Extreme> {
    let mut best: Option<Extreme> = None;
    for &(city, weather) in loaded {
        let value = key(weather);
        if best.as_ref().is_none_or(|current| better(value, current.value)) {
            best = Some(Extreme {
                city: city.to_string(),
                value,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::fake::{FakeProvider, weather};

    fn loaded(name: &str, temperature: f64, humidity: u8, wind: f64) -> CompareSlot {
        CompareSlot {
            name: name.into(),
            weather: Some(WeatherData {
                humidity,
                wind_speed: wind,
                ..weather(temperature, "x")
            }),
            ..CompareSlot::default()
        }
    }

    #[test]
    fn board_keeps_minimum_slots() {
        let mut board = CompareBoard::new();
        assert_eq!(board.slots().len(), 2);
        assert!(!board.remove_slot(0));

        board.add_slot();
        assert!(board.remove_slot(2));
        assert!(!board.remove_slot(1));
        assert_eq!(board.slots().len(), 2);
    }

    #[test]
    fn set_name_resets_slot() {
        let mut board = CompareBoard::with_cities(["Lagos", "Dakar"]);
        board.slots[0] = loaded("Lagos", 30.0, 70, 10.0);

        board.set_name(0, "Accra");
        assert_eq!(board.slots()[0], CompareSlot::named("Accra"));
    }

    #[test]
    fn summary_picks_extremes_across_loaded_slots() {
        let slots = vec![
            loaded("Lagos", 31.0, 88, 14.0),
            CompareSlot::named("Pending"),
            loaded("Nairobi", 19.0, 55, 25.0),
            loaded("Le Caire", 35.0, 20, 9.0),
        ];

        let summary = summarize(&slots);
        assert_eq!(summary.hottest.expect("hottest").city, "Le Caire");
        assert_eq!(summary.coldest.expect("coldest").city, "Nairobi");
        assert_eq!(summary.most_humid.expect("humid").city, "Lagos");
        assert_eq!(summary.windiest.expect("windiest").city, "Nairobi");
        assert_eq!(summary.most_comfortable.expect("comfortable").city, "Nairobi");
    }

    #[test]
    fn summary_ties_keep_first_slot() {
        let slots = vec![loaded("A", 20.0, 50, 10.0), loaded("B", 24.0, 50, 10.0)];
        let summary = summarize(&slots);
        assert_eq!(summary.most_comfortable.expect("comfortable").city, "A");
        assert_eq!(summary.most_humid.expect("humid").city, "A");
    }

    #[test]
    fn empty_board_has_no_summary() {
        assert_eq!(CompareBoard::new().summary(), CompareSummary::default());
    }

    #[tokio::test]
    async fn fetch_all_sets_per_slot_state() {
        let provider = Arc::new(
            FakeProvider::new()
                .with_place("Douala", 4.0511, 9.7679, weather(29.0, "ciel dégagé"))
                .with_place("Dakar", 14.7167, -17.4677, weather(26.0, "brume")),
        );
        let mut board = CompareBoard::with_cities(["Douala", "Atlantis", "Dakar", " "]);

        board
            .fetch_all(provider.clone(), provider.clone())
            .await;

        let slots = board.slots();
        assert_eq!(slots[0].weather.as_ref().map(|w| w.temperature), Some(29.0));
        assert_eq!(slots[0].coordinates, Some(Coordinates::new(4.0511, 9.7679)));
        assert!(slots[1].weather.is_none());
        assert!(
            slots[1]
                .error
                .as_deref()
                .is_some_and(|e| e.contains("not found"))
        );
        assert_eq!(slots[2].weather.as_ref().map(|w| w.temperature), Some(26.0));
        assert_eq!(slots[3], CompareSlot::named(" "));
        assert!(slots.iter().all(|s| !s.loading));
        assert!(board.has_data());
        assert_eq!(board.summary().hottest.expect("hottest").city, "Douala");
    }
}
