//! Statistics cards built from a single current reading.
//!
//! There is no historical source behind these numbers: the 30-day card is a
//! simulation spread around the current temperature and is flagged as such.

use serde::Serialize;

use crate::model::WeatherData;

/// Spread applied around the current temperature, °C.
pub const SIMULATED_SPREAD: f64 = 5.0;
pub const SIMULATED_DAYS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulatedStats {
    pub city: String,
    pub avg_temp: f64,
    pub min_temp: f64,
    pub max_temp: f64,
    pub avg_humidity: u8,
    /// km/h
    pub avg_wind_speed: f64,
    pub most_common_condition: String,
    pub data_points: u32,
    pub simulated: bool,
}

impl SimulatedStats {
    pub fn temperature_range(&self) -> f64 {
        self.max_temp - self.min_temp
    }
}

pub fn simulate(city: &str, weather: &WeatherData) -> SimulatedStats {
    SimulatedStats {
        city: city.to_string(),
        avg_temp: weather.temperature,
        min_temp: weather.temperature - SIMULATED_SPREAD,
        max_temp: weather.temperature + SIMULATED_SPREAD,
        avg_humidity: weather.humidity,
        avg_wind_speed: weather.wind_speed,
        most_common_condition: weather.description.clone(),
        data_points: SIMULATED_DAYS,
        simulated: true,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UvLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

impl UvLevel {
    pub fn from_index(uv: f64) -> Self {
        match uv {
            u if u <= 2.0 => UvLevel::Low,
            u if u <= 5.0 => UvLevel::Moderate,
            u if u <= 7.0 => UvLevel::High,
            u if u <= 10.0 => UvLevel::VeryHigh,
            _ => UvLevel::Extreme,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UvLevel::Low => "Low",
            UvLevel::Moderate => "Moderate",
            UvLevel::High => "High",
            UvLevel::VeryHigh => "Very high",
            UvLevel::Extreme => "Extreme",
        }
    }
}

/// Small derived figures shown next to current conditions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickStats {
    /// Rough dew point, °C.
    pub dew_point: f64,
    pub uv: Option<(f64, UvLevel)>,
}

pub fn quick_stats(weather: &WeatherData) -> QuickStats {
    let humidity = f64::from(weather.humidity);
    QuickStats {
        dew_point: (weather.temperature - (100.0 - humidity) / 5.0).round(),
        uv: weather.uv_index.map(|uv| (uv, UvLevel::from_index(uv))),
    }
}
