//! Core library for the `skynow` weather dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - OpenWeather geocoding and weather clients behind small traits
//! - Shared domain models, normalized to display units
//! - Derived views: forecast folding, alerts, comparison, statistics, map pins
//! - Persisted client state (history, favorites, theme)
//! - The debounced search controller and the active-location flow
//!
//! It is used by `skynow-cli`, but can also be reused by other front ends.

pub mod alerts;
pub mod compare;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod explore;
pub mod forecast;
pub mod format;
pub mod location;
pub mod map;
pub mod model;
pub mod presets;
pub mod provider;
pub mod search;
pub mod state;
pub mod statistics;
pub mod telemetry;
pub mod units;

pub use config::Config;
pub use dashboard::Dashboard;
pub use error::WeatherError;
pub use model::{Coordinates, GeocodingResult, HistoryEntry, WeatherData, WeatherForecast};
pub use provider::{Geocoder, OpenWeatherClient, WeatherSource};
pub use state::{StateStore, Theme};
