//! Device position lookup for "locate me".

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::{Result, WeatherError},
    model::Coordinates,
};

/// Name used when reverse geocoding cannot name the position.
pub const FALLBACK_LOCATION_NAME: &str = "My location";

#[async_trait]
pub trait Locator: Send + Sync + Debug {
    /// Current position; denial or unavailability is `WeatherError::Geolocation`.
    async fn locate(&self) -> Result<Coordinates>;
}

/// Position given on the command line or in the config file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocator {
    position: Option<Coordinates>,
}

impl FixedLocator {
    pub fn new(position: Option<Coordinates>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl Locator for FixedLocator {
    async fn locate(&self) -> Result<Coordinates> {
        self.position.ok_or_else(|| {
            WeatherError::Geolocation(
                "no position available; pass --lat/--lon or set [location] in the config".into(),
            )
        })
    }
}
