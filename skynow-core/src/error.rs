use thiserror::Error;

/// Errors raised by the geocoding/weather clients and the state store.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error(
        "No OpenWeather API key configured.\n\
         Hint: set OPENWEATHER_API_KEY or run `skynow configure`."
    )]
    MissingApiKey,

    #[error("City not found: {0}")]
    NotFound(String),

    #[error("OpenWeather {operation} request failed with status {status}")]
    Status {
        operation: &'static str,
        status: reqwest::StatusCode,
        /// Truncated response body, kept for logs and never displayed.
        body: String,
    },

    #[error("Network error during {operation}: {source}")]
    Http {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse OpenWeather {operation} JSON: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Geolocation unavailable: {0}")]
    Geolocation(String),

    #[error("State storage error: {0}")]
    Storage(String),
}

impl WeatherError {
    /// Everything except a missing credential can be retried by the user.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, WeatherError::MissingApiKey)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, WeatherError::NotFound(_))
    }
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;
