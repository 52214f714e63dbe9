//! Unit conversions applied once, when provider payloads are normalized.

const MPS_TO_KMH: f64 = 3.6;

/// Whole degrees, half away from zero. Never negative zero.
pub fn round_temperature(celsius: f64) -> f64 {
    celsius.round() + 0.0
}

/// m/s to km/h, rounded to a whole number.
pub fn wind_kmh(mps: f64) -> f64 {
    (mps * MPS_TO_KMH).round()
}

/// Metres to kilometres. Zero or missing visibility is treated as absent.
pub fn visibility_km(metres: Option<f64>) -> Option<f64> {
    metres.filter(|m| *m > 0.0).map(|m| m / 1000.0)
}
