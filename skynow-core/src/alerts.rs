//! Threshold alerts derived from current conditions.

use serde::{Deserialize, Serialize};

use crate::model::WeatherData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Temp,
    Wind,
    Humidity,
    Visibility,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Temp => "temp",
            AlertKind::Wind => "wind",
            AlertKind::Humidity => "humidity",
            AlertKind::Visibility => "visibility",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherAlert {
    pub id: &'static str,
    pub city: String,
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
    pub value: f64,
    pub threshold: f64,
}

const HOT: f64 = 35.0;
const VERY_HOT: f64 = 40.0;
const COLD: f64 = 10.0;
const VERY_COLD: f64 = 5.0;
const WINDY_KMH: f64 = 30.0;
const STORM_KMH: f64 = 50.0;
const HUMID: f64 = 80.0;
const VERY_HUMID: f64 = 90.0;
const LOW_VISIBILITY_KM: f64 = 5.0;
const VERY_LOW_VISIBILITY_KM: f64 = 2.0;

/// Evaluates every threshold independently; several alerts may fire at once.
pub fn evaluate(city: &str, weather: &WeatherData) -> Vec<WeatherAlert> {
    let mut alerts = Vec::new();
    let alert = |id, kind, severity, message: String, value, threshold| WeatherAlert {
        id,
        city: city.to_string(),
        kind,
        severity,
        message,
        value,
        threshold,
    };

    let temp = weather.temperature;
    if temp > HOT {
        alerts.push(alert(
            "temp-high",
            AlertKind::Temp,
            if temp > VERY_HOT { Severity::High } else { Severity::Medium },
            format!("High temperature: {temp}°C"),
            temp,
            HOT,
        ));
    } else if temp < COLD {
        alerts.push(alert(
            "temp-low",
            AlertKind::Temp,
            if temp < VERY_COLD { Severity::High } else { Severity::Medium },
            format!("Low temperature: {temp}°C"),
            temp,
            COLD,
        ));
    }

    let wind = weather.wind_speed;
    if wind > WINDY_KMH {
        alerts.push(alert(
            "wind-high",
            AlertKind::Wind,
            if wind > STORM_KMH { Severity::High } else { Severity::Medium },
            format!("Strong wind: {wind} km/h"),
            wind,
            WINDY_KMH,
        ));
    }

    let humidity = f64::from(weather.humidity);
    if humidity > HUMID {
        alerts.push(alert(
            "humidity-high",
            AlertKind::Humidity,
            if humidity > VERY_HUMID { Severity::High } else { Severity::Low },
            format!("High humidity: {humidity}% - risk of rain"),
            humidity,
            HUMID,
        ));
    }

    if let Some(visibility) = weather.visibility.filter(|v| *v < LOW_VISIBILITY_KM) {
        alerts.push(alert(
            "visibility-low",
            AlertKind::Visibility,
            if visibility < VERY_LOW_VISIBILITY_KM { Severity::High } else { Severity::Medium },
            format!("Reduced visibility: {visibility:.1} km"),
            visibility,
            LOW_VISIBILITY_KM,
        ));
    }

    if !alerts.is_empty() {
        tracing::debug!(city, count = alerts.len(), "weather alerts raised");
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calm() -> WeatherData {
        WeatherData {
            temperature: 22.0,
            description: "ciel dégagé".into(),
            icon: "01d".into(),
            humidity: 50,
            wind_speed: 10.0,
            pressure: None,
            feels_like: None,
            visibility: Some(10.0),
            uv_index: None,
        }
    }

    fn single(weather: &WeatherData) -> WeatherAlert {
        let alerts = evaluate("Douala", weather);
        assert_eq!(alerts.len(), 1, "expected one alert, got {alerts:?}");
        alerts.into_iter().next().expect("one alert")
    }

    #[test]
    fn calm_weather_raises_nothing() {
        assert!(evaluate("Douala", &calm()).is_empty());
    }

    #[test]
    fn temperature_thresholds() {
        let a = single(&WeatherData { temperature: 41.0, ..calm() });
        assert_eq!((a.kind, a.severity), (AlertKind::Temp, Severity::High));

        let a = single(&WeatherData { temperature: 36.0, ..calm() });
        assert_eq!((a.kind, a.severity), (AlertKind::Temp, Severity::Medium));
        assert_eq!(a.threshold, 35.0);

        let a = single(&WeatherData { temperature: 7.0, ..calm() });
        assert_eq!((a.id, a.severity), ("temp-low", Severity::Medium));

        let a = single(&WeatherData { temperature: 3.0, ..calm() });
        assert_eq!((a.id, a.severity), ("temp-low", Severity::High));

        assert!(evaluate("x", &WeatherData { temperature: 35.0, ..calm() }).is_empty());
        assert!(evaluate("x", &WeatherData { temperature: 10.0, ..calm() }).is_empty());
    }

    #[test]
    fn wind_thresholds_use_kmh() {
        let a = single(&WeatherData { wind_speed: 55.0, ..calm() });
        assert_eq!((a.kind, a.severity), (AlertKind::Wind, Severity::High));

        let a = single(&WeatherData { wind_speed: 31.0, ..calm() });
        assert_eq!(a.severity, Severity::Medium);
    }

    #[test]
    fn humidity_is_low_until_ninety() {
        let a = single(&WeatherData { humidity: 85, ..calm() });
        assert_eq!((a.kind, a.severity), (AlertKind::Humidity, Severity::Low));

        let a = single(&WeatherData { humidity: 95, ..calm() });
        assert_eq!(a.severity, Severity::High);
    }

    #[test]
    fn visibility_thresholds() {
        let a = single(&WeatherData { visibility: Some(3.0), ..calm() });
        assert_eq!((a.kind, a.severity), (AlertKind::Visibility, Severity::Medium));
        assert_eq!(a.message, "Reduced visibility: 3.0 km");

        let a = single(&WeatherData { visibility: Some(1.2), ..calm() });
        assert_eq!(a.severity, Severity::High);

        assert!(evaluate("x", &WeatherData { visibility: None, ..calm() }).is_empty());
    }

    #[test]
    fn independent_checks_fire_together() {
        let weather = WeatherData {
            temperature: 42.0,
            wind_speed: 60.0,
            humidity: 92,
            visibility: Some(1.0),
            ..calm()
        };
        let kinds: Vec<_> = evaluate("Lagos", &weather).iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            [AlertKind::Temp, AlertKind::Wind, AlertKind::Humidity, AlertKind::Visibility]
        );
    }
}
