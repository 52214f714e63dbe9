//! Display helpers shared by every front end. Values are already normalized,
//! so these only format.

use chrono::{DateTime, Local, Utc};

use crate::units;

pub fn temperature(celsius: f64) -> String {
    format!("{}°C", units::round_temperature(celsius))
}

pub fn wind_speed(kmh: f64) -> String {
    format!("{} km/h", kmh.round())
}

pub fn humidity(pct: u8) -> String {
    format!("{pct}%")
}

pub fn pressure(hpa: f64) -> String {
    format!("{hpa} hPa")
}

pub fn visibility(km: f64) -> String {
    format!("{km} km")
}

pub fn icon_url(icon: &str) -> String {
    format!("https://openweathermap.org/img/wn/{icon}@2x.png")
}

pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `HH:MM` in local time, as shown next to "last updated".
pub fn clock_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M").to_string()
}
