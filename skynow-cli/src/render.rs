//! Plain-text rendering of core types.

use chrono::NaiveDate;
use skynow_core::{
    Dashboard, GeocodingResult, HistoryEntry, WeatherData, WeatherForecast,
    alerts::WeatherAlert,
    compare::{CompareBoard, Extreme},
    explore::ExploreCity,
    format,
    map::MapView,
    statistics::{self, SimulatedStats},
};

pub fn dashboard(dash: &Dashboard) {
    let Some(active) = dash.active() else {
        println!("No location selected.");
        return;
    };

    if let Some(err) = dash.error() {
        eprintln!("⚠ {err}");
        return;
    }
    let Some(weather) = dash.weather() else {
        return;
    };

    let star = if dash.is_favorite() { " ★" } else { "" };
    println!("{}{star}", place_label(active));
    current(weather);

    if !dash.forecast().is_empty() {
        println!();
        forecast(dash.forecast());
    }
    if let Some(at) = dash.last_updated() {
        println!();
        println!("Last updated {}", format::clock_time(at));
    }
}

pub fn current(weather: &WeatherData) {
    println!(
        "  {}  {}",
        format::temperature(weather.temperature),
        format::capitalize_first(&weather.description)
    );
    if let Some(feels) = weather.feels_like {
        println!("  Feels like   {}", format::temperature(feels));
    }
    println!("  Humidity     {}", format::humidity(weather.humidity));
    println!("  Wind         {}", format::wind_speed(weather.wind_speed));
    if let Some(pressure) = weather.pressure {
        println!("  Pressure     {}", format::pressure(pressure));
    }
    if let Some(visibility) = weather.visibility {
        println!("  Visibility   {}", format::visibility(visibility));
    }

    if !weather.icon.is_empty() {
        println!("  Icon         {}", format::icon_url(&weather.icon));
    }

    let quick = statistics::quick_stats(weather);
    println!("  Dew point    {}", format::temperature(quick.dew_point));
    if let Some((uv, level)) = quick.uv {
        println!("  UV index     {uv} ({})", level.label());
    }
}

pub fn forecast(days: &[WeatherForecast]) {
    println!("{}-day forecast", days.len());
    for day in days {
        println!(
            "  {:<12} {:>5} / {:<5} {:<24} {:>4} {:>9}",
            day_label(&day.date),
            format::temperature(day.temperature.min),
            format::temperature(day.temperature.max),
            format::capitalize_first(&day.description),
            format::humidity(day.humidity),
            format::wind_speed(day.wind_speed),
        );
    }
}

fn day_label(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%a %d %b").to_string())
        .unwrap_or_else(|_| date.to_string())
}

pub fn place_label(place: &GeocodingResult) -> String {
    let region = place.region_label();
    if region.is_empty() {
        place.name.clone()
    } else {
        format!("{} ({region})", place.name)
    }
}

pub fn history(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        println!("No recent searches.");
        return;
    }
    for (i, entry) in entries.iter().enumerate() {
        let weather = match (entry.temperature, entry.description.as_deref()) {
            (Some(t), Some(d)) => format!("{}, {d}", format::temperature(t)),
            (Some(t), None) => format::temperature(t),
            _ => String::new(),
        };
        println!(
            "{:>2}. {:<20} {:<28} {}",
            i + 1,
            entry.city,
            weather,
            entry.timestamp.format("%Y-%m-%d %H:%M")
        );
    }
}

pub fn favorites(favorites: &[GeocodingResult]) {
    if favorites.is_empty() {
        println!("No favorites yet.");
        return;
    }
    for (i, place) in favorites.iter().enumerate() {
        println!("{:>2}. {}", i + 1, place_label(place));
    }
}

pub fn compare(board: &CompareBoard) {
    for slot in board.slots() {
        if slot.name.trim().is_empty() {
            continue;
        }
        match (&slot.weather, &slot.error) {
            (Some(w), _) => println!(
                "  {:<16} {:>5}  {:<22} {:>4} {:>9}",
                slot.name,
                format::temperature(w.temperature),
                format::capitalize_first(&w.description),
                format::humidity(w.humidity),
                format::wind_speed(w.wind_speed),
            ),
            (None, Some(err)) => println!("  {:<16} ⚠ {err}", slot.name),
            (None, None) => println!("  {:<16} -", slot.name),
        }
    }

    if !board.has_data() {
        return;
    }
    let summary = board.summary();
    println!();
    extreme("Hottest", &summary.hottest, format::temperature);
    extreme("Coldest", &summary.coldest, format::temperature);
    extreme("Most humid", &summary.most_humid, |v| format!("{v}%"));
    extreme("Windiest", &summary.windiest, format::wind_speed);
    extreme("Most comfortable", &summary.most_comfortable, format::temperature);
}

fn extreme(label: &str, value: &Option<Extreme>, fmt: impl Fn(f64) -> String) {
    if let Some(e) = value {
        println!("  {label:<17} {} ({})", e.city, fmt(e.value));
    }
}

pub fn alerts(city: &str, alerts: &[WeatherAlert]) {
    if alerts.is_empty() {
        println!("No active alerts for {city}.");
        return;
    }
    for alert in alerts {
        println!(
            "  [{:<6}] {:<10} {}",
            alert.severity,
            alert.kind.as_str(),
            alert.message
        );
    }
}

pub fn stats(stats: &SimulatedStats) {
    let origin = if stats.simulated {
        "simulated from current conditions"
    } else {
        "observed"
    };
    println!("{}: last {} days ({origin})", stats.city, stats.data_points);
    println!("  Average      {}", format::temperature(stats.avg_temp));
    println!(
        "  Min / max    {} / {}",
        format::temperature(stats.min_temp),
        format::temperature(stats.max_temp)
    );
    println!("  Range        {}°", stats.temperature_range());
    println!("  Humidity     {}", format::humidity(stats.avg_humidity));
    println!("  Wind         {}", format::wind_speed(stats.avg_wind_speed));
    println!(
        "  Conditions   {}",
        format::capitalize_first(&stats.most_common_condition)
    );
}

pub fn explore(cities: &[ExploreCity]) {
    for city in cities {
        let label = format!("{}, {}", city.name, city.country);
        match (&city.weather, &city.error) {
            (Some(w), _) => println!(
                "  {label:<30} {:>5}  {}",
                format::temperature(w.temperature),
                format::capitalize_first(&w.description)
            ),
            (None, Some(err)) => println!("  {label:<30} ⚠ {err}"),
            (None, None) => println!("  {label:<30} -"),
        }
    }
}

pub fn map(view: &MapView) {
    println!(
        "Center {:.4}, {:.4}  zoom {}",
        view.center.lat, view.center.lon, view.zoom
    );
    if view.markers.is_empty() {
        println!("No markers.");
        return;
    }
    for marker in &view.markers {
        println!(
            "  📍 {:>9.4}, {:>9.4}  {}",
            marker.position.lat, marker.position.lon, marker.popup
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skynow_core::Coordinates;

    #[test]
    fn day_label_falls_back_to_raw_text() {
        assert_eq!(day_label("2026-10-18"), "Sun 18 Oct");
        assert_eq!(day_label("soon"), "soon");
    }

    #[test]
    fn place_label_includes_region_when_known() {
        let mut place = GeocodingResult::named("Douala", Coordinates::new(4.05, 9.77));
        assert_eq!(place_label(&place), "Douala");

        place.country = Some("CM".into());
        assert_eq!(place_label(&place), "Douala (CM)");
    }
}
