//! Folding of 3-hour forecast entries into one record per calendar day.

use crate::{
    model::{ForecastTemperature, WeatherForecast},
    units,
};

/// Maximum number of days kept after folding.
pub const FORECAST_DAYS: usize = 5;

/// One raw forecast entry, provider units (°C, m/s).
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSample {
    /// `YYYY-MM-DD HH:MM:SS`
    pub dt_txt: String,
    pub temp: f64,
    pub humidity: u8,
    pub wind_speed_mps: f64,
    pub description: String,
    pub icon: String,
}

impl ForecastSample {
    fn date(&self) -> &str {
        self.dt_txt
            .split_once(' ')
            .map(|(date, _)| date)
            .unwrap_or(&self.dt_txt)
    }
}

/// Groups samples by date in arrival order.
///
/// The first sample of a date supplies description, icon, humidity and wind;
/// later samples of that date only widen the min/max temperature. Only the
/// first [`FORECAST_DAYS`] distinct dates are kept.
pub fn fold_forecast<I>(samples: I) -> Vec<WeatherForecast>
where
    I: IntoIterator<Item = ForecastSample>,
{
    let mut days: Vec<WeatherForecast> = Vec::with_capacity(FORECAST_DAYS);

    for sample in samples {
        let date = sample.date();

        if let Some(day) = days.iter_mut().find(|d| d.date == date) {
            day.temperature.min = day.temperature.min.min(sample.temp);
            day.temperature.max = day.temperature.max.max(sample.temp);
            continue;
        }

        if days.len() == FORECAST_DAYS {
            // Later dates are beyond the window; earlier dates may still widen.
            continue;
        }

        days.push(WeatherForecast {
            date: date.to_string(),
            temperature: ForecastTemperature {
                min: sample.temp,
                max: sample.temp,
            },
            description: sample.description,
            icon: sample.icon,
            humidity: sample.humidity,
            wind_speed: units::wind_kmh(sample.wind_speed_mps),
        });
    }

    for day in &mut days {
        day.temperature.min = units::round_temperature(day.temperature.min);
        day.temperature.max = units::round_temperature(day.temperature.max);
    }

    days
}
