//! Weather data: the provider's wire shapes, the shapes persisted in the
//! store, and the [`WeatherSnapshot`] handed to the display.

use std::fmt;

use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Forecast periods the weather panel shows.
pub const DISPLAYED_PERIODS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn points_url(&self, base: &str) -> String {
        format!(
            "{}/{:.4},{:.4}",
            base.trim_end_matches('/'),
            self.latitude,
            self.longitude
        )
    }
}

impl Default for Location {
    fn default() -> Self {
        Self {
            latitude: 40.7483,
            longitude: -73.9856,
        }
    }
}

// Provider responses. Only the fields we use are declared; anything else in
// the body is ignored, anything missing is a schema failure.

#[derive(Debug, Deserialize)]
pub(crate) struct PointsResponse {
    pub properties: PointsProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PointsProperties {
    pub forecast: String,
    pub forecast_hourly: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForecastResponse {
    pub properties: ForecastProperties,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForecastProperties {
    #[serde(default)]
    pub updated: Option<String>,
    pub periods: Vec<ForecastPeriod>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ForecastPeriod {
    pub name: String,
    pub temperature: i32,
    pub temperature_unit: String,
    pub short_forecast: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HourlyResponse {
    pub properties: HourlyProperties,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HourlyProperties {
    pub periods: Vec<HourlyPeriod>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HourlyPeriod {
    pub start_time: DateTime<FixedOffset>,
    pub temperature: i32,
    pub temperature_unit: String,
    pub relative_humidity: QuantitativeValue,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuantitativeValue {
    pub value: Option<i64>,
}

// Stored records (`forecastData` and `hourlyData`).

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredForecast {
    pub updated: Option<String>,
    pub periods: Vec<DailyPeriod>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredHourly {
    pub periods: Vec<HourlyReading>,
}

/// One hourly period as stored. Humidity is only checked on the period that
/// becomes the current conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HourlyReading {
    pub starts_at: DateTime<FixedOffset>,
    pub temperature: i32,
    pub unit: String,
    pub humidity: Option<i64>,
}

impl HourlyReading {
    pub fn current_conditions(&self) -> Result<CurrentConditions, String> {
        let humidity = self
            .humidity
            .and_then(|value| u8::try_from(value).ok())
            .filter(|value| *value <= 100)
            .ok_or_else(|| format!("relative humidity {:?} is not a percentage", self.humidity))?;
        Ok(CurrentConditions {
            starts_at: self.starts_at,
            temperature: self.temperature,
            unit: self.unit.clone(),
            humidity,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    pub starts_at: DateTime<FixedOffset>,
    pub temperature: i32,
    pub unit: String,
    /// Relative humidity, percent in `0..=100`.
    pub humidity: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPeriod {
    pub label: String,
    pub temperature: i32,
    pub unit: String,
    pub short_forecast: String,
}

/// One complete fetch cycle's worth of weather.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub current: CurrentConditions,
    pub daily_periods: Vec<DailyPeriod>,
    /// Provider's own `updated` stamp for the forecast, when it sent one.
    pub forecast_updated: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl WeatherSnapshot {
    /// Builds a snapshot from the two stored records. Current conditions come
    /// from the first hourly period.
    pub(crate) fn assemble(
        forecast: StoredForecast,
        hourly: StoredHourly,
        fetched_at: DateTime<Utc>,
    ) -> Result<Self, String> {
        if forecast.periods.is_empty() {
            return Err("forecast has no periods".into());
        }
        let current = hourly
            .periods
            .first()
            .ok_or_else(|| "hourly forecast has no periods".to_string())?
            .current_conditions()?;

        Ok(Self {
            current,
            daily_periods: forecast.periods,
            forecast_updated: forecast.updated,
            fetched_at,
        })
    }

    pub fn displayed_periods(&self) -> &[DailyPeriod] {
        let count = self.daily_periods.len().min(DISPLAYED_PERIODS);
        &self.daily_periods[..count]
    }

    /// `fetched_at` in local time, e.g. `01/02/06 15:04:05`.
    pub fn fetched_label(&self) -> String {
        format_fetched(self.fetched_at, &Local)
    }
}

fn format_fetched<Tz: TimeZone>(fetched_at: DateTime<Utc>, zone: &Tz) -> String
where
    Tz::Offset: fmt::Display,
{
    fetched_at
        .with_timezone(zone)
        .format("%m/%d/%y %H:%M:%S")
        .to_string()
}

/// Which picture the weather panel draws next to a forecast line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ForecastIcon {
    Sunny,
    Cloudy,
    Rain,
    Unknown,
}

impl ForecastIcon {
    pub fn classify(short_forecast: &str) -> Self {
        let text = short_forecast.to_lowercase();
        if text.contains("sunny") {
            ForecastIcon::Sunny
        } else if text.contains("cloudy") {
            ForecastIcon::Cloudy
        } else if text.contains("rain") {
            ForecastIcon::Rain
        } else {
            ForecastIcon::Unknown
        }
    }
}

impl DailyPeriod {
    pub fn icon(&self) -> ForecastIcon {
        ForecastIcon::classify(&self.short_forecast)
    }
}
