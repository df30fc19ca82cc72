use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{error, info, warn};
use serde::de::DeserializeOwned;

use crate::db::{
    helpers::{decode_timestamp, encode_timestamp},
    Database,
};

use super::{
    models::{
        DailyPeriod, ForecastResponse, HourlyReading, HourlyResponse, PointsResponse,
        StoredForecast, StoredHourly,
    },
    ForecastProvider, LoadError, Location, WeatherError, WeatherSnapshot,
};

pub const WEATHER_BUCKET: &str = "WeatherData";
pub const FORECAST_KEY: &str = "forecastData";
pub const HOURLY_KEY: &str = "hourlyData";
pub const LAST_UPDATE_KEY: &str = "lastUpdate";

/// Fetches forecasts into the durable store and reads them back.
///
/// The pipeline never schedules itself and never expires what it stored: the
/// last successful refresh is served until a newer one replaces it.
#[derive(Clone)]
pub struct WeatherPipeline {
    db: Database,
    provider: Arc<dyn ForecastProvider>,
    points_base_url: String,
}

impl WeatherPipeline {
    pub fn new(
        db: Database,
        provider: Arc<dyn ForecastProvider>,
        points_base_url: impl Into<String>,
    ) -> Self {
        Self {
            db,
            provider,
            points_base_url: points_base_url.into(),
        }
    }

    /// Runs one fetch cycle and, only if every step succeeded, replaces the
    /// stored record in a single transaction stamped with `now`.
    pub async fn refresh(
        &self,
        location: Location,
        now: DateTime<Utc>,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let points_url = location.points_url(&self.points_base_url);
        let points: PointsResponse = self.fetch_json(&points_url, "points").await?;

        let forecast: ForecastResponse = self
            .fetch_json(&points.properties.forecast, "forecast")
            .await?;
        let stored_forecast = StoredForecast {
            updated: forecast.properties.updated,
            periods: forecast
                .properties
                .periods
                .into_iter()
                .map(|period| DailyPeriod {
                    label: period.name,
                    temperature: period.temperature,
                    unit: period.temperature_unit,
                    short_forecast: period.short_forecast,
                })
                .collect(),
        };

        let hourly: HourlyResponse = self
            .fetch_json(&points.properties.forecast_hourly, "hourly forecast")
            .await?;
        let stored_hourly = StoredHourly {
            periods: hourly
                .properties
                .periods
                .into_iter()
                .map(|period| HourlyReading {
                    starts_at: period.start_time,
                    temperature: period.temperature,
                    unit: period.temperature_unit,
                    humidity: period.relative_humidity.value,
                })
                .collect(),
        };
        // Only the first period feeds the current conditions.
        if let Some(first) = stored_hourly.periods.first() {
            first
                .current_conditions()
                .map_err(|reason| WeatherError::schema("hourly forecast", reason))?;
        }

        let forecast_bytes = serde_json::to_vec(&stored_forecast)
            .map_err(|e| WeatherError::Store(format!("failed to encode forecast: {e}")))?;
        let hourly_bytes = serde_json::to_vec(&stored_hourly)
            .map_err(|e| WeatherError::Store(format!("failed to encode hourly data: {e}")))?;
        let stamp = encode_timestamp(now).map_err(|e| WeatherError::Store(e.to_string()))?;

        let snapshot = WeatherSnapshot::assemble(stored_forecast, stored_hourly, now)
            .map_err(|reason| WeatherError::schema("forecast", reason))?;

        self.db
            .put_all(
                WEATHER_BUCKET,
                vec![
                    (FORECAST_KEY.to_string(), forecast_bytes),
                    (HOURLY_KEY.to_string(), hourly_bytes),
                    (LAST_UPDATE_KEY.to_string(), stamp.to_vec()),
                ],
            )
            .await
            .map_err(|e| WeatherError::Store(format!("{e:#}")))?;

        info!(
            "Weather refreshed: {} forecast periods, {}{} / {}% now",
            snapshot.daily_periods.len(),
            snapshot.current.temperature,
            snapshot.current.unit,
            snapshot.current.humidity
        );

        Ok(snapshot)
    }

    /// Reads the stored record back. An empty store is [`LoadError::NoDataYet`];
    /// anything present but unreadable is [`LoadError::CorruptCache`].
    pub async fn load(&self) -> Result<WeatherSnapshot, LoadError> {
        let values = self
            .db
            .get_all(WEATHER_BUCKET, &[FORECAST_KEY, HOURLY_KEY, LAST_UPDATE_KEY])
            .await
            .map_err(|e| LoadError::Store(format!("{e:#}")))?;

        let mut values = values.into_iter();
        let (forecast, hourly, last_update) = match (values.next(), values.next(), values.next())
        {
            (Some(forecast), Some(hourly), Some(last_update)) => (forecast, hourly, last_update),
            _ => return Err(LoadError::Store("store returned too few values".into())),
        };

        let (forecast, hourly, last_update) = match (forecast, hourly, last_update) {
            (None, None, None) => return Err(LoadError::NoDataYet),
            (Some(forecast), Some(hourly), Some(last_update)) => (forecast, hourly, last_update),
            (forecast, hourly, last_update) => {
                let missing: Vec<&str> = [
                    (FORECAST_KEY, forecast.is_none()),
                    (HOURLY_KEY, hourly.is_none()),
                    (LAST_UPDATE_KEY, last_update.is_none()),
                ]
                .into_iter()
                .filter_map(|(key, absent)| absent.then_some(key))
                .collect();
                warn!("Weather cache is missing {}", missing.join(", "));
                return Err(LoadError::CorruptCache(format!(
                    "record is missing {}",
                    missing.join(", ")
                )));
            }
        };

        let forecast: StoredForecast = decode_record(&forecast, FORECAST_KEY)?;
        let hourly: StoredHourly = decode_record(&hourly, HOURLY_KEY)?;
        let fetched_at = decode_timestamp(&last_update, LAST_UPDATE_KEY)
            .map_err(|e| LoadError::CorruptCache(e.to_string()))?;

        WeatherSnapshot::assemble(forecast, hourly, fetched_at).map_err(LoadError::CorruptCache)
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        resource: &'static str,
    ) -> Result<T, WeatherError> {
        let body = self.provider.fetch(url).await.map_err(|err| {
            error!("Error fetching {resource}: {err}");
            err
        })?;
        serde_json::from_str(&body).map_err(|err| {
            error!("Error decoding {resource} from {url}: {err}");
            WeatherError::schema(resource, err)
        })
    }
}

fn decode_record<T: DeserializeOwned>(bytes: &[u8], key: &str) -> Result<T, LoadError> {
    serde_json::from_slice(bytes)
        .map_err(|e| LoadError::CorruptCache(format!("{key} is unreadable: {e}")))
}
