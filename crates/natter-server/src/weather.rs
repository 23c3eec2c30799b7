//! Weather adapter: fetches and normalizes forecasts from the upstream
//! weather service.
//!
//! One report takes four upstream requests: the `points/{lat},{lon}` endpoint
//! resolves the coordinate to grid-data, daily-forecast, and hourly-forecast
//! URLs, and each of those is fetched in turn.  The raw payloads are reduced
//! to the three sections callers actually consume: current conditions,
//! the next 24 hours, and the 7-day outlook.  Fresh data every call, no
//! caching.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream response missing data: {0}")]
    MissingData(&'static str),
}

// ---------------------------------------------------------------------------
// Normalized report (what our API serves)
// ---------------------------------------------------------------------------

/// Current conditions at the requested point.  Temperatures are preformatted
/// strings like `45°F`; the high/low come from the grid's Celsius series,
/// converted and floored.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    pub temperature: String,
    pub high_temperature: String,
    pub low_temperature: String,
    pub forecast: String,
}

/// One hour of the 24-hour forecast.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HourEntry {
    /// Local wall-clock time at the forecast point, e.g. `2:00:00 PM`.
    pub time: String,
    pub temperature: String,
    pub forecast: String,
}

/// One daytime period of the 7-day forecast.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DayEntry {
    /// Period name from upstream, e.g. `Monday` or `Washington's Birthday`.
    pub name: String,
    pub temperature: String,
    pub forecast: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub time_prepared: DateTime<Utc>,
    pub current_conditions: CurrentConditions,
    pub twenty_four_hour_forecast: Vec<HourEntry>,
    pub seven_day_forecast: Vec<DayEntry>,
}

// ---------------------------------------------------------------------------
// Upstream payloads (only the fields we read)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct PointsResponse {
    properties: PointsProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PointsProperties {
    forecast_grid_data: String,
    forecast: String,
    forecast_hourly: String,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    properties: ForecastProperties,
}

#[derive(Debug, Deserialize)]
struct ForecastProperties {
    periods: Vec<ForecastPeriod>,
}

/// One period of a daily or hourly forecast.  Hourly periods carry an empty
/// `name` and `detailedForecast`, so those default when absent.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ForecastPeriod {
    #[serde(default)]
    name: String,
    start_time: DateTime<FixedOffset>,
    is_daytime: bool,
    temperature: i64,
    temperature_unit: String,
    short_forecast: String,
    #[serde(default)]
    detailed_forecast: String,
}

#[derive(Debug, Deserialize)]
struct GridResponse {
    properties: GridProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridProperties {
    max_temperature: GridSeries,
    min_temperature: GridSeries,
}

#[derive(Debug, Deserialize)]
struct GridSeries {
    values: Vec<GridValue>,
}

/// Grid series values are nullable upstream.
#[derive(Debug, Deserialize)]
struct GridValue {
    value: Option<f64>,
}

impl GridSeries {
    fn first_value(&self, label: &'static str) -> Result<f64, WeatherError> {
        self.values
            .first()
            .and_then(|v| v.value)
            .ok_or(WeatherError::MissingData(label))
    }
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

fn celsius_to_fahrenheit(degrees: f64) -> f64 {
    degrees * 9.0 / 5.0 + 32.0
}

/// Current temperature and free-text forecast from the first daily period,
/// high/low from the grid's Celsius max/min series.
fn current_conditions(
    grid: &GridProperties,
    daily: &ForecastProperties,
) -> Result<CurrentConditions, WeatherError> {
    let max = celsius_to_fahrenheit(grid.max_temperature.first_value("max temperature series")?);
    let min = celsius_to_fahrenheit(grid.min_temperature.first_value("min temperature series")?);
    let now = daily
        .periods
        .first()
        .ok_or(WeatherError::MissingData("daily forecast periods"))?;

    Ok(CurrentConditions {
        temperature: format!("{}°{}", now.temperature, now.temperature_unit),
        high_temperature: format!("{}°{}", max.floor() as i64, now.temperature_unit),
        low_temperature: format!("{}°{}", min.floor() as i64, now.temperature_unit),
        forecast: now.detailed_forecast.clone(),
    })
}

/// The first 24 hourly periods, with local wall-clock times.
fn twenty_four_hours(hourly: &ForecastProperties) -> Result<Vec<HourEntry>, WeatherError> {
    if hourly.periods.len() < 24 {
        return Err(WeatherError::MissingData(
            "hourly forecast has fewer than 24 periods",
        ));
    }

    Ok(hourly.periods[..24]
        .iter()
        .map(|hour| HourEntry {
            time: hour.start_time.format("%-I:%M:%S %p").to_string(),
            temperature: format!("{}°{}", hour.temperature, hour.temperature_unit),
            forecast: hour.short_forecast.clone(),
        })
        .collect())
}

/// The daytime periods of the daily forecast, in order.
fn seven_days(daily: &ForecastProperties) -> Vec<DayEntry> {
    daily
        .periods
        .iter()
        .filter(|period| period.is_daytime)
        .map(|day| DayEntry {
            name: day.name.clone(),
            temperature: format!("{}°{}", day.temperature, day.temperature_unit),
            forecast: day.short_forecast.clone(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
}

impl WeatherClient {
    /// Build a client for the given upstream base URL.  The upstream rejects
    /// requests without a user agent.
    pub fn new(base_url: String, user_agent: &str) -> Result<Self, WeatherError> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { http, base_url })
    }

    /// Fetch and normalize the full report for a coordinate.
    pub async fn report(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherReport, WeatherError> {
        let points: PointsResponse = self
            .fetch_json(&format!(
                "{}/points/{latitude},{longitude}",
                self.base_url
            ))
            .await?;

        let grid: GridResponse = self.fetch_json(&points.properties.forecast_grid_data).await?;
        let daily: ForecastResponse = self.fetch_json(&points.properties.forecast).await?;
        let hourly: ForecastResponse = self.fetch_json(&points.properties.forecast_hourly).await?;

        Ok(WeatherReport {
            time_prepared: Utc::now(),
            current_conditions: current_conditions(&grid.properties, &daily.properties)?,
            twenty_four_hour_forecast: twenty_four_hours(&hourly.properties)?,
            seven_day_forecast: seven_days(&daily.properties),
        })
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, WeatherError> {
        tracing::debug!(url, "Fetching weather data");
        let response = self.http.get(url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}
