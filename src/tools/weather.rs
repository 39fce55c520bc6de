//! Weather forecast tool.
//!
//! Geocodes a place name with Nominatim, then picks the OpenWeatherMap 5-day
//! forecast slot closest to the requested time.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, Utc};
use serde::Deserialize;
use std::time::Duration;

use super::search::USER_AGENT;
use super::{string_arg, Arguments, ParamType, Tool, ToolParam, ToolResult};
use crate::error::ToolError;

pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const NOMINATIM_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";
const FORECAST_ENDPOINT: &str = "https://api.openweathermap.org/data/2.5/forecast";

const CARDINALS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

#[derive(Debug, Clone)]
pub struct WeatherEndpoints {
    pub geocoding: String,
    pub forecast: String,
}

impl Default for WeatherEndpoints {
    fn default() -> Self {
        Self {
            geocoding: NOMINATIM_ENDPOINT.into(),
            forecast: FORECAST_ENDPOINT.into(),
        }
    }
}

/// Tool answering weather questions for a place and time.
pub struct WeatherRetrievalTool {
    http: reqwest::Client,
    api_key: String,
    endpoints: WeatherEndpoints,
    params: Vec<ToolParam>,
}

impl WeatherRetrievalTool {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Self {
        Self::with_endpoints(api_key, timeout, WeatherEndpoints::default())
    }

    pub fn with_endpoints(
        api_key: impl Into<String>,
        timeout: Duration,
        endpoints: WeatherEndpoints,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        let now = Utc::now().format(DATETIME_FORMAT);
        Self {
            http,
            api_key: api_key.into(),
            endpoints,
            params: vec![
                ToolParam::required(
                    "location",
                    ParamType::String,
                    "The location to get the weather for.",
                ),
                ToolParam::required(
                    "datetime",
                    ParamType::String,
                    format!(
                        "Current datetime: \"{now}\". Return the desired time associated with the weather request in this format: \"{DATETIME_FORMAT}\"."
                    ),
                ),
            ],
        }
    }

    async fn coordinates(&self, location: &str) -> Result<Option<(f64, f64)>, ToolError> {
        let places: Vec<Place> = self
            .http
            .get(&self.endpoints.geocoding)
            .query(&[("q", location), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| ToolError::ExecutionFailed(format!("geocoding: {e}")))?
            .json()
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("geocoding: {e}")))?;

        Ok(places
            .first()
            .and_then(|p| Some((p.lat.parse().ok()?, p.lon.parse().ok()?))))
    }

    async fn forecast(&self, lat: f64, lon: f64) -> Result<Forecast, ToolError> {
        self.http
            .get(&self.endpoints.forecast)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| ToolError::ExecutionFailed(format!("forecast: {e}")))?
            .json()
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("forecast: {e}")))
    }
}

#[async_trait]
impl Tool for WeatherRetrievalTool {
    fn name(&self) -> &str {
        "Weather Retrieval API"
    }

    fn description(&self) -> &str {
        "Retrieve the current weather for a location."
    }

    fn params(&self) -> &[ToolParam] {
        &self.params
    }

    async fn execute(&self, arguments: &Arguments) -> Result<ToolResult, ToolError> {
        let location = string_arg(arguments, "location")?;
        let requested = string_arg(arguments, "datetime")?;

        let Some((lat, lon)) = self.coordinates(location).await? else {
            tracing::debug!(location, "location could not be geocoded");
            return Ok(ToolResult::empty(self.name()));
        };
        let forecast = self.forecast(lat, lon).await?;
        let target = NaiveDateTime::parse_from_str(requested, DATETIME_FORMAT)
            .unwrap_or_else(|_| Utc::now().naive_utc());

        let results = forecast
            .nearest(target)
            .map(|slot| render_report(&forecast.city, slot))
            .into_iter()
            .collect();
        Ok(ToolResult::new(self.name(), results))
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

#[derive(Debug, Deserialize)]
struct Forecast {
    list: Vec<Slot>,
    city: City,
}

impl Forecast {
    fn nearest(&self, target: NaiveDateTime) -> Option<&Slot> {
        self.list
            .iter()
            .filter_map(|slot| Some((slot, slot.time()?)))
            .min_by_key(|(_, time)| (*time - target).num_seconds().abs())
            .map(|(slot, _)| slot)
    }
}

#[derive(Debug, Deserialize)]
struct Slot {
    dt_txt: String,
    main: Main,
    weather: Vec<Condition>,
    wind: Wind,
}

impl Slot {
    fn time(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.dt_txt, DATETIME_FORMAT).ok()
    }
}

#[derive(Debug, Deserialize)]
struct Main {
    /// Kelvin.
    temp: f64,
    humidity: i64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct Wind {
    /// Metres per second.
    speed: f64,
    #[serde(default)]
    deg: f64,
}

#[derive(Debug, Deserialize)]
struct City {
    name: String,
    #[serde(default)]
    country: String,
    sunrise: i64,
    sunset: i64,
    /// Offset from UTC in seconds.
    #[serde(default)]
    timezone: i32,
}

impl City {
    fn local_time(&self, unix: i64) -> String {
        let offset = FixedOffset::east_opt(self.timezone).unwrap_or_else(|| Utc.fix());
        DateTime::from_timestamp(unix, 0)
            .map(|t| t.with_timezone(&offset).format(DATETIME_FORMAT).to_string())
            .unwrap_or_default()
    }
}

fn render_report(city: &City, slot: &Slot) -> String {
    let description = slot
        .weather
        .first()
        .map(|c| c.description.as_str())
        .unwrap_or("unknown");
    format!(
        "1. Location Information\n\
         Location: {} ({})\n\
         Sunrise (today): {}\n\
         Sunset (today): {}\n\
         \n\
         2. Forecast Information\n\
         Date and time: {}\n\
         Temperature: {:.1}°C\n\
         Humidity: {}%\n\
         Weather Description: {}\n\
         Wind speed: {:.1} km/h\n\
         Wind direction: {}",
        city.name,
        city.country,
        city.local_time(city.sunrise),
        city.local_time(city.sunset),
        slot.dt_txt,
        slot.main.temp - 273.15,
        slot.main.humidity,
        description,
        slot.wind.speed * 3.6,
        degrees_to_cardinal(slot.wind.deg),
    )
}

/// 16-point compass direction for a bearing in degrees.
pub fn degrees_to_cardinal(degrees: f64) -> &'static str {
    let sector = 360.0 / CARDINALS.len() as f64;
    let index = (degrees.rem_euclid(360.0) / sector).round() as usize;
    CARDINALS[index % CARDINALS.len()]
}
