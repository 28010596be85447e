use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{
    error::WeatherError,
    model::{CityName, CurrentWeatherSample, ForecastSample},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

#[derive(Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

// Hand-written so the API key never ends up in logs.
impl std::fmt::Debug for OpenWeatherProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherProvider").field("base_url", &self.base_url).finish()
    }
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { api_key, base_url, http: Client::new() }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        city: &CityName,
    ) -> Result<T, WeatherError> {
        let url = format!("{}/data/2.5/{endpoint}", self.base_url);
        tracing::debug!(%url, city = %city, "requesting OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        let status = res.status();
        let body = res.text().await.map_err(transport_error)?;

        if status == StatusCode::NOT_FOUND {
            tracing::debug!(city = %city, endpoint, "OpenWeather reported city not found");
            return Err(WeatherError::NotFound);
        }

        if !status.is_success() {
            tracing::warn!(
                %status,
                endpoint,
                body = %truncate_body(&body),
                "OpenWeather request failed"
            );
            return Err(WeatherError::Upstream { status: status.as_u16() });
        }

        serde_json::from_str(&body).map_err(|e| {
            WeatherError::Parse(format!("Failed to parse OpenWeather {endpoint} JSON: {e}"))
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

impl From<OwCurrentResponse> for CurrentWeatherSample {
    fn from(parsed: OwCurrentResponse) -> Self {
        let (condition_main, condition_description, icon_id) = match parsed.weather.first() {
            Some(w) => (w.main.clone(), w.description.clone(), w.icon.clone()),
            None => ("Unknown".to_string(), "unknown".to_string(), String::new()),
        };

        CurrentWeatherSample {
            location_name: parsed.name,
            temperature_c: parsed.main.temp,
            humidity_pct: parsed.main.humidity,
            wind_speed: parsed.wind.speed,
            condition_main,
            condition_description,
            icon_id,
        }
    }
}

impl From<OwForecastEntry> for ForecastSample {
    fn from(entry: OwForecastEntry) -> Self {
        let (condition_description, icon_id) = match entry.weather.first() {
            Some(w) => (w.description.clone(), w.icon.clone()),
            None => ("unknown".to_string(), String::new()),
        };

        ForecastSample {
            timestamp: entry.dt,
            temperature_c: entry.main.temp,
            humidity_pct: entry.main.humidity,
            wind_speed: entry.wind.speed,
            condition_description,
            icon_id,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn get_current(&self, city: &CityName) -> Result<CurrentWeatherSample, WeatherError> {
        let parsed: OwCurrentResponse = self.get_json("weather", city).await?;
        Ok(parsed.into())
    }

    async fn get_forecast(&self, city: &CityName) -> Result<Vec<ForecastSample>, WeatherError> {
        let parsed: OwForecastResponse = self.get_json("forecast", city).await?;
        Ok(parsed.list.into_iter().map(ForecastSample::from).collect())
    }
}

// reqwest puts the full URL, `appid` included, into its error text.
fn transport_error(err: reqwest::Error) -> WeatherError {
    WeatherError::Transport(err.without_url().to_string())
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body;
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
