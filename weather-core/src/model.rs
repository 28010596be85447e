use std::fmt;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

/// A city query exactly as the user typed it.
///
/// Used both as the `q` parameter and as the history dedup key, so it is
/// compared case-sensitively and never normalised.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CityName(String);

impl CityName {
    /// Rejects blank input; the submitted text is otherwise kept verbatim.
    pub fn new(value: impl Into<String>) -> anyhow::Result<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(anyhow!("City name must not be empty"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for CityName {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeatherSample {
    pub location_name: String,
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    pub condition_main: String,
    pub condition_description: String,
    pub icon_id: String,
}

impl CurrentWeatherSample {
    pub fn icon_url(&self) -> String {
        icon_url(&self.icon_id)
    }
}

/// One 3-hour step of the 5-day forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    pub timestamp: i64,
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    pub condition_description: String,
    pub icon_id: String,
}

impl ForecastSample {
    pub fn icon_url(&self) -> String {
        icon_url(&self.icon_id)
    }
}

fn icon_url(icon_id: &str) -> String {
    format!("https://openweathermap.org/img/wn/{icon_id}@2x.png")
}
