//! Core library for the `weather` dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client behind a provider abstraction
//! - The recent-search history and its key-value persistence
//! - Grouping of the 5-day forecast into day tabs
//! - The fetch session that ties these together
//!
//! It is used by `weather-cli`, but can also be reused by other front ends.

pub mod config;
pub mod error;
pub mod forecast;
pub mod history;
pub mod model;
pub mod provider;
pub mod session;
pub mod store;

pub use config::Config;
pub use error::WeatherError;
pub use forecast::{DayBucket, DisplayZone, ForecastGroups, LabelPolicy};
pub use history::{HistoryStore, SearchHistory};
pub use model::{CityName, CurrentWeatherSample, ForecastSample};
pub use provider::{WeatherProvider, provider_from_config};
pub use session::{FetchState, Phase, SessionSnapshot, WeatherSession};
pub use store::{FileStore, KeyValueStore, MemoryStore};
