use crate::{
    CityName, Config, CurrentWeatherSample, ForecastSample, WeatherError,
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn get_current(&self, city: &CityName) -> Result<CurrentWeatherSample, WeatherError>;

    /// Forecast steps in ascending time order, as delivered upstream.
    async fn get_forecast(&self, city: &CityName) -> Result<Vec<ForecastSample>, WeatherError>;
}

#[async_trait]
impl<P: WeatherProvider + ?Sized> WeatherProvider for Arc<P> {
    async fn get_current(&self, city: &CityName) -> Result<CurrentWeatherSample, WeatherError> {
        (**self).get_current(city).await
    }

    async fn get_forecast(&self, city: &CityName) -> Result<Vec<ForecastSample>, WeatherError> {
        (**self).get_forecast(city).await
    }
}

/// Construct the OpenWeather provider from config.
///
/// A missing API key is not an error here: every request then fails upstream
/// and surfaces as an ordinary fetch failure.
pub fn provider_from_config(config: &Config) -> Arc<dyn WeatherProvider> {
    let api_key = config.api_key().unwrap_or_else(|| {
        tracing::warn!(
            "no OpenWeather API key configured; run `weather configure` or set {}",
            crate::config::API_KEY_ENV
        );
        String::new()
    });

    Arc::new(OpenWeatherProvider::new(api_key))
}
