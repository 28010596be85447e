//! Fetch orchestration for the dashboard.
//!
//! Each fetch target (current weather, forecast) has its own [`FetchState`].
//! Every request takes a [`Ticket`]; a completion carrying anything but the
//! latest ticket is dropped, so an older response that resolves late can
//! never overwrite a newer one.

use anyhow::{Result, anyhow};
use tokio::sync::watch;

use crate::{
    error::{WeatherError, current_error_message, forecast_error_message},
    forecast::{ForecastGroups, LabelPolicy, group},
    history::{HistoryStore, SearchHistory},
    model::{CityName, CurrentWeatherSample, ForecastSample},
    provider::WeatherProvider,
    store::KeyValueStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Success,
    Failed,
}

/// Identifies one request against a [`FetchState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    phase: Phase,
    data: Option<T>,
    error: Option<String>,
    generation: u64,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self { phase: Phase::Idle, data: None, error: None, generation: 0 }
    }
}

impl<T> FetchState<T> {
    /// Enter `Loading`. The previous error is cleared; previous data stays
    /// until the new result arrives.
    pub fn begin(&mut self) -> Ticket {
        self.generation += 1;
        self.phase = Phase::Loading;
        self.error = None;
        Ticket(self.generation)
    }

    /// Returns `false` if the ticket is stale and the data was discarded.
    pub fn succeed(&mut self, ticket: Ticket, data: T) -> bool {
        if !self.is_latest(ticket) {
            return false;
        }
        self.phase = Phase::Success;
        self.data = Some(data);
        self.error = None;
        true
    }

    /// Returns `false` if the ticket is stale and the failure was discarded.
    pub fn fail(&mut self, ticket: Ticket, message: String) -> bool {
        if !self.is_latest(ticket) {
            return false;
        }
        self.phase = Phase::Failed;
        self.data = None;
        self.error = Some(message);
        true
    }

    pub fn is_latest(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation && self.phase == Phase::Loading
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Everything a renderer needs, published after every transition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionSnapshot {
    pub current: FetchState<CurrentWeatherSample>,
    pub forecast: FetchState<ForecastGroups>,
    pub forecast_city: Option<CityName>,
    pub history: SearchHistory,
}

#[derive(Debug)]
pub struct WeatherSession<P, S> {
    provider: P,
    history_store: HistoryStore<S>,
    labels: LabelPolicy,
    state: SessionSnapshot,
    updates: watch::Sender<SessionSnapshot>,
}

impl<P: WeatherProvider, S: KeyValueStore> WeatherSession<P, S> {
    /// Start a session, loading history from `store`.
    pub fn new(provider: P, store: S, labels: LabelPolicy) -> Self {
        let history_store = HistoryStore::new(store);
        let state = SessionSnapshot { history: history_store.load(), ..Default::default() };
        let (updates, _) = watch::channel(state.clone());

        Self { provider, history_store, labels, state, updates }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.updates.subscribe()
    }

    pub fn snapshot(&self) -> &SessionSnapshot {
        &self.state
    }

    pub fn current(&self) -> &FetchState<CurrentWeatherSample> {
        &self.state.current
    }

    pub fn forecast(&self) -> &FetchState<ForecastGroups> {
        &self.state.forecast
    }

    pub fn history(&self) -> &[CityName] {
        &self.state.history
    }

    pub fn labels(&self) -> &LabelPolicy {
        &self.labels
    }

    /// Form submit. Blank input is ignored.
    pub async fn submit(&mut self, input: &str) {
        match CityName::new(input) {
            Ok(city) => self.fetch_current(city).await,
            Err(_) => tracing::debug!("ignoring blank search"),
        }
    }

    /// Click on the `index`-th recent search.
    pub async fn select_history(&mut self, index: usize) -> Result<()> {
        let city = self
            .state
            .history
            .get(index)
            .cloned()
            .ok_or_else(|| anyhow!("No recent search at position {}", index + 1))?;
        self.fetch_current(city).await;
        Ok(())
    }

    /// Re-fetch the location currently on display. No-op without data.
    pub async fn refresh(&mut self) {
        let Some(name) = self.state.current.data().map(|d| d.location_name.clone()) else {
            tracing::debug!("nothing to refresh");
            return;
        };
        self.submit(&name).await;
    }

    pub async fn fetch_current(&mut self, city: CityName) {
        let ticket = self.begin_current();
        let result = self.provider.get_current(&city).await;
        self.complete_current(ticket, &city, result);
    }

    pub fn begin_current(&mut self) -> Ticket {
        let ticket = self.state.current.begin();
        self.publish();
        ticket
    }

    /// Apply a current-weather result. History is updated only when a fresh
    /// result is accepted.
    pub fn complete_current(
        &mut self,
        ticket: Ticket,
        city: &CityName,
        result: Result<CurrentWeatherSample, WeatherError>,
    ) -> bool {
        let accepted = match result {
            Ok(sample) => {
                let accepted = self.state.current.succeed(ticket, sample);
                if accepted {
                    self.record_search(city);
                }
                accepted
            }
            Err(err) => {
                tracing::debug!(city = %city, error = %err, "current weather fetch failed");
                self.state.current.fail(ticket, current_error_message(&err))
            }
        };

        if accepted {
            self.publish();
        } else {
            tracing::debug!(city = %city, "discarding stale current weather response");
        }
        accepted
    }

    /// Point the forecast panel at `city`. Every call with a city re-fetches,
    /// even if it is unchanged.
    pub async fn watch_forecast_city(&mut self, city: Option<CityName>) {
        self.state.forecast_city = city.clone();
        self.publish();

        if let Some(city) = city {
            self.fetch_forecast(city).await;
        }
    }

    pub async fn fetch_forecast(&mut self, city: CityName) {
        let ticket = self.begin_forecast();
        let result = self.provider.get_forecast(&city).await;
        self.complete_forecast(ticket, &city, result);
    }

    pub fn begin_forecast(&mut self) -> Ticket {
        let ticket = self.state.forecast.begin();
        self.publish();
        ticket
    }

    pub fn complete_forecast(
        &mut self,
        ticket: Ticket,
        city: &CityName,
        result: Result<Vec<ForecastSample>, WeatherError>,
    ) -> bool {
        let accepted = match result {
            Ok(samples) => {
                let groups = group(&samples, &self.labels);
                tracing::debug!(city = %city, days = groups.len(), "forecast grouped");
                self.state.forecast.succeed(ticket, groups)
            }
            Err(err) => {
                tracing::debug!(city = %city, error = %err, "forecast fetch failed");
                self.state.forecast.fail(ticket, forecast_error_message(&err))
            }
        };

        if accepted {
            self.publish();
        } else {
            tracing::debug!(city = %city, "discarding stale forecast response");
        }
        accepted
    }

    fn record_search(&mut self, city: &CityName) {
        let updated = HistoryStore::<S>::record(&self.state.history, city);
        // A failed write keeps the in-memory list; the fetch itself succeeded.
        if let Err(err) = self.history_store.persist(&updated) {
            tracing::warn!(error = %err, "could not persist search history");
        }
        self.state.history = updated;
    }

    fn publish(&self) {
        self.updates.send_replace(self.state.clone());
    }
}
