//! Search workflow: validate, fetch, update snapshot and history.
//!
//! State moves `Idle → Loading → Idle`, or straight to `Error` for an
//! empty query. Fetch failures never become an error state; they come
//! back as a one-off [`Notification`] and leave the current snapshot alone.

use tracing::{info, warn};

use crate::{
    error::FetchError,
    history::RecentSearchHistory,
    model::{RequestState, SearchQuery, UnitPreference, WeatherSnapshot},
    provider::WeatherProvider,
    storage::KeyValueStore,
};

/// Messages a front-end sends to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Submit(String),
    ToggleUnit,
}

/// Transient, user-facing outcome of a failed lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    CityNotFound,
    FetchFailed,
}

impl Notification {
    pub fn message(&self) -> &'static str {
        match self {
            Notification::CityNotFound => "City not found",
            Notification::FetchFailed => "Error fetching weather data",
        }
    }
}

impl From<&FetchError> for Notification {
    fn from(err: &FetchError) -> Self {
        if err.is_not_found() {
            Notification::CityNotFound
        } else {
            Notification::FetchFailed
        }
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug)]
pub struct SearchController {
    provider: Box<dyn WeatherProvider>,
    store: Box<dyn KeyValueStore>,
    state: RequestState,
    unit: UnitPreference,
    snapshot: Option<WeatherSnapshot>,
    history: RecentSearchHistory,
}

impl SearchController {
    /// Loads recent searches from `store`. Unreadable history starts empty.
    pub fn new(
        provider: Box<dyn WeatherProvider>,
        store: Box<dyn KeyValueStore>,
        unit: UnitPreference,
    ) -> Self {
        let history = RecentSearchHistory::load_or_empty(store.as_ref());

        Self {
            provider,
            store,
            state: RequestState::Idle,
            unit,
            snapshot: None,
            history,
        }
    }

    pub async fn dispatch(&mut self, command: Command) -> Option<Notification> {
        match command {
            Command::Submit(query) => self.submit(&query).await,
            Command::ToggleUnit => {
                self.toggle_unit();
                None
            }
        }
    }

    /// Run one search end to end.
    pub async fn submit(&mut self, raw: &str) -> Option<Notification> {
        let query = self.begin_search(raw)?;
        self.complete_search(&query).await
    }

    /// Fetch for a query returned by [`begin_search`](Self::begin_search) and apply the result.
    pub async fn complete_search(&mut self, query: &SearchQuery) -> Option<Notification> {
        let result = self.provider.current_weather(query).await;
        self.finish_search(query, result)
    }

    /// Validate `raw` and enter `Loading`.
    ///
    /// Returns `None` (and sets the validation error) for an empty query.
    pub fn begin_search(&mut self, raw: &str) -> Option<SearchQuery> {
        match SearchQuery::parse(raw) {
            Ok(query) => {
                info!(city = %query, "searching");
                self.state = RequestState::Loading;
                Some(query)
            }
            Err(err) => {
                self.state = RequestState::Error(err.to_string());
                None
            }
        }
    }

    /// Apply the outcome of the fetch started by [`begin_search`](Self::begin_search).
    pub fn finish_search(
        &mut self,
        query: &SearchQuery,
        result: Result<WeatherSnapshot, FetchError>,
    ) -> Option<Notification> {
        self.state = RequestState::Idle;

        match result {
            Ok(snapshot) => {
                info!(city = %query, location = %snapshot.name, "search succeeded");
                self.snapshot = Some(snapshot);
                self.update_recent_searches(query.as_str());
                None
            }
            Err(err) => {
                warn!(city = %query, error = %err, "search failed");
                Some(Notification::from(&err))
            }
        }
    }

    pub fn toggle_unit(&mut self) {
        self.unit = self.unit.toggled();
    }

    /// Push `city` to the front of the history and persist it.
    pub fn update_recent_searches(&mut self, city: &str) {
        self.history.push(city);
        if let Err(err) = self.history.save(self.store.as_mut()) {
            warn!(error = %format!("{err:#}"), "could not persist recent searches");
        }
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn unit(&self) -> UnitPreference {
        self.unit
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        self.snapshot.as_ref()
    }

    /// Snapshot worth rendering: displayable and not mid-request.
    pub fn displayable_snapshot(&self) -> Option<&WeatherSnapshot> {
        if self.state.is_loading() {
            return None;
        }
        self.snapshot.as_ref().filter(|s| s.is_displayable())
    }

    pub fn recent_searches(&self) -> &RecentSearchHistory {
        &self.history
    }

    pub fn storage(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        history::RECENT_SEARCHES_KEY,
        model::{Condition, MainMetrics, SystemInfo},
        storage::MemoryStore,
    };
    use async_trait::async_trait;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    fn snapshot(name: &str, kelvin: f64) -> WeatherSnapshot {
        WeatherSnapshot {
            name: name.to_string(),
            main: MainMetrics { temp: kelvin, feels_like: kelvin, humidity: 40, pressure: 1010.0 },
            sys: Some(SystemInfo { country: Some("FR".into()) }),
            weather: vec![Condition {
                icon: "01d".into(),
                main: "Clear".into(),
                description: "clear sky".into(),
            }],
            timezone: 3600,
            wind: None,
        }
    }

    /// Answers from a fixed city list; anything else is a 404.
    #[derive(Debug, Default)]
    struct StubProvider {
        calls: Arc<AtomicUsize>,
        known: Vec<&'static str>,
        offline: bool,
    }

    #[async_trait]
    impl WeatherProvider for StubProvider {
        async fn current_weather(&self, city: &SearchQuery) -> Result<WeatherSnapshot, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.offline {
                let err = serde_json::from_str::<WeatherSnapshot>("<html>").unwrap_err();
                return Err(FetchError::Parse(err));
            }
            if self.known.iter().any(|known| *known == city.as_str()) {
                Ok(snapshot(city.as_str(), 293.15))
            } else {
                Err(FetchError::NotFound { status: 404 })
            }
        }
    }

    fn controller(known: Vec<&'static str>) -> (SearchController, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = StubProvider { calls: calls.clone(), known, offline: false };
        let ctl = SearchController::new(
            Box::new(provider),
            Box::new(MemoryStore::new()),
            UnitPreference::Metric,
        );
        (ctl, calls)
    }

    #[tokio::test]
    async fn empty_query_sets_validation_error_without_fetching() {
        let (mut ctl, calls) = controller(vec!["Paris"]);

        for raw in ["", "   ", "\t\n"] {
            assert_eq!(ctl.submit(raw).await, None);
            let msg = ctl.state().error_message().unwrap();
            assert_eq!(msg, "Search query cannot be empty");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(ctl.recent_searches().is_empty());
    }

    #[tokio::test]
    async fn successful_search_updates_snapshot_and_history() {
        let (mut ctl, calls) = controller(vec!["Paris"]);

        assert_eq!(ctl.submit("  Paris ").await, None);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(ctl.state(), &RequestState::Idle);
        assert_eq!(ctl.snapshot().map(|s| s.name.as_str()), Some("Paris"));
        assert_eq!(ctl.recent_searches().entries(), ["Paris"]);
        assert_eq!(
            ctl.storage().get(RECENT_SEARCHES_KEY).unwrap().as_deref(),
            Some(r#"["Paris"]"#)
        );
    }

    #[tokio::test]
    async fn valid_search_clears_validation_error() {
        let (mut ctl, _) = controller(vec!["Paris"]);
        ctl.submit("").await;
        ctl.submit("Paris").await;
        assert_eq!(ctl.state().error_message(), None);
    }

    #[tokio::test]
    async fn history_stays_bounded_and_unique() {
        let cities = vec!["A", "B", "C", "D", "E", "F"];
        let (mut ctl, _) = controller(cities.clone());

        for city in &cities {
            ctl.submit(city).await;
        }
        ctl.submit("C").await;

        let entries = ctl.recent_searches().entries();
        assert_eq!(entries, ["C", "F", "E", "D", "B"]);
    }

    #[tokio::test]
    async fn repeat_search_moves_city_to_front_without_growing() {
        let (mut ctl, _) = controller(vec!["Oslo", "Rome"]);
        ctl.submit("Oslo").await;
        ctl.submit("Rome").await;
        ctl.submit("Oslo").await;

        assert_eq!(ctl.recent_searches().entries(), ["Oslo", "Rome"]);
    }

    #[tokio::test]
    async fn not_found_keeps_previous_snapshot() {
        let (mut ctl, _) = controller(vec!["Paris"]);
        ctl.submit("Paris").await;
        let before = ctl.snapshot().cloned();

        let note = ctl.submit("Atlantis").await;

        assert_eq!(note, Some(Notification::CityNotFound));
        assert_eq!(note.unwrap().message(), "City not found");
        assert_eq!(ctl.state(), &RequestState::Idle);
        assert_eq!(ctl.snapshot().cloned(), before);
        assert_eq!(ctl.recent_searches().entries(), ["Paris"]);
    }

    #[tokio::test]
    async fn transport_failure_notifies_generically() {
        let provider = StubProvider { offline: true, ..Default::default() };
        let mut ctl = SearchController::new(
            Box::new(provider),
            Box::new(MemoryStore::new()),
            UnitPreference::Metric,
        );

        let note = ctl.dispatch(Command::Submit("Paris".into())).await;

        assert_eq!(note, Some(Notification::FetchFailed));
        assert_eq!(ctl.state(), &RequestState::Idle);
        assert!(ctl.snapshot().is_none());
    }

    #[tokio::test]
    async fn toggle_unit_never_fetches() {
        let (mut ctl, calls) = controller(vec!["Paris"]);

        assert_eq!(ctl.dispatch(Command::ToggleUnit).await, None);
        assert_eq!(ctl.unit(), UnitPreference::Imperial);
        ctl.toggle_unit();
        assert_eq!(ctl.unit(), UnitPreference::Metric);

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn snapshot_hidden_while_loading() {
        let (mut ctl, _) = controller(vec!["Paris"]);
        let query = ctl.begin_search("Paris").unwrap();
        ctl.finish_search(&query, Ok(snapshot("Paris", 280.0)));
        assert!(ctl.displayable_snapshot().is_some());

        let next = ctl.begin_search("Paris").unwrap();
        assert!(ctl.state().is_loading());
        assert!(ctl.displayable_snapshot().is_none());

        ctl.finish_search(&next, Err(FetchError::NotFound { status: 500 }));
        assert!(ctl.displayable_snapshot().is_some());
    }

    #[test]
    fn history_loaded_at_startup() {
        let store = MemoryStore::with_entry(RECENT_SEARCHES_KEY, r#"["Lima","Quito"]"#);
        let ctl = SearchController::new(
            Box::new(StubProvider::default()),
            Box::new(store),
            UnitPreference::Imperial,
        );

        assert_eq!(ctl.recent_searches().entries(), ["Lima", "Quito"]);
        assert_eq!(ctl.unit(), UnitPreference::Imperial);
    }

    #[test]
    fn corrupt_history_starts_empty() {
        let store = MemoryStore::with_entry(RECENT_SEARCHES_KEY, "not json");
        let ctl = SearchController::new(
            Box::new(StubProvider::default()),
            Box::new(store),
            UnitPreference::Metric,
        );

        assert!(ctl.recent_searches().is_empty());
    }
}
