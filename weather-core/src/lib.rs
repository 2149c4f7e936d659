//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration handling
//! - The OpenWeather fetcher behind a `WeatherProvider` trait
//! - The search controller and its persisted recent-search history
//! - Display helpers (unit conversion, flags, day labels)
//!
//! It is used by `weather-cli`, but can also be reused by other front-ends.

pub mod config;
pub mod controller;
pub mod error;
pub mod format;
pub mod history;
pub mod model;
pub mod provider;
pub mod storage;

pub use config::Config;
pub use controller::{Command, Notification, SearchController};
pub use error::{FetchError, ValidationError};
pub use history::RecentSearchHistory;
pub use model::{RequestState, SearchQuery, UnitPreference, WeatherSnapshot};
pub use provider::{OpenWeatherProvider, WeatherProvider, provider_from_config};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
