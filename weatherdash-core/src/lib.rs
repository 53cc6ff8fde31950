//! Core library for the `weatherdash` terminal dashboard.
//!
//! This crate defines:
//! - Configuration & API key handling
//! - Abstraction over the weather provider (weatherstack)
//! - The debounced, cancellable [`WeatherFetchService`]
//! - City-name suggestions
//! - Dashboard and country-card view models
//!
//! It is used by `weatherdash-cli`, but the view models carry no terminal
//! assumptions and can back other front-ends.

pub mod card;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fetch;
pub mod model;
pub mod provider;
pub mod service;
pub mod suggest;

#[cfg(test)]
mod testing;

pub use card::{CardView, CountryCard};
pub use config::{Config, FetchSettings};
pub use dashboard::{Coordinates, Dashboard, DashboardView, PanelStatus};
pub use error::FetchError;
pub use model::{
    CurrentConditions, FetchState, ForecastSnapshot, LocationQuery, WeatherSnapshot,
};
pub use provider::{WeatherProvider, provider_from_config};
pub use service::WeatherFetchService;
pub use suggest::CitySuggester;
