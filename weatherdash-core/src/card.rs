use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    WeatherFetchService,
    config::FetchSettings,
    model::{CurrentConditions, FetchState},
    provider::WeatherProvider,
};

/// What a compact card should render right now.
#[derive(Debug, Clone, PartialEq)]
pub enum CardView {
    Loading,
    Error,
    /// Nothing fetched yet, or the payload lacked a current/location block.
    Empty,
    Ready(CurrentConditions),
}

impl CardView {
    pub fn from_state(state: &FetchState) -> Self {
        match state {
            FetchState::Loading => Self::Loading,
            FetchState::Failure(_) => Self::Error,
            FetchState::Idle => Self::Empty,
            FetchState::Success { weather, .. } => {
                CurrentConditions::from_snapshot(weather).map_or(Self::Empty, Self::Ready)
            }
        }
    }
}

/// Weather card for one fixed location, with its own fetch service.
#[derive(Debug)]
pub struct CountryCard {
    country: String,
    service: WeatherFetchService,
}

impl CountryCard {
    /// Starts fetching immediately; must be called within a Tokio runtime.
    pub fn new(
        country: impl Into<String>,
        provider: Arc<dyn WeatherProvider>,
        settings: FetchSettings,
    ) -> Self {
        let country = country.into();
        let service = WeatherFetchService::new(provider, settings);
        service.set_query(&country);
        Self { country, service }
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn view(&self) -> CardView {
        CardView::from_state(&self.service.state())
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.service.subscribe()
    }

    pub fn dispose(&self) {
        self.service.dispose();
    }
}
