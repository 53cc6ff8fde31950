//! Per-consumer weather fetch state machine.
//!
//! Every query change bumps a generation counter and cancels the previous
//! cycle's token. A cycle may only commit state while its generation is
//! still current, and the check happens under the same lock that bumps the
//! counter, so a superseded cycle can never overwrite a newer result.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::{
    config::FetchSettings,
    fetch::{FetchOutcome, debounce, fetch_pair},
    model::{FetchState, LocationQuery},
    provider::WeatherProvider,
};

#[derive(Debug, Default)]
struct Inner {
    generation: u64,
    query: Option<LocationQuery>,
    token: Option<CancellationToken>,
    disposed: bool,
}

#[derive(Debug)]
struct Shared {
    inner: Mutex<Inner>,
    state: watch::Sender<FetchState>,
}

impl Shared {
    /// Publish `next` if `generation` still owns this service.
    fn commit(&self, generation: u64, next: FetchState) -> bool {
        let inner = self.inner.lock();
        if inner.disposed || inner.generation != generation {
            return false;
        }
        self.state.send_replace(next);
        true
    }
}

/// Resolves a [`LocationQuery`] into current weather plus forecast, debounced
/// and cancellable. Each consumer owns its own instance.
#[derive(Debug)]
pub struct WeatherFetchService {
    provider: Arc<dyn WeatherProvider>,
    settings: FetchSettings,
    shared: Arc<Shared>,
}

impl WeatherFetchService {
    pub fn new(provider: Arc<dyn WeatherProvider>, settings: FetchSettings) -> Self {
        let (state, _) = watch::channel(FetchState::Idle);
        Self {
            provider,
            settings,
            shared: Arc::new(Shared { inner: Mutex::new(Inner::default()), state }),
        }
    }

    /// Replace the query and schedule a fetch cycle for it.
    ///
    /// Empty input, an unchanged query, or a disposed service are no-ops.
    /// Must be called from within a Tokio runtime.
    pub fn set_query(&self, raw: impl AsRef<str>) {
        let Some(query) = LocationQuery::parse(raw.as_ref()) else {
            tracing::debug!("empty query ignored");
            return;
        };

        let (generation, token) = {
            let mut inner = self.shared.inner.lock();
            if inner.disposed || inner.query.as_ref() == Some(&query) {
                return;
            }
            if let Some(previous) = inner.token.take() {
                previous.cancel();
            }
            inner.generation += 1;
            inner.query = Some(query.clone());

            let token = CancellationToken::new();
            inner.token = Some(token.clone());
            (inner.generation, token)
        };

        tracing::debug!(%query, generation, "scheduling fetch");

        tokio::spawn(run_cycle(
            Arc::clone(&self.shared),
            Arc::clone(&self.provider),
            self.settings,
            query,
            generation,
            token,
        ));
    }

    pub fn state(&self) -> FetchState {
        self.shared.state.borrow().clone()
    }

    /// Receiver that observes every committed transition.
    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.shared.state.subscribe()
    }

    pub fn query(&self) -> Option<LocationQuery> {
        self.shared.inner.lock().query.clone()
    }

    /// Cancel outstanding work and stop accepting queries. The last
    /// committed state is kept.
    pub fn dispose(&self) {
        let mut inner = self.shared.inner.lock();
        if inner.disposed {
            return;
        }
        inner.disposed = true;
        inner.generation += 1;
        if let Some(token) = inner.token.take() {
            token.cancel();
        }
        tracing::debug!("fetch service disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.inner.lock().disposed
    }
}

impl Drop for WeatherFetchService {
    fn drop(&mut self) {
        self.dispose();
    }
}

async fn run_cycle(
    shared: Arc<Shared>,
    provider: Arc<dyn WeatherProvider>,
    settings: FetchSettings,
    query: LocationQuery,
    generation: u64,
    token: CancellationToken,
) {
    if !debounce(settings.debounce, &token).await {
        tracing::debug!(%query, generation, "superseded during debounce");
        return;
    }

    if !shared.commit(generation, FetchState::Loading) {
        return;
    }

    match fetch_pair(provider.as_ref(), &query, settings.forecast_days, &token).await {
        FetchOutcome::Cancelled => {
            tracing::debug!(%query, generation, "fetch cancelled");
        }
        FetchOutcome::Completed(Ok((weather, forecast))) => {
            let next = FetchState::Success { weather: Arc::new(weather), forecast: Arc::new(forecast) };
            if shared.commit(generation, next) {
                tracing::info!(%query, generation, "weather updated");
            }
        }
        FetchOutcome::Completed(Err(err)) => {
            tracing::warn!(%query, generation, error = %err, "weather fetch failed");
            shared.commit(generation, FetchState::Failure(Arc::new(err)));
        }
    }
}
