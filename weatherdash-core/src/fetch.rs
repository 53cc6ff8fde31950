//! Debounce-then-join building blocks used by [`crate::WeatherFetchService`].
//!
//! Both helpers race their work against a [`CancellationToken`]. Losing the
//! race drops the in-flight futures, which aborts the underlying HTTP
//! requests, and reports [`FetchOutcome::Cancelled`] instead of an error.

use std::time::Duration;

use futures::future::try_join;
use tokio_util::sync::CancellationToken;

use crate::{
    FetchError,
    model::{ForecastSnapshot, LocationQuery, WeatherSnapshot},
    provider::WeatherProvider,
};

#[derive(Debug)]
pub enum FetchOutcome {
    Completed(Result<(WeatherSnapshot, ForecastSnapshot), FetchError>),
    Cancelled,
}

/// Wait out the quiescence window. Returns `false` if cancelled first.
pub async fn debounce(window: Duration, token: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        _ = token.cancelled() => false,
        _ = tokio::time::sleep(window) => true,
    }
}

/// Issue the current-weather and forecast requests concurrently.
///
/// The first failure short-circuits the join and drops the other request.
pub async fn fetch_pair(
    provider: &dyn WeatherProvider,
    query: &LocationQuery,
    forecast_days: u8,
    token: &CancellationToken,
) -> FetchOutcome {
    let joined = try_join(provider.current(query), provider.forecast(query, forecast_days));

    tokio::select! {
        biased;
        _ = token.cancelled() => FetchOutcome::Cancelled,
        result = joined => FetchOutcome::Completed(result),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    };

    #[derive(Debug, Default)]
    struct Scripted {
        fail_current: bool,
        forecast_delay: Duration,
        forecast_finished: AtomicBool,
    }

    #[async_trait]
    impl WeatherProvider for Scripted {
        async fn current(&self, _query: &LocationQuery) -> Result<WeatherSnapshot, FetchError> {
            tokio::time::sleep(Duration::from_millis(10)).await;
            if self.fail_current {
                Err(FetchError::Status { status: StatusCode::NOT_FOUND, body: String::new() })
            } else {
                Ok(WeatherSnapshot::default())
            }
        }

        async fn forecast(
            &self,
            _query: &LocationQuery,
            _days: u8,
        ) -> Result<ForecastSnapshot, FetchError> {
            tokio::time::sleep(self.forecast_delay).await;
            self.forecast_finished.store(true, Ordering::SeqCst);
            Ok(ForecastSnapshot::default())
        }
    }

    fn query() -> LocationQuery {
        LocationQuery::parse("Paris").unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn debounce_elapses_when_not_cancelled() {
        let token = CancellationToken::new();
        assert!(debounce(Duration::from_millis(500), &token).await);
    }

    #[tokio::test(start_paused = true)]
    async fn debounce_reports_cancellation() {
        let token = CancellationToken::new();
        let child = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            child.cancel();
        });

        assert!(!debounce(Duration::from_millis(500), &token).await);
    }

    #[tokio::test(start_paused = true)]
    async fn pair_succeeds_when_both_succeed() {
        let provider = Scripted { forecast_delay: Duration::from_millis(20), ..Default::default() };
        let outcome = fetch_pair(&provider, &query(), 5, &CancellationToken::new()).await;
        assert!(matches!(outcome, FetchOutcome::Completed(Ok(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn first_failure_short_circuits_the_join() {
        let provider = Arc::new(Scripted {
            fail_current: true,
            forecast_delay: Duration::from_secs(60),
            ..Default::default()
        });

        let start = tokio::time::Instant::now();
        let outcome = fetch_pair(provider.as_ref(), &query(), 5, &CancellationToken::new()).await;

        assert!(matches!(outcome, FetchOutcome::Completed(Err(FetchError::Status { .. }))));
        assert!(start.elapsed() < Duration::from_secs(1));
        assert!(!provider.forecast_finished.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_wins_over_in_flight_requests() {
        let provider = Scripted { forecast_delay: Duration::from_secs(5), ..Default::default() };
        let token = CancellationToken::new();
        token.cancel();

        let outcome = fetch_pair(&provider, &query(), 5, &token).await;
        assert!(matches!(outcome, FetchOutcome::Cancelled));
        assert!(!provider.forecast_finished.load(Ordering::SeqCst));
    }
}
