//! In-process provider for view-model tests.

use std::{collections::HashSet, time::Duration};

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;
use serde_json::json;

use crate::{
    FetchError,
    model::{ForecastSnapshot, LocationQuery, WeatherSnapshot},
    provider::WeatherProvider,
};

/// Answers every query with a Paris-like snapshot whose location name is
/// the query itself, after a short latency.
#[derive(Debug, Default)]
pub(crate) struct EchoProvider {
    pub failing: HashSet<String>,
    pub queries: Mutex<Vec<String>>,
}

impl EchoProvider {
    pub fn failing(queries: &[&str]) -> Self {
        Self { failing: queries.iter().map(|q| q.to_string()).collect(), ..Default::default() }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }
}

pub(crate) fn snapshot_for(name: &str) -> WeatherSnapshot {
    serde_json::from_value(json!({
        "current": {
            "temperature": 21,
            "feelslike": 19,
            "humidity": 55,
            "wind_speed": 12,
            "uv_index": 4,
            "visibility": 10,
            "weather_icons": ["x.png"],
            "weather_descriptions": ["Clear"]
        },
        "location": { "name": name, "country": "France" }
    }))
    .unwrap_or_default()
}

#[async_trait]
impl WeatherProvider for EchoProvider {
    async fn current(&self, query: &LocationQuery) -> Result<WeatherSnapshot, FetchError> {
        self.queries.lock().push(query.to_string());
        tokio::time::sleep(Duration::from_millis(50)).await;
        if self.failing.contains(query.as_str()) {
            return Err(FetchError::Status { status: StatusCode::NOT_FOUND, body: String::new() });
        }
        Ok(snapshot_for(query.as_str()))
    }

    async fn forecast(
        &self,
        _query: &LocationQuery,
        _days: u8,
    ) -> Result<ForecastSnapshot, FetchError> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(serde_json::from_value(json!({
            "forecast": {
                "2026-10-21": { "mintemp": 8, "maxtemp": 15 },
                "2026-10-20": { "date": "2026-10-20", "mintemp": 9, "maxtemp": 16 }
            }
        }))
        .unwrap_or_default())
    }
}
