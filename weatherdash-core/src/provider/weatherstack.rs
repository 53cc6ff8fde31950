use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use std::{fmt, time::Duration};

use crate::{
    FetchError,
    config::DEFAULT_WEATHER_BASE_URL,
    error::truncate_body,
    model::{ForecastSnapshot, LocationQuery, WeatherSnapshot},
};

use super::WeatherProvider;

/// Client for the weatherstack `current` and `forecast` endpoints.
#[derive(Clone)]
pub struct WeatherstackProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherstackProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn builder(api_key: impl Into<String>) -> WeatherstackBuilder {
        WeatherstackBuilder { api_key: api_key.into(), base_url: None, timeout: None }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let url = format!("{}/{endpoint}", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[("access_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::debug!(%status, endpoint, "weatherstack request failed");
            return Err(FetchError::Status { status, body: truncate_body(&body) });
        }

        decode(&body)
    }
}

impl fmt::Debug for WeatherstackProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherstackProvider")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

pub struct WeatherstackBuilder {
    api_key: String,
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl WeatherstackBuilder {
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.trim_end_matches('/').to_string());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<WeatherstackProvider, FetchError> {
        let mut http = Client::builder();
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }

        Ok(WeatherstackProvider {
            api_key: self.api_key,
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_WEATHER_BASE_URL.to_string()),
            http: http.build()?,
        })
    }
}

/// weatherstack signals errors in-band with HTTP 200.
#[derive(Debug, Deserialize)]
struct WsEnvelope {
    success: Option<bool>,
    error: Option<WsError>,
}

#[derive(Debug, Deserialize)]
struct WsError {
    code: Option<i64>,
    #[serde(rename = "type")]
    kind: Option<String>,
    info: Option<String>,
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, FetchError> {
    let value: serde_json::Value = serde_json::from_str(body)?;

    if let Ok(envelope) = WsEnvelope::deserialize(&value) {
        if envelope.success == Some(false) || envelope.error.is_some() {
            let err = envelope.error.unwrap_or(WsError { code: None, kind: None, info: None });
            return Err(FetchError::Api {
                code: err.code.unwrap_or_default(),
                kind: err.kind.unwrap_or_else(|| "unknown".to_string()),
                info: err.info.unwrap_or_else(|| "Request was not successful".to_string()),
            });
        }
    }

    Ok(T::deserialize(value)?)
}

#[async_trait]
impl WeatherProvider for WeatherstackProvider {
    async fn current(&self, query: &LocationQuery) -> Result<WeatherSnapshot, FetchError> {
        self.get("current", &[("query", query.as_str())]).await
    }

    async fn forecast(
        &self,
        query: &LocationQuery,
        days: u8,
    ) -> Result<ForecastSnapshot, FetchError> {
        let days = days.to_string();
        self.get("forecast", &[("query", query.as_str()), ("forecast_days", days.as_str())])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_maps_in_band_error() {
        let body = r#"{"success":false,"error":{"code":615,"type":"request_failed","info":"Your API request failed."}}"#;
        let err = decode::<WeatherSnapshot>(body).unwrap_err();

        match err {
            FetchError::Api { code, kind, info } => {
                assert_eq!(code, 615);
                assert_eq!(kind, "request_failed");
                assert_eq!(info, "Your API request failed.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn decode_rejects_non_json() {
        let err = decode::<WeatherSnapshot>("<html>").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn decode_tolerates_missing_fields() {
        let snapshot = decode::<WeatherSnapshot>("{}").unwrap();
        assert_eq!(snapshot, WeatherSnapshot::default());
    }

    #[test]
    fn debug_redacts_api_key() {
        let provider = WeatherstackProvider::new("SECRET");
        let dbg = format!("{provider:?}");
        assert!(!dbg.contains("SECRET"));
        assert!(dbg.contains("api.weatherstack.com"));
    }

    #[test]
    fn builder_strips_trailing_slash() {
        let provider =
            WeatherstackProvider::builder("KEY").base_url("http://localhost:1234/").build().unwrap();
        assert_eq!(provider.base_url, "http://localhost:1234");
    }
}
