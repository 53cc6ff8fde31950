//! City-name autocomplete backed by the Teleport city search API.

use reqwest::Client;
use serde::Deserialize;

use crate::{
    Config, FetchError,
    config::{DEFAULT_SUGGEST_BASE_URL, DEFAULT_SUGGESTION_LIMIT},
    error::truncate_body,
};

/// Inputs this short never hit the network.
pub const MIN_INPUT_CHARS: usize = 3;

#[derive(Debug, Clone)]
pub struct CitySuggester {
    base_url: String,
    limit: u8,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "_embedded", default)]
    embedded: Option<Embedded>,
}

#[derive(Debug, Deserialize)]
struct Embedded {
    #[serde(rename = "city:search-results", default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    matching_full_name: Option<String>,
}

impl Default for CitySuggester {
    fn default() -> Self {
        Self::new(DEFAULT_SUGGEST_BASE_URL, DEFAULT_SUGGESTION_LIMIT)
    }
}

impl CitySuggester {
    pub fn new(base_url: &str, limit: u8) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            limit,
            http: Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let http = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { http, ..Self::new(&config.suggest_base_url, config.suggestion_limit) })
    }

    /// Full city names matching `input`, empty for inputs under three chars.
    pub async fn suggest(&self, input: &str) -> Result<Vec<String>, FetchError> {
        let input = input.trim();
        if input.chars().count() < MIN_INPUT_CHARS {
            return Ok(Vec::new());
        }

        let url = format!("{}/api/cities/", self.base_url);
        let limit = self.limit.to_string();

        let res = self
            .http
            .get(&url)
            .query(&[("search", input), ("limit", limit.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status { status, body: truncate_body(&body) });
        }

        let parsed: SearchResponse = serde_json::from_str(&body)?;
        let names = parsed
            .embedded
            .map(|e| e.results.into_iter().filter_map(|r| r.matching_full_name).collect())
            .unwrap_or_default();

        Ok(names)
    }
}
