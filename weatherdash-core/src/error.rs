use reqwest::StatusCode;
use thiserror::Error;

/// Why a fetch against a remote API produced no usable payload.
///
/// Cancellation is deliberately absent: a cancelled fetch is reported as
/// [`crate::fetch::FetchOutcome::Cancelled`] and never reaches consumers.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("API error {code} ({kind}): {info}")]
    Api { code: i64, kind: String, info: String },

    #[error("Failed to parse response JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    /// Short message suitable for an error banner.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(e) if e.is_timeout() => "The weather service timed out".to_string(),
            Self::Network(_) => "Could not reach the weather service".to_string(),
            Self::Status { status, .. } => format!("Weather service returned {status}"),
            Self::Api { info, .. } => info.clone(),
            Self::Decode(_) => "Unexpected response from the weather service".to_string(),
        }
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
