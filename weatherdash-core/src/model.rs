use std::{collections::BTreeMap, fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::FetchError;

/// The string identifying the place to fetch weather for.
///
/// Either `"<lat>,<lon>"`, a free-text city name, or a composed
/// `"city, country"`. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationQuery(String);

impl LocationQuery {
    /// Trim `raw`; `None` when nothing is left, meaning "no fetch".
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() { None } else { Some(Self(trimmed.to_string())) }
    }

    pub fn from_coordinates(latitude: f64, longitude: f64) -> Self {
        Self(format!("{latitude},{longitude}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub name: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub localtime: Option<String>,
}

impl ResolvedLocation {
    /// `"name, country"`, the query a dashboard writes back into its search box.
    pub fn display_name(&self) -> Option<String> {
        match (self.name.as_deref(), self.country.as_deref()) {
            (Some(name), Some(country)) => Some(format!("{name}, {country}")),
            (Some(name), None) => Some(name.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature: Option<f64>,
    pub feelslike: Option<f64>,
    pub humidity: Option<f64>,
    pub weather_icons: Option<Vec<String>>,
    pub weather_descriptions: Option<Vec<String>>,
    pub wind_speed: Option<f64>,
    pub uv_index: Option<f64>,
    pub visibility: Option<f64>,
}

/// Result of a current-weather fetch. Every field is optional; consumers
/// render placeholders for whatever is missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub current: Option<CurrentWeather>,
    pub location: Option<ResolvedLocation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: Option<String>,
    pub mintemp: Option<f64>,
    pub maxtemp: Option<f64>,
    pub avgtemp: Option<f64>,
    pub totalsnow: Option<f64>,
    pub sunhour: Option<f64>,
    pub uv_index: Option<f64>,
}

/// Result of a multi-day forecast fetch, keyed by `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastSnapshot {
    pub location: Option<ResolvedLocation>,
    #[serde(default)]
    pub forecast: BTreeMap<String, ForecastDay>,
}

/// Display model for a compact weather card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub temperature: Option<f64>,
    pub country: Option<String>,
    pub weather_icon: String,
    pub description: String,
    pub feels_like: Option<f64>,
    pub humidity: Option<f64>,
}

impl CurrentConditions {
    /// Requires both the `current` and `location` blocks; a missing icon or
    /// description list yields an empty string.
    pub fn from_snapshot(snapshot: &WeatherSnapshot) -> Option<Self> {
        let current = snapshot.current.as_ref()?;
        let location = snapshot.location.as_ref()?;

        Some(Self {
            temperature: current.temperature,
            country: location.country.clone(),
            weather_icon: first_or_empty(current.weather_icons.as_deref()),
            description: first_or_empty(current.weather_descriptions.as_deref()),
            feels_like: current.feelslike,
            humidity: current.humidity,
        })
    }
}

pub(crate) fn first_or_empty(items: Option<&[String]>) -> String {
    items.and_then(|v| v.first()).cloned().unwrap_or_default()
}

/// Per-service fetch state. Exactly one variant is active at a time.
#[derive(Debug, Clone, Default)]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    Success { weather: Arc<WeatherSnapshot>, forecast: Arc<ForecastSnapshot> },
    Failure(Arc<FetchError>),
}

impl FetchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// True once a cycle has committed a result.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::Failure(_))
    }

    pub fn weather(&self) -> Option<&WeatherSnapshot> {
        match self {
            Self::Success { weather, .. } => Some(weather),
            _ => None,
        }
    }

    pub fn forecast(&self) -> Option<&ForecastSnapshot> {
        match self {
            Self::Success { forecast, .. } => Some(forecast),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Failure(err) => Some(err),
            _ => None,
        }
    }
}
