//! View model for the full dashboard: main panel, highlights, the mock
//! week strip, and the row of country cards.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Weekday};
use rand::Rng;
use tokio::sync::watch;

use crate::{
    FetchError, WeatherFetchService,
    card::{CardView, CountryCard},
    config::FetchSettings,
    model::{FetchState, ForecastDay, LocationQuery, first_or_empty},
    provider::WeatherProvider,
    suggest::MIN_INPUT_CHARS,
};

/// Used when no coordinates are available at startup.
pub const FALLBACK_QUERY: &str = "New York";

const WEEK: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A suggestion lookup the caller should perform, tagged so that only the
/// newest answer is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRequest {
    pub seq: u64,
    pub input: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelStatus {
    Loading,
    Failed(String),
    NoData,
    Ready,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryPanel {
    pub location_name: Option<String>,
    pub weekday: String,
    pub date: String,
    pub temperature: Option<f64>,
    pub high: i32,
    pub low: i32,
    pub description: String,
    pub feels_like: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Highlights {
    /// km/h
    pub wind_speed: Option<f64>,
    pub uv_index: Option<f64>,
    /// km
    pub visibility: Option<f64>,
    pub humidity: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayTile {
    pub day: Weekday,
    pub temperature: i32,
}

impl DayTile {
    pub fn is_sunny(&self) -> bool {
        self.temperature > 20
    }

    pub fn label(&self) -> &'static str {
        if self.is_sunny() { "Sunny" } else { "Cloudy" }
    }

    pub fn icon(&self) -> &'static str {
        if self.is_sunny() { "☀️" } else { "☁️" }
    }

    pub fn short_name(&self) -> &'static str {
        short_day_name(self.day)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub status: PanelStatus,
    pub primary: Option<PrimaryPanel>,
    pub highlights: Option<Highlights>,
    pub forecast: Vec<ForecastDay>,
    pub week: Vec<DayTile>,
    pub tomorrow: Option<DayTile>,
    pub cards: Vec<(String, CardView)>,
}

#[derive(Debug)]
pub struct Dashboard {
    service: WeatherFetchService,
    cards: Vec<CountryCard>,
    search: String,
    suggestions: Vec<String>,
    suggestion_seq: u64,
}

impl Dashboard {
    /// Cards start fetching immediately; must be called within a Tokio runtime.
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        settings: FetchSettings,
        countries: &[String],
    ) -> Self {
        let cards = countries
            .iter()
            .map(|c| CountryCard::new(c.as_str(), Arc::clone(&provider), settings))
            .collect();

        Self {
            service: WeatherFetchService::new(provider, settings),
            cards,
            search: String::new(),
            suggestions: Vec::new(),
            suggestion_seq: 0,
        }
    }

    /// Seed the main query from the device position, or the fallback city.
    pub fn bootstrap(&self, position: Option<Coordinates>) {
        match position {
            Some(c) => {
                let query = LocationQuery::from_coordinates(c.latitude, c.longitude);
                self.service.set_query(query.as_str());
            }
            None => {
                tracing::info!("no position available, falling back to {FALLBACK_QUERY}");
                self.service.set_query(FALLBACK_QUERY);
            }
        }
    }

    pub fn search_text(&self) -> &str {
        &self.search
    }

    /// Update the search box. Returns the suggestion lookup to run, if the
    /// input is long enough; otherwise suggestions are cleared.
    pub fn set_search_text(&mut self, text: impl Into<String>) -> Option<SuggestionRequest> {
        self.search = text.into();
        self.suggestion_seq += 1;

        if self.search.trim().chars().count() < MIN_INPUT_CHARS {
            self.suggestions.clear();
            return None;
        }

        Some(SuggestionRequest { seq: self.suggestion_seq, input: self.search.clone() })
    }

    /// Apply a suggestion result. Answers to anything but the latest request
    /// are dropped; errors keep the current list.
    pub fn apply_suggestions(&mut self, seq: u64, result: Result<Vec<String>, FetchError>) -> bool {
        if seq != self.suggestion_seq {
            tracing::debug!(seq, latest = self.suggestion_seq, "stale suggestions dropped");
            return false;
        }

        match result {
            Ok(list) => {
                self.suggestions = list;
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "city suggestion lookup failed");
                false
            }
        }
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// Fetch whatever is in the search box, if anything.
    pub fn submit_search(&self) {
        if !self.search.trim().is_empty() {
            self.service.set_query(&self.search);
        }
    }

    pub fn select_suggestion(&mut self, suggestion: &str) {
        self.search = suggestion.to_string();
        self.suggestions.clear();
        self.suggestion_seq += 1;
        self.service.set_query(suggestion);
    }

    /// After a successful fetch, show the resolved `"name, country"` in the
    /// search box.
    pub fn sync_from_state(&mut self) -> bool {
        let state = self.service.state();
        let resolved = state
            .weather()
            .and_then(|w| w.location.as_ref())
            .and_then(|l| l.display_name());

        match resolved {
            Some(name) if name != self.search => {
                self.search = name;
                true
            }
            _ => false,
        }
    }

    pub fn state(&self) -> FetchState {
        self.service.state()
    }

    pub fn query(&self) -> Option<LocationQuery> {
        self.service.query()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.service.subscribe()
    }

    pub fn cards(&self) -> &[CountryCard] {
        &self.cards
    }

    pub fn dispose(&self) {
        self.service.dispose();
        for card in &self.cards {
            card.dispose();
        }
    }

    pub fn view<R: Rng>(&self, today: NaiveDate, rng: &mut R) -> DashboardView {
        let state = self.service.state();
        let cards = self.cards.iter().map(|c| (c.country().to_string(), c.view())).collect();
        let week = mock_week(rng);
        let tomorrow = week.iter().copied().find(|t| t.day == today.weekday().succ());

        let mut view = DashboardView {
            status: PanelStatus::NoData,
            primary: None,
            highlights: None,
            forecast: Vec::new(),
            week,
            tomorrow,
            cards,
        };

        match &state {
            FetchState::Loading => view.status = PanelStatus::Loading,
            FetchState::Failure(err) => view.status = PanelStatus::Failed(err.to_string()),
            FetchState::Idle => {}
            FetchState::Success { weather, forecast } => {
                let Some(current) = weather.current.as_ref() else {
                    return view;
                };
                let (high, low) = mock_high_low(rng);

                view.status = PanelStatus::Ready;
                view.primary = Some(PrimaryPanel {
                    location_name: weather.location.as_ref().and_then(|l| l.name.clone()),
                    weekday: long_day_name(today.weekday()).to_string(),
                    date: today.format("%-d %b, %Y").to_string(),
                    temperature: current.temperature,
                    high,
                    low,
                    description: first_or_empty(current.weather_descriptions.as_deref()),
                    feels_like: current.feelslike,
                });
                view.highlights = Some(Highlights {
                    wind_speed: current.wind_speed,
                    uv_index: current.uv_index,
                    visibility: current.visibility,
                    humidity: current.humidity,
                });
                view.forecast = forecast
                    .forecast
                    .iter()
                    .map(|(date, day)| ForecastDay {
                        date: day.date.clone().or_else(|| Some(date.clone())),
                        ..day.clone()
                    })
                    .collect();
            }
        }

        view
    }
}

/// Placeholder temperatures for the week strip, Sunday first, each in 10..=30.
pub fn mock_week<R: Rng>(rng: &mut R) -> Vec<DayTile> {
    WEEK.iter().map(|&day| DayTile { day, temperature: rng.gen_range(10..=30) }).collect()
}

/// Placeholder high (30..=50) and low (10..=17).
pub fn mock_high_low<R: Rng>(rng: &mut R) -> (i32, i32) {
    (rng.gen_range(30..=50), rng.gen_range(10..=17))
}

pub fn short_day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Sun",
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
    }
}

pub fn long_day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::EchoProvider;
    use rand::{SeedableRng, rngs::StdRng};
    use reqwest::StatusCode;
    use std::time::Duration;
    use tokio::time::sleep;

    fn countries() -> Vec<String> {
        vec!["USA".to_string(), "China".to_string()]
    }

    fn dashboard(provider: &Arc<EchoProvider>) -> Dashboard {
        Dashboard::new(provider.clone(), FetchSettings::default(), &countries())
    }

    fn today() -> NaiveDate {
        // A Monday.
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn bootstrap_uses_coordinates() {
        let provider = Arc::new(EchoProvider::default());
        let dash = Dashboard::new(provider.clone(), FetchSettings::default(), &[]);

        dash.bootstrap(Some(Coordinates { latitude: 40.7, longitude: -74.0 }));
        sleep(Duration::from_secs(1)).await;

        assert_eq!(provider.queries(), vec!["40.7,-74"]);
    }

    #[tokio::test(start_paused = true)]
    async fn bootstrap_falls_back_to_new_york() {
        let provider = Arc::new(EchoProvider::default());
        let dash = Dashboard::new(provider.clone(), FetchSettings::default(), &[]);

        dash.bootstrap(None);
        sleep(Duration::from_secs(1)).await;

        assert_eq!(provider.queries(), vec!["New York"]);
    }

    #[tokio::test(start_paused = true)]
    async fn cards_fetch_independently() {
        let provider = Arc::new(EchoProvider::failing(&["China"]));
        let dash = dashboard(&provider);
        sleep(Duration::from_secs(1)).await;

        let mut queries = provider.queries();
        queries.sort();
        assert_eq!(queries, vec!["China", "USA"]);

        let views: Vec<_> = dash.cards().iter().map(|c| (c.country(), c.view())).collect();
        assert!(matches!(views[0], ("USA", CardView::Ready(_))));
        assert_eq!(views[1], ("China", CardView::Error));
        assert!(matches!(dash.state(), FetchState::Idle));
    }

    #[tokio::test(start_paused = true)]
    async fn submit_search_fetches_and_syncs_search_text() {
        let provider = Arc::new(EchoProvider::default());
        let mut dash = Dashboard::new(provider.clone(), FetchSettings::default(), &[]);

        dash.set_search_text("  ");
        dash.submit_search();
        sleep(Duration::from_secs(1)).await;
        assert!(provider.queries().is_empty());

        dash.set_search_text("Paris");
        dash.submit_search();
        sleep(Duration::from_secs(1)).await;

        assert_eq!(provider.queries(), vec!["Paris"]);
        assert!(dash.sync_from_state());
        assert_eq!(dash.search_text(), "Paris, France");
        assert!(!dash.sync_from_state());
    }

    #[tokio::test(start_paused = true)]
    async fn select_suggestion_sets_query_and_clears_list() {
        let provider = Arc::new(EchoProvider::default());
        let mut dash = Dashboard::new(provider.clone(), FetchSettings::default(), &[]);

        let req = dash.set_search_text("Lon").unwrap();
        dash.apply_suggestions(req.seq, Ok(vec!["London, England, United Kingdom".into()]));
        assert_eq!(dash.suggestions().len(), 1);

        dash.select_suggestion("London, England, United Kingdom");
        assert!(dash.suggestions().is_empty());
        assert_eq!(dash.search_text(), "London, England, United Kingdom");

        sleep(Duration::from_secs(1)).await;
        assert_eq!(provider.queries(), vec!["London, England, United Kingdom"]);
    }

    #[tokio::test]
    async fn short_search_text_clears_suggestions() {
        let provider = Arc::new(EchoProvider::default());
        let mut dash = Dashboard::new(provider, FetchSettings::default(), &[]);

        let req = dash.set_search_text("Par").unwrap();
        assert_eq!(req.input, "Par");
        dash.apply_suggestions(req.seq, Ok(vec!["Paris".into()]));

        assert!(dash.set_search_text("Pa").is_none());
        assert!(dash.suggestions().is_empty());
    }

    #[tokio::test]
    async fn stale_suggestions_are_dropped() {
        let provider = Arc::new(EchoProvider::default());
        let mut dash = Dashboard::new(provider, FetchSettings::default(), &[]);

        let older = dash.set_search_text("Par").unwrap();
        let newer = dash.set_search_text("Paris").unwrap();

        assert!(dash.apply_suggestions(newer.seq, Ok(vec!["Paris, France".into()])));
        assert!(!dash.apply_suggestions(older.seq, Ok(vec!["Parma, Italy".into()])));
        assert_eq!(dash.suggestions(), ["Paris, France"]);
    }

    #[tokio::test]
    async fn suggestion_errors_keep_current_list() {
        let provider = Arc::new(EchoProvider::default());
        let mut dash = Dashboard::new(provider, FetchSettings::default(), &[]);

        let first = dash.set_search_text("Ber").unwrap();
        dash.apply_suggestions(first.seq, Ok(vec!["Berlin, Germany".into()]));

        let second = dash.set_search_text("Berl").unwrap();
        let err = FetchError::Status { status: StatusCode::SERVICE_UNAVAILABLE, body: String::new() };
        assert!(!dash.apply_suggestions(second.seq, Err(err)));
        assert_eq!(dash.suggestions(), ["Berlin, Germany"]);
    }

    #[tokio::test(start_paused = true)]
    async fn view_reflects_fetch_state() {
        let provider = Arc::new(EchoProvider::failing(&["Atlantis"]));
        let mut dash = Dashboard::new(provider, FetchSettings::default(), &[]);
        let mut rng = StdRng::seed_from_u64(7);

        let view = dash.view(today(), &mut rng);
        assert_eq!(view.status, PanelStatus::NoData);
        assert!(view.primary.is_none());

        dash.set_search_text("Paris");
        dash.submit_search();
        sleep(Duration::from_millis(520)).await;
        assert_eq!(dash.view(today(), &mut rng).status, PanelStatus::Loading);

        sleep(Duration::from_secs(1)).await;
        let view = dash.view(today(), &mut rng);
        assert_eq!(view.status, PanelStatus::Ready);

        let primary = view.primary.unwrap();
        assert_eq!(primary.location_name.as_deref(), Some("Paris"));
        assert_eq!(primary.weekday, "Monday");
        assert_eq!(primary.date, "19 Oct, 2026");
        assert_eq!(primary.temperature, Some(21.0));
        assert_eq!(primary.description, "Clear");
        assert!((30..=50).contains(&primary.high));
        assert!((10..=17).contains(&primary.low));

        let highlights = view.highlights.unwrap();
        assert_eq!(highlights.wind_speed, Some(12.0));
        assert_eq!(highlights.humidity, Some(55.0));

        let dates: Vec<_> = view.forecast.iter().filter_map(|d| d.date.clone()).collect();
        assert_eq!(dates, vec!["2026-10-20", "2026-10-21"]);

        dash.set_search_text("Atlantis");
        dash.submit_search();
        sleep(Duration::from_secs(2)).await;
        assert!(matches!(dash.view(today(), &mut rng).status, PanelStatus::Failed(_)));
    }

    #[test]
    fn week_strip_is_sunday_first_and_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let week = mock_week(&mut rng);

        let names: Vec<_> = week.iter().map(DayTile::short_name).collect();
        assert_eq!(names, vec!["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]);
        assert!(week.iter().all(|t| (10..=30).contains(&t.temperature)));
    }

    #[test]
    fn tile_label_follows_temperature() {
        let warm = DayTile { day: Weekday::Tue, temperature: 21 };
        let mild = DayTile { day: Weekday::Tue, temperature: 20 };
        assert_eq!(warm.label(), "Sunny");
        assert_eq!(mild.label(), "Cloudy");
        assert_eq!(mild.icon(), "☁️");
    }

    #[tokio::test]
    async fn tomorrow_is_next_weekday() {
        let provider = Arc::new(EchoProvider::default());
        let dash = Dashboard::new(provider, FetchSettings::default(), &[]);
        let mut rng = StdRng::seed_from_u64(1);

        let view = dash.view(today(), &mut rng);
        let tomorrow = view.tomorrow.unwrap();
        assert_eq!(tomorrow.day, Weekday::Tue);
        assert_eq!(view.week[2], tomorrow);

        let saturday = NaiveDate::from_ymd_opt(2026, 10, 24).unwrap();
        assert_eq!(dash.view(saturday, &mut rng).tomorrow.unwrap().day, Weekday::Sun);
    }

    #[tokio::test(start_paused = true)]
    async fn dispose_stops_every_service() {
        let provider = Arc::new(EchoProvider::default());
        let dash = dashboard(&provider);
        dash.dispose();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(provider.queries().is_empty());
    }
}
