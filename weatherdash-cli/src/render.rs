//! Plain-text rendering of the dashboard view models.

use std::fmt::Write as _;

use weatherdash_core::{
    CardView, CurrentConditions, DashboardView, FetchState, PanelStatus,
    dashboard::{DayTile, PrimaryPanel},
    model::ForecastDay,
};

const NO_DATA: &str = "No weather data available";

fn num(value: Option<f64>) -> String {
    value.map_or_else(|| "--".to_string(), |v| v.to_string())
}

/// One-shot rendering of a fetch result, used by `show`.
pub fn render_state(state: &FetchState) -> String {
    match state {
        FetchState::Idle => NO_DATA.to_string(),
        FetchState::Loading => "Loading...".to_string(),
        FetchState::Failure(err) => format!("Error: {}", err.user_message()),
        FetchState::Success { weather, forecast } => {
            let Some(current) = weather.current.as_ref() else {
                return NO_DATA.to_string();
            };
            let mut out = String::new();

            let name = weather.location.as_ref().and_then(|l| l.display_name());
            let _ = writeln!(out, "📍 {}", name.as_deref().unwrap_or("Unknown location"));
            let _ = writeln!(
                out,
                "{}°C  {}  (feels like {}°C)",
                num(current.temperature),
                current
                    .weather_descriptions
                    .as_ref()
                    .and_then(|d| d.first())
                    .map_or("", String::as_str),
                num(current.feelslike),
            );
            let _ = writeln!(
                out,
                "Wind {} km/h · UV {} · Visibility {} km · Humidity {}%",
                num(current.wind_speed),
                num(current.uv_index),
                num(current.visibility),
                num(current.humidity),
            );

            let days: Vec<ForecastDay> = forecast
                .forecast
                .iter()
                .map(|(date, day)| ForecastDay { date: Some(date.clone()), ..day.clone() })
                .collect();
            out.push_str(&render_forecast(&days));

            out.trim_end().to_string()
        }
    }
}

pub fn render_dashboard(view: &DashboardView) -> String {
    match &view.status {
        PanelStatus::Loading => return "Loading...".to_string(),
        PanelStatus::Failed(msg) => return format!("Error: {msg}"),
        PanelStatus::NoData => return NO_DATA.to_string(),
        PanelStatus::Ready => {}
    }

    let mut out = String::new();

    if let Some(primary) = &view.primary {
        out.push_str(&render_primary(primary));
    }

    if let Some(h) = &view.highlights {
        out.push_str("\nToday's Highlights\n");
        let _ = writeln!(out, "  Wind Status  {} km/h", num(h.wind_speed));
        let _ = writeln!(out, "  UV Index     {}", num(h.uv_index));
        let _ = writeln!(out, "  Visibility   {} km", num(h.visibility));
        let _ = writeln!(out, "  Humidity     {}%", num(h.humidity));
    }

    out.push_str(&render_forecast(&view.forecast));

    if !view.week.is_empty() {
        let tiles: Vec<String> = view.week.iter().map(render_tile).collect();
        let _ = writeln!(out, "\n{}", tiles.join(" | "));
    }

    if let Some(t) = &view.tomorrow {
        let _ = writeln!(out, "Tomorrow: {} {}°C {}", t.label(), t.temperature, t.icon());
    }

    let cards: Vec<String> =
        view.cards.iter().filter_map(|(country, card)| render_card(country, card)).collect();
    if !cards.is_empty() {
        out.push('\n');
        for card in cards {
            let _ = writeln!(out, "{card}");
        }
    }

    out.trim_end().to_string()
}

fn render_primary(p: &PrimaryPanel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "📍 {}", p.location_name.as_deref().unwrap_or("Loading..."));
    let _ = writeln!(out, "{}, {}", p.weekday, p.date);
    let _ = writeln!(
        out,
        "{}°C  High: {}°C Low: {}°C",
        num(p.temperature),
        p.high,
        p.low
    );
    let _ = writeln!(out, "{}  Feels like {}°C", p.description, num(p.feels_like));
    out
}

fn render_forecast(days: &[ForecastDay]) -> String {
    if days.is_empty() {
        return String::new();
    }

    let mut out = String::from("\nForecast\n");
    for day in days {
        let _ = writeln!(
            out,
            "  {}  {}°C / {}°C",
            day.date.as_deref().unwrap_or("?"),
            num(day.mintemp),
            num(day.maxtemp)
        );
    }
    out
}

fn render_tile(tile: &DayTile) -> String {
    format!("{} {} {}°C", tile.short_name(), tile.icon(), tile.temperature)
}

/// `None` when the card has nothing to show.
pub fn render_card(country: &str, card: &CardView) -> Option<String> {
    match card {
        CardView::Loading => Some(format!("[{country}] ...")),
        CardView::Error => Some(format!("[{country}] Error fetching weather data")),
        CardView::Empty => None,
        CardView::Ready(c) => Some(render_conditions(country, c)),
    }
}

fn render_conditions(country: &str, c: &CurrentConditions) -> String {
    format!(
        "[{country}] {}° {}  Feels like: {}°  Humidity: {}%",
        num(c.temperature),
        c.description,
        num(c.feels_like),
        num(c.humidity)
    )
}
