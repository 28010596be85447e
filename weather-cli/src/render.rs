use std::fmt::Write;

use weather_core::{
    CityName, CurrentWeatherSample, FetchState, ForecastGroups, LabelPolicy, Phase,
};

pub fn current_panel(state: &FetchState<CurrentWeatherSample>) -> String {
    match state.phase() {
        Phase::Idle => "Search for a city to see the weather information".to_string(),
        Phase::Loading => "Loading current weather...".to_string(),
        Phase::Failed => format!("Error: {}", state.error().unwrap_or_default()),
        Phase::Success => match state.data() {
            Some(w) => current_card(w),
            None => String::new(),
        },
    }
}

fn current_card(w: &CurrentWeatherSample) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", w.location_name);
    let _ = writeln!(
        out,
        "  {}°C  {} ({})",
        round_half_up(w.temperature_c),
        capitalize_words(&w.condition_description),
        w.condition_main
    );
    let _ = writeln!(out, "  Humidity: {}%   Wind Speed: {} m/s", w.humidity_pct, w.wind_speed);
    let _ = write!(out, "  Icon: {}", w.icon_url());
    out
}

pub fn forecast_panel(state: &FetchState<ForecastGroups>, labels: &LabelPolicy) -> String {
    let mut out = String::from("5-Day Forecast\n");
    match state.phase() {
        Phase::Idle => return String::new(),
        Phase::Loading => out.push_str("  Loading forecast..."),
        Phase::Failed => {
            let _ = write!(out, "  Error: {}", state.error().unwrap_or_default());
        }
        Phase::Success => match state.data() {
            Some(groups) if !groups.is_empty() => out.push_str(&day_tabs(groups, labels)),
            _ => out.push_str("  No forecast data available."),
        },
    }
    out
}

fn day_tabs(groups: &ForecastGroups, labels: &LabelPolicy) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  {}", groups.labels().join(" | "));
    for day in groups {
        let _ = writeln!(out, "  [{}]", day.label);
        for sample in &day.samples {
            let _ = writeln!(
                out,
                "    {:>5}  {:>4}°C  {}",
                labels.time_label(sample.timestamp),
                round_half_up(sample.temperature_c),
                capitalize_words(&sample.condition_description)
            );
        }
    }
    out.trim_end().to_string()
}

pub fn history_list(history: &[CityName]) -> String {
    if history.is_empty() {
        return "No recent searches.".to_string();
    }
    let mut out = String::from("Recent Searches");
    for (i, city) in history.iter().enumerate() {
        let _ = write!(out, "\n  {}. {}", i + 1, city);
    }
    out
}

/// Rounds .5 towards positive infinity, the way dashboards usually show temperatures.
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

fn capitalize_words(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
