//! Plain-text rendering of the alarm list and the location insights panel.

use chrono::{DateTime, Local, Utc};
use std::fmt::Write as _;

use crate::model::{Alarm, WeatherSnapshot};

pub const EMPTY_LIST_TEXT: &str = "No alarms set";
pub const PENDING_ETA_TEXT: &str = "Calculating...";
pub const LOADING_WEATHER_TEXT: &str = "Loading weather data...";
pub const NO_ALERTS_TEXT: &str = "No alerts in your area";

/// One entry of the "Active Alarms" list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmRow {
    pub name: String,
    pub message: String,
    pub badge: String,
    pub eta: String,
    pub coordinates: String,
}

impl From<&Alarm> for AlarmRow {
    fn from(alarm: &Alarm) -> Self {
        Self {
            name: alarm.name.clone(),
            message: alarm.message.clone(),
            badge: alarm.category.label().to_string(),
            eta: alarm.estimated_time.clone().unwrap_or_else(|| PENDING_ETA_TEXT.to_string()),
            coordinates: alarm.coordinates().to_string(),
        }
    }
}

pub fn alarm_rows(alarms: &[Alarm]) -> Vec<AlarmRow> {
    alarms.iter().map(AlarmRow::from).collect()
}

pub fn render_alarm_list(alarms: &[Alarm]) -> String {
    let mut out = String::from("Active Alarms\n");

    if alarms.is_empty() {
        out.push_str("  ");
        out.push_str(EMPTY_LIST_TEXT);
        out.push('\n');
        return out;
    }

    for (i, row) in alarm_rows(alarms).iter().enumerate() {
        let _ = writeln!(out, "{:>3}. {}", i + 1, row.name);
        let _ = writeln!(out, "     {}", row.message);
        let _ = writeln!(out, "     [{}]  {}", row.badge, row.eta);
        let _ = writeln!(out, "     {}", row.coordinates);
    }

    out
}

/// Everything the insights panel shows.
#[derive(Debug, Clone, Default)]
pub struct Insights {
    pub weather: Option<WeatherSnapshot>,
    pub weather_error: Option<String>,
    pub nearby_alerts: Vec<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

pub fn render_weather(snapshot: &WeatherSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}°C  {}", snapshot.temperature_c, snapshot.condition);
    let _ = writeln!(out, "Feels like {}°C • UV Index: {}", snapshot.feels_like_c, snapshot.uv_index);
    let _ = writeln!(out, "Wind Speed: {} km/h", snapshot.wind_kph);
    let _ = writeln!(out, "Humidity: {}%", snapshot.humidity_pct);
    let _ = writeln!(out, "Last updated: {}", local_time(snapshot.captured_at));
    out
}

pub fn render_insights(insights: &Insights) -> String {
    let mut out = String::from("Location Insights\n\n");

    // An error takes the place of the weather card.
    match (&insights.weather_error, &insights.weather) {
        (Some(error), _) => {
            let _ = writeln!(out, "! {error}");
        }
        (None, Some(snapshot)) => {
            out.push_str("Weather Conditions\n");
            out.push_str(&render_weather(snapshot));
        }
        (None, None) => {
            out.push_str(LOADING_WEATHER_TEXT);
            out.push('\n');
        }
    }

    out.push_str("\nNearby Alerts\n");
    if insights.nearby_alerts.is_empty() {
        let _ = writeln!(out, "  {NO_ALERTS_TEXT}");
    } else {
        for alert in &insights.nearby_alerts {
            let _ = writeln!(out, "  • {alert}");
        }
    }

    if let Some(at) = insights.last_updated {
        let _ = writeln!(out, "\nLast updated {}", local_time(at));
    }

    out
}

fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AlarmId, Category};

    fn alarm(eta: Option<&str>) -> Alarm {
        Alarm {
            id: AlarmId::generate(),
            latitude: 12.9,
            longitude: 77.6,
            name: "Home".into(),
            message: "(No message)".into(),
            category: Category::Pickup,
            estimated_time: eta.map(str::to_string),
        }
    }

    #[test]
    fn row_shows_badge_and_pending_eta() {
        let row = AlarmRow::from(&alarm(None));
        assert_eq!(row.badge, "Pick Up");
        assert_eq!(row.eta, "Calculating...");
        assert_eq!(row.coordinates, "12.900000, 77.600000");
    }

    #[test]
    fn empty_list_says_so() {
        assert!(render_alarm_list(&[]).contains("No alarms set"));
    }

    #[test]
    fn list_renders_each_alarm() {
        let text = render_alarm_list(&[alarm(Some("~12 min"))]);
        assert!(text.contains("1. Home"));
        assert!(text.contains("[Pick Up]  ~12 min"));
        assert!(text.contains("(No message)"));
    }

    #[test]
    fn insights_prefer_error_over_weather() {
        let insights = Insights {
            weather_error: Some("Weather service is busy. Retrying soon...".into()),
            ..Insights::default()
        };
        let text = render_insights(&insights);
        assert!(text.contains("Weather service is busy"));
        assert!(!text.contains(LOADING_WEATHER_TEXT));
        assert!(text.contains(NO_ALERTS_TEXT));
    }

    #[test]
    fn insights_show_weather_card_and_alerts() {
        let insights = Insights {
            weather: Some(WeatherSnapshot {
                temperature_c: 18,
                feels_like_c: 17,
                condition: "Light rain".into(),
                humidity_pct: 81,
                wind_kph: 15,
                uv_index: 1.0,
                captured_at: Utc::now(),
            }),
            nearby_alerts: vec!["Work alert near Office".into()],
            ..Insights::default()
        };
        let text = render_insights(&insights);
        assert!(text.contains("18°C  Light rain"));
        assert!(text.contains("Feels like 17°C • UV Index: 1"));
        assert!(text.contains("Humidity: 81%"));
        assert!(text.contains("• Work alert near Office"));
    }

    #[test]
    fn insights_without_weather_are_loading() {
        assert!(render_insights(&Insights::default()).contains(LOADING_WEATHER_TEXT));
    }
}
