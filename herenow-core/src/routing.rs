//! Travel-time estimates: driving duration from an OSRM-compatible router,
//! falling back to a straight-line estimate.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt, time::Duration};

use crate::geo::Coordinates;

/// Average speed assumed by the straight-line fallback, in metres per second.
pub const AVERAGE_SPEED_MPS: f64 = 40.0;
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TravelTime {
    /// Duration reported by the routing service, in seconds.
    Routed(f64),
    /// Straight-line estimate, in seconds.
    Approximate(f64),
    Unavailable,
}

impl TravelTime {
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TravelTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TravelTime::Routed(secs) => f.write_str(&format_duration(*secs)),
            TravelTime::Approximate(secs) => write!(f, "~{}", format_duration(*secs)),
            TravelTime::Unavailable => f.write_str("~calculating"),
        }
    }
}

/// `"Hh Mm"` when at least an hour, otherwise `"M min"`.
pub fn format_duration(secs: f64) -> String {
    let secs = secs.max(0.0);
    let hours = (secs / 3600.0).floor() as u64;
    let minutes = ((secs % 3600.0) / 60.0).floor() as u64;

    if hours > 0 { format!("{hours}h {minutes}m") } else { format!("{minutes} min") }
}

/// Straight-line duration at [`AVERAGE_SPEED_MPS`], or `None` if it cannot be computed.
pub fn straight_line_secs(start: Coordinates, end: Coordinates) -> Option<f64> {
    let secs = start.distance_m(&end) / AVERAGE_SPEED_MPS;
    secs.is_finite().then_some(secs)
}

#[async_trait]
pub trait TravelTimeSource: Send + Sync + fmt::Debug {
    async fn estimate(&self, start: Coordinates, end: Coordinates) -> TravelTime;
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Clone)]
pub struct RoutingClient {
    base_url: String,
    http: Client,
}

impl RoutingClient {
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(user_agent)
            .build()?;

        Ok(Self { base_url: base_url.trim_end_matches('/').to_string(), http })
    }

    /// Driving duration in seconds; any unusable answer is an error.
    pub async fn driving_duration(&self, start: Coordinates, end: Coordinates) -> Result<f64> {
        let url = format!(
            "{}/route/v1/driving/{},{};{},{}",
            self.base_url, start.longitude, start.latitude, end.longitude, end.latitude
        );

        let res = self
            .http
            .get(&url)
            .query(&[("overview", "false")])
            .send()
            .await
            .context("Failed to send request to routing service")?;

        let status = res.status();
        if !status.is_success() {
            return Err(anyhow!("Routing service returned status {status}"));
        }

        let parsed: OsrmResponse =
            res.json().await.context("Failed to parse routing response JSON")?;

        if parsed.code != "Ok" {
            return Err(anyhow!("Routing service answered with code '{}'", parsed.code));
        }

        parsed
            .routes
            .first()
            .map(|r| r.duration)
            .filter(|d| d.is_finite())
            .ok_or_else(|| anyhow!("Routing response contained no route"))
    }
}

#[async_trait]
impl TravelTimeSource for RoutingClient {
    async fn estimate(&self, start: Coordinates, end: Coordinates) -> TravelTime {
        match self.driving_duration(start, end).await {
            Ok(secs) => TravelTime::Routed(secs),
            Err(e) => {
                tracing::debug!("Routing failed, using straight-line estimate: {:#}", e);
                match straight_line_secs(start, end) {
                    Some(secs) => TravelTime::Approximate(secs),
                    None => {
                        tracing::warn!("Error calculating travel time from {start} to {end}");
                        TravelTime::Unavailable
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_durations_are_minutes() {
        assert_eq!(format_duration(0.0), "0 min");
        assert_eq!(format_duration(59.0), "0 min");
        assert_eq!(format_duration(1500.0), "25 min");
        assert_eq!(format_duration(3599.0), "59 min");
    }

    #[test]
    fn long_durations_show_hours_and_minutes() {
        assert_eq!(format_duration(3600.0), "1h 0m");
        assert_eq!(format_duration(5430.0), "1h 30m");
        assert_eq!(format_duration(26.0 * 3600.0 + 61.0), "26h 1m");
    }

    #[test]
    fn approximate_label_is_prefixed() {
        assert_eq!(TravelTime::Routed(5430.0).label(), "1h 30m");
        assert_eq!(TravelTime::Approximate(5430.0).label(), "~1h 30m");
        assert_eq!(TravelTime::Approximate(600.0).label(), "~10 min");
        assert_eq!(TravelTime::Unavailable.label(), "~calculating");
    }

    #[test]
    fn straight_line_uses_average_speed() {
        let a = Coordinates::new(0.0, 0.0);
        let b = Coordinates::new(0.0, 1.0);
        let secs = straight_line_secs(a, b).unwrap();
        let expected = a.distance_m(&b) / AVERAGE_SPEED_MPS;
        assert!((secs - expected).abs() < 1e-9);
    }

    #[test]
    fn straight_line_rejects_non_finite_points() {
        let a = Coordinates::new(f64::NAN, 0.0);
        assert!(straight_line_secs(a, Coordinates::new(1.0, 1.0)).is_none());
    }

    #[tokio::test]
    async fn non_finite_points_yield_placeholder() {
        let client = RoutingClient::new("http://127.0.0.1:9", "test").unwrap();
        let t = client
            .estimate(Coordinates::new(f64::NAN, 0.0), Coordinates::new(1.0, 1.0))
            .await;
        assert_eq!(t, TravelTime::Unavailable);
    }
}
