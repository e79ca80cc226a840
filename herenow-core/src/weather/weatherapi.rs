use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode, header::RETRY_AFTER};
use serde::Deserialize;
use std::time::Duration;

use crate::{error::WeatherError, geo::Coordinates, model::WeatherSnapshot};

use super::WeatherSource;

/// Upper bound for a single attempt, after which it counts as failed.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
/// Used when a 429 response carries no usable `Retry-After` header.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);
pub const MAX_INLINE_RETRIES: u32 = 3;
pub const INLINE_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Current-conditions client for WeatherAPI.com.
#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    base_url: String,
    api_key: Option<String>,
    http: Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl WeatherApiClient {
    pub fn new(base_url: &str, api_key: Option<String>, user_agent: &str) -> anyhow::Result<Self> {
        let http = Client::builder().user_agent(user_agent).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            http,
            max_retries: MAX_INLINE_RETRIES,
            retry_delay: INLINE_RETRY_DELAY,
        })
    }

    /// Overrides the in-line retry policy.
    pub fn with_retry_policy(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }

    /// Fetches current conditions, retrying transient failures in-line.
    ///
    /// Rate limiting and timeouts are returned straight away; the rate-limit
    /// delay is left to the caller to schedule.
    pub async fn fetch_current(&self, coords: Coordinates) -> Result<WeatherSnapshot, WeatherError> {
        let mut attempt = 0;

        loop {
            match self.fetch_once(coords).await {
                Ok(snapshot) => {
                    if attempt > 0 {
                        tracing::info!("Weather request succeeded after {} retries", attempt);
                    }
                    return Ok(snapshot);
                }
                Err(e) if e.is_retryable_inline() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "Weather request failed ({}), retry {} of {} in {:?}",
                        e,
                        attempt,
                        self.max_retries,
                        self.retry_delay
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, coords: Coordinates) -> Result<WeatherSnapshot, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::MissingApiKey)?;

        match tokio::time::timeout(REQUEST_TIMEOUT, self.request(api_key, coords)).await {
            Ok(result) => result,
            Err(_) => Err(WeatherError::Timeout),
        }
    }

    async fn request(&self, api_key: &str, coords: Coordinates) -> Result<WeatherSnapshot, WeatherError> {
        let url = format!("{}/v1/current.json", self.base_url);
        let q = format!("{},{}", coords.latitude, coords.longitude);

        tracing::debug!("Requesting current weather for {}", q);

        let res = self
            .http
            .get(&url)
            .query(&[("key", api_key), ("q", q.as_str()), ("aqi", "no")])
            .send()
            .await?;

        let status = res.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = res
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_RETRY_AFTER);
            return Err(WeatherError::RateLimited { retry_after });
        }

        let body = res.text().await?;

        if !status.is_success() {
            return Err(WeatherError::Status { status: status.as_u16(), body: truncate_body(&body) });
        }

        let parsed: WaResponse =
            serde_json::from_str(&body).map_err(|e| WeatherError::Parse(e.to_string()))?;

        Ok(parsed.current.into_snapshot())
    }
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    feelslike_c: f64,
    humidity: u8,
    wind_kph: f64,
    #[serde(default)]
    uv: f64,
    condition: WaCondition,
}

impl WaCurrent {
    fn into_snapshot(self) -> WeatherSnapshot {
        WeatherSnapshot {
            temperature_c: self.temp_c.round() as i32,
            feels_like_c: self.feelslike_c.round() as i32,
            condition: self.condition.text,
            humidity_pct: self.humidity,
            wind_kph: self.wind_kph.round() as i32,
            uv_index: self.uv,
            captured_at: Utc::now(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    current: WaCurrent,
}

#[async_trait]
impl WeatherSource for WeatherApiClient {
    async fn current(&self, coords: Coordinates) -> Result<WeatherSnapshot, WeatherError> {
        self.fetch_current(coords).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_block_is_rounded() {
        let parsed: WaResponse = serde_json::from_str(
            r#"{"current":{"temp_c":21.6,"feelslike_c":20.4,"humidity":55,
                "wind_kph":13.7,"uv":6.0,"condition":{"text":"Partly cloudy"}}}"#,
        )
        .unwrap();

        let s = parsed.current.into_snapshot();
        assert_eq!(s.temperature_c, 22);
        assert_eq!(s.feels_like_c, 20);
        assert_eq!(s.wind_kph, 14);
        assert_eq!(s.humidity_pct, 55);
        assert_eq!(s.condition, "Partly cloudy");
        assert_eq!(s.uv_index, 6.0);
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(500);
        let t = truncate_body(&body);
        assert_eq!(t.len(), 203);
        assert!(t.ends_with("..."));
        assert_eq!(truncate_body("short"), "short");
    }

    #[tokio::test]
    async fn missing_key_fails_without_request() {
        let client = WeatherApiClient::new("http://127.0.0.1:9", None, "test").unwrap();
        let err = client.fetch_current(Coordinates::new(1.0, 2.0)).await.unwrap_err();
        assert!(matches!(err, WeatherError::MissingApiKey));
    }
}
