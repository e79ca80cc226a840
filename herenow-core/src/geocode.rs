//! Forward and reverse geocoding against a Nominatim-compatible service.
//!
//! Failures never reach the caller: a failed search is an empty suggestion
//! list and a failed reverse lookup leaves the label unchanged.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{geo::Coordinates, model::Place};

/// Queries shorter than this (in characters) are not sent.
pub const MIN_QUERY_LEN: usize = 3;
pub const SEARCH_LIMIT: usize = 10;
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GeocodingClient {
    base_url: String,
    http: Client,
}

impl GeocodingClient {
    pub fn new(base_url: &str, user_agent: &str) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(user_agent)
            .build()?;

        Ok(Self { base_url: base_url.trim_end_matches('/').to_string(), http })
    }

    /// Free-text search, optionally ranked by distance from `reference`.
    pub async fn search(&self, query: &str, reference: Option<Coordinates>) -> Vec<Place> {
        if query.chars().count() < MIN_QUERY_LEN {
            return Vec::new();
        }

        let mut places = match self.fetch_search(query).await {
            Ok(places) => places,
            Err(e) => {
                tracing::warn!("Error searching locations for '{}': {:#}", query, e);
                return Vec::new();
            }
        };

        if let Some(origin) = reference {
            rank_by_distance(&mut places, origin);
        }

        tracing::debug!("Search '{}' returned {} candidates", query, places.len());
        places
    }

    async fn fetch_search(&self, query: &str) -> anyhow::Result<Vec<Place>> {
        let url = format!("{}/search", self.base_url);
        let limit = SEARCH_LIMIT.to_string();

        let res = self
            .http
            .get(&url)
            .query(&[
                ("format", "json"),
                ("q", query),
                ("addressdetails", "1"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let mut places: Vec<Place> = res.json().await?;
        places.truncate(SEARCH_LIMIT);
        Ok(places)
    }

    /// Human-readable label for a point, or `None` if the lookup failed.
    pub async fn reverse(&self, coords: Coordinates) -> Option<String> {
        let url = format!("{}/reverse", self.base_url);
        let lat = coords.latitude.to_string();
        let lon = coords.longitude.to_string();

        let response = match self
            .http
            .get(&url)
            .query(&[("format", "json"), ("lat", lat.as_str()), ("lon", lon.as_str())])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Reverse geocode request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!("Reverse geocode returned status {}", response.status());
            return None;
        }

        match response.json::<ReverseResponse>().await {
            Ok(body) => {
                if let Some(name) = &body.display_name {
                    tracing::info!("Reverse geocoded to: {}", name);
                }
                body.display_name
            }
            Err(e) => {
                tracing::warn!("Reverse geocode parse error: {}", e);
                None
            }
        }
    }
}

/// Annotates each place with its distance from `origin` and sorts nearest
/// first. The sort is stable; places without usable coordinates go last.
pub fn rank_by_distance(places: &mut [Place], origin: Coordinates) {
    for place in places.iter_mut() {
        place.distance_km = place.coordinates().map(|c| origin.distance_km(&c));
    }

    places.sort_by(|a, b| {
        let da = a.distance_km.unwrap_or(f64::INFINITY);
        let db = b.distance_km.unwrap_or(f64::INFINITY);
        da.total_cmp(&db)
    });
}
