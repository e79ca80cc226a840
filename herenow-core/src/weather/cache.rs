use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::model::WeatherSnapshot;

/// How long a snapshot is served without asking the weather service again.
pub const FRESHNESS_WINDOW: Duration = Duration::from_secs(10 * 60);

/// Holds the most recent snapshot. Replaced wholesale, never merged.
#[derive(Debug, Clone, Default)]
pub struct WeatherCache {
    snapshot: Option<WeatherSnapshot>,
}

impl WeatherCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&mut self, snapshot: WeatherSnapshot) {
        self.snapshot = Some(snapshot);
    }

    pub fn latest(&self) -> Option<&WeatherSnapshot> {
        self.snapshot.as_ref()
    }

    /// The cached snapshot if it is younger than [`FRESHNESS_WINDOW`] at `now`.
    pub fn fresh_at(&self, now: DateTime<Utc>) -> Option<&WeatherSnapshot> {
        self.snapshot.as_ref().filter(|s| match (now - s.captured_at).to_std() {
            Ok(age) => age < FRESHNESS_WINDOW,
            // Captured "in the future" (clock skew): still the newest we have.
            Err(_) => true,
        })
    }

    pub fn fresh(&self) -> Option<&WeatherSnapshot> {
        self.fresh_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn snapshot_at(captured_at: DateTime<Utc>) -> WeatherSnapshot {
        WeatherSnapshot {
            temperature_c: 21,
            feels_like_c: 20,
            condition: "Sunny".into(),
            humidity_pct: 40,
            wind_kph: 12,
            uv_index: 5.0,
            captured_at,
        }
    }

    #[test]
    fn empty_cache_is_never_fresh() {
        assert!(WeatherCache::new().fresh().is_none());
    }

    #[test]
    fn snapshot_is_fresh_inside_window() {
        let now = Utc::now();
        let mut cache = WeatherCache::new();
        cache.store(snapshot_at(now - TimeDelta::minutes(9)));

        assert!(cache.fresh_at(now).is_some());
    }

    #[test]
    fn snapshot_expires_at_window_boundary() {
        let now = Utc::now();
        let mut cache = WeatherCache::new();
        cache.store(snapshot_at(now - TimeDelta::minutes(10)));

        assert!(cache.fresh_at(now).is_none());
        assert!(cache.latest().is_some());
    }

    #[test]
    fn store_replaces_previous_snapshot() {
        let now = Utc::now();
        let mut cache = WeatherCache::new();
        cache.store(snapshot_at(now - TimeDelta::minutes(30)));

        let mut newer = snapshot_at(now);
        newer.condition = "Rain".into();
        cache.store(newer.clone());

        assert_eq!(cache.fresh_at(now), Some(&newer));
    }
}
