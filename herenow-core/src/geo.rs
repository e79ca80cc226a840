use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Mean earth radius used by the great-circle helpers.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A point on the map, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Great-circle distance in metres (haversine).
    pub fn distance_m(&self, other: &Coordinates) -> f64 {
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_M * c
    }

    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        self.distance_m(other) / 1000.0
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Parses `"lat,lon"` (whitespace around either number is ignored).
impl FromStr for Coordinates {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| anyhow!("Expected coordinates as 'lat,lon', got '{s}'"))?;

        let latitude: f64 =
            lat.trim().parse().with_context(|| format!("Invalid latitude '{}'", lat.trim()))?;
        let longitude: f64 =
            lon.trim().parse().with_context(|| format!("Invalid longitude '{}'", lon.trim()))?;

        let coords = Coordinates::new(latitude, longitude);
        if !coords.is_finite() {
            return Err(anyhow!("Coordinates must be finite numbers, got '{s}'"));
        }

        Ok(coords)
    }
}
