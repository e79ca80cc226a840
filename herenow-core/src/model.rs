use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt, str::FromStr};
use uuid::Uuid;

use crate::geo::Coordinates;

/// Message stored when the user leaves the message field empty.
pub const EMPTY_MESSAGE_PLACEHOLDER: &str = "(No message)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Important,
    Work,
    Shopping,
    Pickup,
    #[default]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Important => "important",
            Category::Work => "work",
            Category::Shopping => "shopping",
            Category::Pickup => "pickup",
            Category::Other => "other",
        }
    }

    /// Badge text shown next to an alarm.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Important => "Important",
            Category::Work => "Work",
            Category::Shopping => "Shopping",
            Category::Pickup => "Pick Up",
            Category::Other => "Other",
        }
    }

    /// Capitalised short name, as used on the map ("Pickup", not "Pick Up").
    pub fn title(&self) -> &'static str {
        match self {
            Category::Important => "Important",
            Category::Work => "Work",
            Category::Shopping => "Shopping",
            Category::Pickup => "Pickup",
            Category::Other => "Other",
        }
    }

    /// Marker and radius colour.
    pub fn color(&self) -> &'static str {
        match self {
            Category::Important => "#EF4444",
            Category::Work => "#3B82F6",
            Category::Shopping => "#10B981",
            Category::Pickup => "#F59E0B",
            Category::Other => "#6B7280",
        }
    }

    pub const fn all() -> &'static [Category] {
        &[
            Category::Important,
            Category::Work,
            Category::Shopping,
            Category::Pickup,
            Category::Other,
        ]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Category {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.trim().to_lowercase();

        Category::all().iter().copied().find(|c| c.as_str() == lower).ok_or_else(|| {
            anyhow::anyhow!(
                "Unknown category '{value}'. Supported categories: important, work, shopping, pickup, other."
            )
        })
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::try_from(s)
    }
}

/// Opaque alarm identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlarmId(Uuid);

impl AlarmId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for AlarmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Validated input for a new alarm, produced by the add-alarm form.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAlarm {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    pub message: String,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alarm {
    pub id: AlarmId,
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    pub message: String,
    pub category: Category,
    /// Travel-time label, filled in once a position update reaches this alarm.
    pub estimated_time: Option<String>,
}

impl Alarm {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// A single geocoding candidate. Coordinates stay textual as returned upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub lat: String,
    pub lon: String,
    pub display_name: String,
    #[serde(default)]
    pub importance: Option<f64>,
    /// Kilometres from the reference point used when ranking, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl Place {
    pub fn coordinates(&self) -> Option<Coordinates> {
        let lat = self.lat.trim().parse::<f64>().ok()?;
        let lon = self.lon.trim().parse::<f64>().ok()?;
        let coords = Coordinates::new(lat, lon);
        coords.is_finite().then_some(coords)
    }
}

/// Current conditions at a point, as shown in the insights panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature_c: i32,
    pub feels_like_c: i32,
    pub condition: String,
    pub humidity_pct: u8,
    pub wind_kph: i32,
    pub uv_index: f64,
    pub captured_at: DateTime<Utc>,
}
