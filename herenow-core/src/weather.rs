use async_trait::async_trait;
use std::fmt::Debug;

use crate::{error::WeatherError, geo::Coordinates, model::WeatherSnapshot};

pub mod cache;
pub mod panel;
pub mod weatherapi;

pub use cache::{FRESHNESS_WINDOW, WeatherCache};
pub use panel::{RefreshOutcome, WeatherPanel};
pub use weatherapi::WeatherApiClient;

/// Anything that can produce current conditions for a point.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn current(&self, coords: Coordinates) -> Result<WeatherSnapshot, WeatherError>;
}
