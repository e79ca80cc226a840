//! Core library for the `herenow` location reminder.
//!
//! This crate defines:
//! - Configuration handling
//! - Clients for geocoding, routing and weather services
//! - The in-memory alarm list, the add-alarm form and the map view model
//! - Plain-text rendering of the list and the insights panel
//!
//! It is used by `herenow-cli`, but can also be reused by other front ends.

pub mod config;
pub mod error;
pub mod form;
pub mod geo;
pub mod geocode;
pub mod location;
pub mod map;
pub mod model;
pub mod routing;
pub mod session;
pub mod store;
pub mod task;
pub mod view;
pub mod weather;

pub use config::{Config, Endpoints};
pub use error::{FormError, LocationError, WeatherError};
pub use form::AlarmForm;
pub use geo::Coordinates;
pub use geocode::GeocodingClient;
pub use location::{LocationProvider, ManualLocation};
pub use map::{MapMarker, MapView, PositionUpdate};
pub use model::{Alarm, AlarmId, Category, NewAlarm, Place, WeatherSnapshot};
pub use routing::{RoutingClient, TravelTime, TravelTimeSource};
pub use session::Session;
pub use store::{AlarmStore, SharedAlarms};
pub use weather::{RefreshOutcome, WeatherApiClient, WeatherPanel, WeatherSource};

/// Installs the `tracing` subscriber. `RUST_LOG` overrides `default_filter`.
pub fn init_logging(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}
