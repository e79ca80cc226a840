//! Device location.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt::Debug;

use crate::{error::LocationError, geo::Coordinates};

/// Source of the user's current position.
#[async_trait]
pub trait LocationProvider: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

/// Position supplied by the user (command line, config or the interactive
/// session). Reports [`LocationError::Unavailable`] until one is set.
#[derive(Debug, Default)]
pub struct ManualLocation {
    position: Mutex<Option<Coordinates>>,
}

impl ManualLocation {
    pub fn new(position: Option<Coordinates>) -> Self {
        Self { position: Mutex::new(position) }
    }

    pub fn set(&self, position: Coordinates) {
        tracing::info!("Device position set to {}", position);
        *self.position.lock() = Some(position);
    }

    pub fn clear(&self) {
        *self.position.lock() = None;
    }

    pub fn get(&self) -> Option<Coordinates> {
        *self.position.lock()
    }
}

#[async_trait]
impl LocationProvider for ManualLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        self.get().ok_or(LocationError::Unavailable)
    }
}
