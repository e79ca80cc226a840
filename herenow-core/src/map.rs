//! Map view model: markers plus what happens when the user's position changes.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use crate::{
    error::LocationError,
    geo::Coordinates,
    location::LocationProvider,
    model::{Alarm, AlarmId},
    routing::TravelTimeSource,
    store::SharedAlarms,
    view::Insights,
    weather::WeatherPanel,
};

/// Alarms closer than this to the user raise a nearby alert.
pub const NEARBY_RADIUS_M: f64 = 5_000.0;
pub const ALARM_RADIUS_M: f64 = 500.0;
pub const CURRENT_LOCATION_RADIUS_M: f64 = 100.0;
pub const CURRENT_LOCATION_COLOR: &str = "#3B82F6";
pub const DEFAULT_ZOOM: u8 = 13;

#[derive(Debug, Clone, PartialEq)]
pub enum MarkerKind {
    Alarm(AlarmId),
    CurrentLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub kind: MarkerKind,
    pub position: Coordinates,
    pub color: &'static str,
    pub radius_m: f64,
    pub title: String,
    /// Popup body lines.
    pub details: Vec<String>,
}

impl MapMarker {
    fn for_alarm(alarm: &Alarm) -> Self {
        let mut badge = alarm.category.title().to_string();
        if let Some(eta) = &alarm.estimated_time {
            badge.push_str(&format!("  {eta} away"));
        }

        Self {
            kind: MarkerKind::Alarm(alarm.id),
            position: alarm.coordinates(),
            color: alarm.category.color(),
            radius_m: ALARM_RADIUS_M,
            title: alarm.name.clone(),
            details: vec![alarm.message.clone(), badge, alarm.coordinates().to_string()],
        }
    }

    fn for_current_location(position: Coordinates) -> Self {
        Self {
            kind: MarkerKind::CurrentLocation,
            position,
            color: CURRENT_LOCATION_COLOR,
            radius_m: CURRENT_LOCATION_RADIUS_M,
            title: "You are here".to_string(),
            details: Vec::new(),
        }
    }
}

/// OpenStreetMap link centred on `position`.
pub fn osm_url(position: Coordinates, zoom: u8) -> String {
    format!(
        "https://www.openstreetmap.org/?mlat={lat:.6}&mlon={lon:.6}#map={zoom}/{lat:.6}/{lon:.6}",
        lat = position.latitude,
        lon = position.longitude,
    )
}

/// `"<Category title> alert near <name>"` for every alarm within [`NEARBY_RADIUS_M`].
pub fn nearby_alerts(position: Coordinates, alarms: &[Alarm]) -> Vec<String> {
    alarms
        .iter()
        .filter(|a| position.distance_m(&a.coordinates()) < NEARBY_RADIUS_M)
        .map(|a| format!("{} alert near {}", a.category.title(), a.name))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionUpdate {
    Applied,
    /// A newer position arrived while this one was being processed.
    Superseded,
}

#[derive(Debug, Default)]
struct MapState {
    current: Option<Coordinates>,
    nearby_alerts: Vec<String>,
    last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct MapView {
    alarms: SharedAlarms,
    router: Arc<dyn TravelTimeSource>,
    weather: WeatherPanel,
    epoch: AtomicU64,
    state: Mutex<MapState>,
}

impl MapView {
    pub fn new(alarms: SharedAlarms, router: Arc<dyn TravelTimeSource>, weather: WeatherPanel) -> Self {
        Self { alarms, router, weather, epoch: AtomicU64::new(0), state: Mutex::new(MapState::default()) }
    }

    pub fn weather(&self) -> &WeatherPanel {
        &self.weather
    }

    pub fn current_location(&self) -> Option<Coordinates> {
        self.state.lock().current
    }

    pub fn nearby_alerts(&self) -> Vec<String> {
        self.state.lock().nearby_alerts.clone()
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.state.lock().last_updated
    }

    pub fn insights(&self) -> Insights {
        let state = self.state.lock();
        Insights {
            weather: self.weather.snapshot(),
            weather_error: self.weather.error(),
            nearby_alerts: state.nearby_alerts.clone(),
            last_updated: state.last_updated,
        }
    }

    /// Alarm markers in list order, then the current-location marker if known.
    pub fn markers(&self) -> Vec<MapMarker> {
        let mut markers: Vec<MapMarker> = self.alarms.lock().iter().map(MapMarker::for_alarm).collect();
        if let Some(here) = self.current_location() {
            markers.push(MapMarker::for_current_location(here));
        }
        markers
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) == epoch
    }

    /// Handles a confirmed user position: travel times for each alarm (one
    /// after another, each written as soon as it resolves), then weather, then
    /// nearby alerts. Stops early and discards results once a newer position
    /// has been reported.
    pub async fn on_position(&self, position: Coordinates) -> PositionUpdate {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.lock();
            state.current = Some(position);
            state.last_updated = Some(Utc::now());
        }

        let targets: Vec<(AlarmId, Coordinates)> =
            self.alarms.lock().iter().map(|a| (a.id, a.coordinates())).collect();

        tracing::debug!("Position update #{} at {}, {} alarms", epoch, position, targets.len());

        for (id, destination) in targets {
            let eta = self.router.estimate(position, destination).await;
            if !self.is_current(epoch) {
                tracing::debug!("Position update #{} superseded, dropping travel times", epoch);
                return PositionUpdate::Superseded;
            }
            self.alarms.lock().set_estimated_time(&id, eta.label());
        }

        self.weather.refresh(position).await;

        if !self.is_current(epoch) {
            return PositionUpdate::Superseded;
        }

        let alerts = nearby_alerts(position, self.alarms.lock().as_slice());
        self.state.lock().nearby_alerts = alerts;

        PositionUpdate::Applied
    }

    /// "Update Current Location": asks the device and processes the result.
    pub async fn update_location(
        &self,
        locator: &dyn LocationProvider,
    ) -> Result<PositionUpdate, LocationError> {
        let position = locator.current_position().await.inspect_err(|e| {
            tracing::warn!("Error getting location: {}", e);
        })?;

        Ok(self.on_position(position).await)
    }
}
