use anyhow::Result;
use std::sync::Arc;

use crate::{
    config::Config,
    error::{FormError, LocationError},
    form::AlarmForm,
    geocode::GeocodingClient,
    location::LocationProvider,
    map::{MapView, PositionUpdate},
    model::{Alarm, AlarmId},
    routing::RoutingClient,
    store::{AlarmStore, SharedAlarms},
    weather::{WeatherApiClient, WeatherPanel},
};

/// One running instance of the app: the form, the alarm list and the map,
/// built from a configuration that was loaded once at startup.
#[derive(Debug)]
pub struct Session {
    pub form: AlarmForm,
    alarms: SharedAlarms,
    map: MapView,
    geocoder: GeocodingClient,
    locator: Arc<dyn LocationProvider>,
}

impl Session {
    pub fn new(config: &Config, locator: Arc<dyn LocationProvider>) -> Result<Self> {
        let geocoder = GeocodingClient::new(&config.endpoints.geocoding, &config.user_agent)?;
        let router = RoutingClient::new(&config.endpoints.routing, &config.user_agent)?;
        let weather = WeatherApiClient::new(
            &config.endpoints.weather,
            config.weather_api_key(),
            &config.user_agent,
        )?;

        if !config.has_weather_api_key() {
            tracing::warn!("No weather API key configured; weather will be unavailable");
        }

        let alarms = AlarmStore::shared();
        let map = MapView::new(alarms.clone(), Arc::new(router), WeatherPanel::new(Arc::new(weather)));

        Ok(Self { form: AlarmForm::new(), alarms, map, geocoder, locator })
    }

    pub fn map(&self) -> &MapView {
        &self.map
    }

    pub fn geocoder(&self) -> &GeocodingClient {
        &self.geocoder
    }

    pub fn alarms(&self) -> Vec<Alarm> {
        self.alarms.lock().snapshot()
    }

    pub async fn search(&mut self, query: &str) -> usize {
        self.form.search(&self.geocoder, query).await.len()
    }

    pub async fn use_current_location(&mut self) -> Result<(), LocationError> {
        self.form.use_current_location(self.locator.as_ref(), &self.geocoder).await.map(|_| ())
    }

    /// Submits the form and appends the alarm to the list.
    pub fn submit(&mut self) -> Result<AlarmId, FormError> {
        let new = self.form.submit()?;
        Ok(self.alarms.lock().add(new))
    }

    pub fn delete(&self, id: &AlarmId) -> bool {
        self.alarms.lock().delete(id)
    }

    /// Asks the device for a position and refreshes travel times, weather and alerts.
    pub async fn update_location(&mut self) -> Result<PositionUpdate, LocationError> {
        let update = self.map.update_location(self.locator.as_ref()).await?;
        if let Some(here) = self.map.current_location() {
            self.form.set_user_location(here);
        }
        Ok(update)
    }
}
