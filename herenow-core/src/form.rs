//! State behind the "Add New Alarm" form.

use crate::{
    error::{FormError, LocationError},
    geo::Coordinates,
    geocode::GeocodingClient,
    location::LocationProvider,
    model::{Category, EMPTY_MESSAGE_PLACEHOLDER, NewAlarm, Place},
};

#[derive(Debug, Clone, Default)]
pub struct AlarmForm {
    pub area_name: String,
    pub latitude: String,
    pub longitude: String,
    pub category: Category,
    pub message: String,
    suggestions: Vec<Place>,
    user_location: Option<Coordinates>,
}

impl AlarmForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn suggestions(&self) -> &[Place] {
        &self.suggestions
    }

    /// Last position obtained through [`AlarmForm::use_current_location`].
    pub fn user_location(&self) -> Option<Coordinates> {
        self.user_location
    }

    pub fn set_user_location(&mut self, position: Coordinates) {
        self.user_location = Some(position);
    }

    /// Typing into the area field. Short queries leave the suggestion list untouched.
    pub async fn search(&mut self, geocoder: &GeocodingClient, query: &str) -> &[Place] {
        self.area_name = query.to_string();

        if query.chars().count() >= crate::geocode::MIN_QUERY_LEN {
            self.suggestions = geocoder.search(query, self.user_location).await;
        }

        &self.suggestions
    }

    /// Picks a suggestion: fills the location fields and closes the list.
    pub fn select(&mut self, index: usize) -> Option<Place> {
        let place = self.suggestions.get(index).cloned()?;

        self.latitude = place.lat.clone();
        self.longitude = place.lon.clone();
        self.area_name = place.display_name.clone();
        self.suggestions.clear();

        Some(place)
    }

    /// Fills the location fields from the device and names the spot by
    /// reverse geocoding. The name is left as-is when the lookup fails.
    pub async fn use_current_location(
        &mut self,
        locator: &dyn LocationProvider,
        geocoder: &GeocodingClient,
    ) -> Result<Coordinates, LocationError> {
        let position = locator.current_position().await.inspect_err(|e| {
            tracing::warn!("Error getting location: {}", e);
        })?;

        self.latitude = position.latitude.to_string();
        self.longitude = position.longitude.to_string();
        self.user_location = Some(position);

        if let Some(name) = geocoder.reverse(position).await {
            self.area_name = name;
        }

        Ok(position)
    }

    /// Validates the fields and, on success, resets the form.
    pub fn submit(&mut self) -> Result<NewAlarm, FormError> {
        let name = self.area_name.trim();
        if name.is_empty() {
            return Err(FormError::MissingField("Area/Location Name"));
        }

        let latitude = parse_coordinate("Latitude", &self.latitude)?;
        let longitude = parse_coordinate("Longitude", &self.longitude)?;

        // Only a truly empty message gets the placeholder; whitespace is kept.
        let message = if self.message.is_empty() {
            EMPTY_MESSAGE_PLACEHOLDER.to_string()
        } else {
            self.message.clone()
        };

        let new = NewAlarm { latitude, longitude, name: name.to_string(), message, category: self.category };
        self.reset();
        Ok(new)
    }

    /// Clears the input fields. Suggestions and the remembered user
    /// location survive.
    pub fn reset(&mut self) {
        self.area_name.clear();
        self.latitude.clear();
        self.longitude.clear();
        self.message.clear();
        self.category = Category::default();
    }
}

fn parse_coordinate(field: &'static str, raw: &str) -> Result<f64, FormError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(FormError::MissingField(field));
    }

    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FormError::InvalidCoordinate { field, value: raw.to_string() })
}
