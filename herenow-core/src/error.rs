//! Error types shared across the core crate.

use std::time::Duration;

use thiserror::Error;

/// Failures of a weather fetch.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Weather service rate limit exceeded, retry after {}s", retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    #[error("Weather request timed out")]
    Timeout,

    #[error("Weather API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to parse weather response: {0}")]
    Parse(String),

    #[error("No weather API key configured")]
    MissingApiKey,
}

impl WeatherError {
    /// Message shown inline in the insights panel.
    pub fn user_message(&self) -> String {
        match self {
            Self::RateLimited { .. } => "Weather service is busy. Retrying soon...".to_string(),
            Self::MissingApiKey => {
                "Weather is unavailable: no API key configured. Run `herenow configure`.".to_string()
            }
            _ => "Unable to fetch weather data. Please try again later.".to_string(),
        }
    }

    /// Whether the fetcher may retry immediately after a short backoff.
    pub fn is_retryable_inline(&self) -> bool {
        !matches!(self, Self::RateLimited { .. } | Self::Timeout | Self::MissingApiKey)
    }
}

/// Device location failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    Unavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}

/// Rejections at the add-alarm form boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{field} must be a number, got '{value}'")]
    InvalidCoordinate { field: &'static str, value: String },
}
