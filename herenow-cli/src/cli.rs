use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use herenow_core::{
    Config, Coordinates, GeocodingClient, ManualLocation, RoutingClient, TravelTimeSource,
    WeatherApiClient, view,
};
use inquire::{Confirm, CustomType, Password, PasswordDisplayMode};
use std::sync::Arc;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "herenow", version, about = "Here&Now: location reminders with travel time and weather")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the weather API key and an optional home position.
    Configure,

    /// Search for a place by name.
    Search {
        /// Free-text query (at least 3 characters).
        query: String,

        /// Rank results by distance from this point, as "lat,lon".
        #[arg(long, allow_hyphen_values = true)]
        near: Option<Coordinates>,
    },

    /// Estimate driving time between two points.
    Route {
        /// Start, as "lat,lon".
        #[arg(allow_hyphen_values = true)]
        from: Coordinates,
        /// Destination, as "lat,lon".
        #[arg(allow_hyphen_values = true)]
        to: Coordinates,
    },

    /// Show current weather at a point.
    Weather {
        /// Position, as "lat,lon".
        #[arg(allow_hyphen_values = true)]
        at: Coordinates,
    },

    /// Start an interactive session (add alarms, update location, insights).
    Run {
        /// Current position, as "lat,lon". Falls back to the configured home.
        #[arg(long, allow_hyphen_values = true)]
        at: Option<Coordinates>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Search { query, near } => {
                let config = Config::load()?;
                let geocoder = GeocodingClient::new(&config.endpoints.geocoding, &config.user_agent)?;

                let places = geocoder.search(&query, near.or(config.home)).await;
                if places.is_empty() {
                    println!("No matching places.");
                }
                for (i, place) in places.iter().enumerate() {
                    match place.distance_km {
                        Some(km) => println!("{:>2}. {} ({:.1} km)", i + 1, place.display_name, km),
                        None => println!("{:>2}. {}", i + 1, place.display_name),
                    }
                    println!("    {}, {}", place.lat, place.lon);
                }
                Ok(())
            }
            Command::Route { from, to } => {
                let config = Config::load()?;
                let router = RoutingClient::new(&config.endpoints.routing, &config.user_agent)?;

                let eta = router.estimate(from, to).await;
                println!("{eta}");
                Ok(())
            }
            Command::Weather { at } => {
                let config = Config::load()?;
                let client = WeatherApiClient::new(
                    &config.endpoints.weather,
                    config.weather_api_key(),
                    &config.user_agent,
                )?;

                let snapshot = client
                    .fetch_current(at)
                    .await
                    .map_err(|e| anyhow!("{} ({e})", e.user_message()))?;
                print!("{}", view::render_weather(&snapshot));
                Ok(())
            }
            Command::Run { at } => {
                let config = Config::load()?;
                let locator = Arc::new(ManualLocation::new(at.or(config.home)));
                crate::interactive::run(&config, locator).await
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("WeatherAPI.com API key (leave empty to keep current):")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.set_weather_api_key(api_key);
    }

    let set_home = Confirm::new("Set a default position?")
        .with_default(config.home.is_none())
        .prompt()
        .context("Failed to read answer")?;
    if set_home {
        let home = CustomType::<Coordinates>::new("Position (lat,lon):")
            .with_error_message("Enter coordinates as 'lat,lon', e.g. 12.9716,77.5946")
            .prompt()
            .context("Failed to read position")?;
        config.home = Some(home);
    }

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}
