//! The interactive session: the form, the alarm list and the map panel as
//! a prompt loop.

use anyhow::Context;
use chrono::Local;
use herenow_core::{
    Category, Config, Coordinates, ManualLocation, PositionUpdate, Session,
    map::{DEFAULT_ZOOM, MarkerKind, osm_url},
    view,
};
use inquire::{CustomType, InquireError, Select, Text};
use std::{fmt, sync::Arc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    AddAlarm,
    DeleteAlarm,
    ListAlarms,
    UpdateLocation,
    ShowMap,
    ShowInsights,
    SetPosition,
    Quit,
}

impl Action {
    const ALL: [Action; 8] = [
        Action::AddAlarm,
        Action::DeleteAlarm,
        Action::ListAlarms,
        Action::UpdateLocation,
        Action::ShowMap,
        Action::ShowInsights,
        Action::SetPosition,
        Action::Quit,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::AddAlarm => "Add alarm",
            Action::DeleteAlarm => "Delete alarm",
            Action::ListAlarms => "List alarms",
            Action::UpdateLocation => "Update current location",
            Action::ShowMap => "Show map markers",
            Action::ShowInsights => "Show location insights",
            Action::SetPosition => "Set my position",
            Action::Quit => "Quit",
        })
    }
}

/// How the user wants to fill the location fields.
#[derive(Debug, Clone, Copy)]
enum LocationInput {
    Search,
    CurrentLocation,
    Manual,
}

impl fmt::Display for LocationInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LocationInput::Search => "Search for a location",
            LocationInput::CurrentLocation => "Use current location",
            LocationInput::Manual => "Enter coordinates",
        })
    }
}

struct CategoryChoice(Category);

impl fmt::Display for CategoryChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.label())
    }
}

pub async fn run(config: &Config, locator: Arc<ManualLocation>) -> anyhow::Result<()> {
    let mut session = Session::new(config, locator.clone())?;

    println!("Here&Now: never miss a moment, place, or time.");
    if locator.get().is_none() {
        println!("No position known yet; use \"Set my position\" or pass --at lat,lon.");
    }

    loop {
        let action = match Select::new("What next?", Action::ALL.to_vec()).prompt() {
            Ok(action) => action,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read menu choice"),
        };

        tracing::debug!(%action, "Menu action selected");
        let outcome = match action {
            Action::AddAlarm => add_alarm(&mut session).await,
            Action::DeleteAlarm => delete_alarm(&session),
            Action::ListAlarms => {
                print!("{}", view::render_alarm_list(&session.alarms()));
                Ok(())
            }
            Action::UpdateLocation => update_location(&mut session).await,
            Action::ShowMap => {
                show_map(&session);
                Ok(())
            }
            Action::ShowInsights => {
                print_insights(&session);
                Ok(())
            }
            Action::SetPosition => set_position(&locator),
            Action::Quit => break,
        };

        match outcome {
            Ok(()) => {}
            Err(e) if is_cancel(&e) => println!("Cancelled."),
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

fn is_cancel(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<InquireError>(),
        Some(InquireError::OperationCanceled | InquireError::OperationInterrupted)
    )
}

async fn add_alarm(session: &mut Session) -> anyhow::Result<()> {
    let how = Select::new(
        "Location:",
        vec![LocationInput::Search, LocationInput::CurrentLocation, LocationInput::Manual],
    )
    .prompt()?;

    match how {
        LocationInput::Search => {
            let query = Text::new("Search for a location...").prompt()?;
            if session.search(&query).await == 0 {
                println!("No suggestions for '{query}'. Enter coordinates instead.");
                prompt_coordinates(session)?;
            } else {
                let names: Vec<String> =
                    session.form.suggestions().iter().map(|p| p.display_name.clone()).collect();
                let picked = Select::new("Pick a place:", names).raw_prompt()?;
                session.form.select(picked.index);
            }
        }
        LocationInput::CurrentLocation => {
            if let Err(e) = session.use_current_location().await {
                println!("Error getting location: {e}");
                prompt_coordinates(session)?;
            }
        }
        LocationInput::Manual => prompt_coordinates(session)?,
    }

    session.form.area_name = Text::new("Area/Location name:")
        .with_initial_value(&session.form.area_name)
        .prompt()?;

    let choices: Vec<CategoryChoice> = Category::all().iter().copied().map(CategoryChoice).collect();
    let default_index = Category::all().iter().position(|c| *c == Category::default()).unwrap_or(0);
    session.form.category = Select::new("Category:", choices)
        .with_starting_cursor(default_index)
        .prompt()?
        .0;

    session.form.message = Text::new("Message (optional):").prompt()?;

    match session.submit() {
        Ok(id) => {
            println!("Alarm added.");
            if let Some(alarm) = session.alarms().iter().find(|a| a.id == id) {
                print!("{}", view::render_alarm_list(std::slice::from_ref(alarm)));
            }
        }
        Err(e) => println!("Alarm not added: {e}"),
    }

    Ok(())
}

fn prompt_coordinates(session: &mut Session) -> anyhow::Result<()> {
    let latitude = CustomType::<f64>::new("Latitude:").with_error_message("Enter a number").prompt()?;
    let longitude = CustomType::<f64>::new("Longitude:").with_error_message("Enter a number").prompt()?;

    session.form.latitude = latitude.to_string();
    session.form.longitude = longitude.to_string();
    Ok(())
}

fn delete_alarm(session: &Session) -> anyhow::Result<()> {
    let alarms = session.alarms();
    if alarms.is_empty() {
        println!("{}", view::EMPTY_LIST_TEXT);
        return Ok(());
    }

    let labels: Vec<String> =
        alarms.iter().map(|a| format!("{} [{}]", a.name, a.category.label())).collect();
    let picked = Select::new("Delete which alarm?", labels).raw_prompt()?;

    if session.delete(&alarms[picked.index].id) {
        println!("Deleted.");
    }
    Ok(())
}

async fn update_location(session: &mut Session) -> anyhow::Result<()> {
    println!("Updating location...");
    match session.update_location().await {
        Ok(PositionUpdate::Applied) => {
            if let Some(at) = session.map().last_updated() {
                println!("Location updated at {}", at.with_timezone(&Local).format("%H:%M:%S"));
            }
            print!("{}", view::render_alarm_list(&session.alarms()));
            println!();
            print_insights(session);
        }
        Ok(PositionUpdate::Superseded) => println!("A newer position arrived; results discarded."),
        Err(e) => println!("Error getting location: {e}"),
    }
    Ok(())
}

fn show_map(session: &Session) {
    let markers = session.map().markers();
    if markers.is_empty() {
        println!("Nothing on the map yet.");
        return;
    }

    for marker in &markers {
        let tag = match marker.kind {
            MarkerKind::Alarm(_) => "pin",
            MarkerKind::CurrentLocation => "you",
        };
        println!(
            "[{tag}] {} ({}, {} m radius, {})",
            marker.title, marker.position, marker.radius_m, marker.color
        );
        for line in &marker.details {
            println!("      {line}");
        }
    }

    let centre = session.map().current_location().unwrap_or(markers[0].position);
    println!("Open map: {}", osm_url(centre, DEFAULT_ZOOM));
}

fn print_insights(session: &Session) {
    if session.map().current_location().is_none() {
        println!("Update your location to see insights.");
        return;
    }
    print!("{}", view::render_insights(&session.map().insights()));
}

fn set_position(locator: &ManualLocation) -> anyhow::Result<()> {
    let position = CustomType::<Coordinates>::new("Position (lat,lon):")
        .with_error_message("Enter coordinates as 'lat,lon', e.g. 12.9716,77.5946")
        .prompt()?;
    locator.set(position);
    println!("Position set to {position}.");
    Ok(())
}
