use anyhow::Result;
use calibridge_core::reminder::due_reminders;
use calibridge_core::store::EventStore;
use owo_colors::OwoColorize;

use crate::render::Render;
use crate::utils::input::parse_datetime;

pub fn run(store: &EventStore, at: Option<&str>) -> Result<()> {
    let now = match at {
        Some(at) => parse_datetime(at)?,
        None => chrono::Local::now().naive_local(),
    };

    let due = due_reminders(&store.snapshot(), now);

    if due.is_empty() {
        println!("{}", format!("No reminders at {}", now.format("%Y-%m-%d %H:%M")).dimmed());
        return Ok(());
    }

    for reminder in &due {
        println!("{}", reminder.render());
    }

    Ok(())
}
