use anyhow::Result;
use calibridge_core::store::EventStore;
use owo_colors::OwoColorize;

use crate::render::{Render, format_date_label};

pub fn run(store: &EventStore) -> Result<()> {
    let events = store.events();

    if events.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    let today = chrono::Local::now().date_naive();
    let mut current_date = None;

    for event in events {
        let date = event.start().date();

        if current_date != Some(date) {
            if current_date.is_some() {
                println!();
            }
            println!("{}", format_date_label(date, today).bold());
            current_date = Some(date);
        }

        println!("{}", event.render());
    }

    Ok(())
}
