use anyhow::Result;
use calibridge_core::config::CalibridgeConfig;
use calibridge_core::event::NewEvent;
use calibridge_core::store::EventStore;
use owo_colors::OwoColorize;

use crate::EventFields;
use crate::utils::input::{optional_text, parse_datetime, parse_reminders, parse_timezone};

pub fn run(
    store: &mut EventStore,
    config: &CalibridgeConfig,
    name: String,
    start: String,
    fields: EventFields,
) -> Result<()> {
    let start = parse_datetime(&start)?;
    let end = match fields.end {
        Some(end) => parse_datetime(&end)?,
        None => start,
    };

    let mut details = NewEvent::new(name, start, end);
    details.location = fields.location.and_then(optional_text);
    details.description = fields.description.and_then(optional_text);
    details.timezone = match fields.timezone {
        Some(tz) => parse_timezone(&tz)?,
        None => config.default_timezone.clone(),
    };
    details.reminders = parse_reminders(&fields.reminders)?;

    let id = store.add(details)?;
    store.save()?;

    let event = store.get(id)?;
    println!("{}", format!("Created: {} (#{})", event, id).green());

    Ok(())
}
