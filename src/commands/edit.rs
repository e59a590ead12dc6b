use anyhow::Result;
use calibridge_core::store::EventStore;
use owo_colors::OwoColorize;

use crate::EventFields;
use crate::utils::input::{merge_reminders, optional_text, parse_datetime, parse_timezone};

/// Apply the given fields to an existing event. Unset fields keep their value.
pub fn run(
    store: &mut EventStore,
    id: u64,
    name: Option<String>,
    start: Option<String>,
    fields: EventFields,
    clear_reminders: bool,
) -> Result<()> {
    let mut details = store.get(id)?.details().clone();

    if let Some(name) = name {
        details.name = name;
    }
    if let Some(start) = start {
        // Keep the duration when only the start moves
        let duration = details.duration();
        details.datetime_start = parse_datetime(&start)?;
        details.datetime_end = details.datetime_start + duration;
    }
    if let Some(end) = fields.end {
        details.datetime_end = parse_datetime(&end)?;
    }
    if let Some(location) = fields.location {
        details.location = optional_text(location);
    }
    if let Some(description) = fields.description {
        details.description = optional_text(description);
    }
    if let Some(tz) = fields.timezone {
        details.timezone = parse_timezone(&tz)?;
    }

    if clear_reminders {
        details.reminders.clear();
    }
    if !fields.reminders.is_empty() {
        details.reminders = merge_reminders(&details.reminders, &fields.reminders)?;
    }

    store.update(id, details)?;
    store.save()?;

    println!("{}", format!("Updated: {}", store.get(id)?).yellow());

    Ok(())
}
