use anyhow::Result;
use calibridge_core::store::EventStore;
use dialoguer::Confirm;
use owo_colors::OwoColorize;

pub fn run(store: &mut EventStore, yes: bool) -> Result<()> {
    if store.is_empty() {
        println!("{}", "Nothing to clear".dimmed());
        return Ok(());
    }

    let total = store.len();

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete all {} {}?",
                total,
                if total == 1 { "event" } else { "events" }
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            return Ok(());
        }
    }

    let removed = store.clear();
    store.save()?;

    println!("{}", format!("Cleared {removed} events").red());

    Ok(())
}
