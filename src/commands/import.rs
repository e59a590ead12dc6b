use std::path::Path;

use anyhow::{Context, Result};
use calibridge_core::config::CalibridgeConfig;
use calibridge_core::ics::{IcsDecoder, read_ics_file};
use calibridge_core::store::{EventStore, ImportOutcome};
use owo_colors::OwoColorize;

pub async fn run(store: &mut EventStore, config: &CalibridgeConfig, file: &Path) -> Result<()> {
    let decoder = IcsDecoder::new(config.local_tz()?)
        .default_timezone(config.default_timezone.clone());

    // The store is only touched once the whole file has been decoded
    let decoded = read_ics_file(file, &decoder)
        .await
        .with_context(|| format!("Failed to import {}", file.display()))?;

    match store.import(decoded) {
        ImportOutcome::NothingFound => {
            println!("{}", "No events found.".dimmed());
        }
        outcome @ ImportOutcome::Imported(_) => {
            store.save()?;
            println!("{}", format!("Imported {} events!", outcome.count()).green());
        }
    }

    Ok(())
}
