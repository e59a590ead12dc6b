use anyhow::{Context, Result};
use calibridge_core::config::CalibridgeConfig;
use calibridge_core::ics::{export_file_name, write_ics_file};
use calibridge_core::store::EventStore;
use owo_colors::OwoColorize;

pub async fn run(store: &EventStore, config: &CalibridgeConfig, name: Option<&str>) -> Result<()> {
    if store.is_empty() {
        println!("{}", "No events to export.".dimmed());
        return Ok(());
    }

    let file_name = export_file_name(Some(name.unwrap_or(&config.export_name)));

    write_ics_file(&file_name, &store.snapshot())
        .await
        .with_context(|| format!("Failed to write {file_name}"))?;

    println!(
        "{}",
        format!("Exported {} events to {}", store.len(), file_name).green()
    );

    Ok(())
}
