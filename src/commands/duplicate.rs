use anyhow::Result;
use calibridge_core::store::EventStore;
use owo_colors::OwoColorize;

pub fn run(store: &mut EventStore, id: u64) -> Result<()> {
    let copy = store.duplicate(id)?;
    store.save()?;

    println!("{}", format!("Created: {} (#{})", store.get(copy)?, copy).green());

    Ok(())
}
