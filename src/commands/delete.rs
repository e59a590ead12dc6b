use anyhow::Result;
use calibridge_core::store::EventStore;
use owo_colors::OwoColorize;

pub fn run(store: &mut EventStore, id: u64) -> Result<()> {
    let event = store.delete(id)?;
    store.save()?;

    println!("{}", format!("Deleted: {event}").red());

    Ok(())
}
