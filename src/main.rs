mod commands;
mod render;
mod utils;

use anyhow::{Context, Result};
use calibridge_core::config::CalibridgeConfig;
use calibridge_core::store::EventStore;
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "calibridge")]
#[command(about = "Manage calendar events and reminders, and exchange them as .ics files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all events, grouped by day
    List,
    New {
        name: String,

        /// Start date/time (e.g., "2025-03-20T15:00")
        #[arg(short, long)]
        start: String,

        #[command(flatten)]
        fields: EventFields,
    },
    Edit {
        id: u64,

        #[arg(short, long)]
        name: Option<String>,

        /// Start date/time (e.g., "2025-03-20T15:00")
        #[arg(short, long)]
        start: Option<String>,

        #[command(flatten)]
        fields: EventFields,

        /// Remove all reminders (applied before any --reminder)
        #[arg(long)]
        clear_reminders: bool,
    },
    Delete {
        id: u64,
    },
    Duplicate {
        id: u64,
    },
    /// Delete every event
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Import events from an .ics file
    Import {
        file: std::path::PathBuf,
    },
    /// Export all events to an .ics file
    Export {
        /// File name (".ics" is appended if missing)
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Show reminders that fire at a given minute
    Due {
        /// Date/time to check (defaults to now)
        #[arg(long)]
        at: Option<String>,
    },
    /// Show paths and create the config file if missing
    Config,
}

/// Optional event fields shared by `new` and `edit`.
#[derive(Args)]
pub struct EventFields {
    /// End date/time (defaults to the start for new events)
    #[arg(short, long)]
    pub end: Option<String>,

    #[arg(short, long)]
    pub location: Option<String>,

    #[arg(short, long)]
    pub description: Option<String>,

    /// IANA timezone name (e.g., "Europe/Berlin")
    #[arg(short, long)]
    pub timezone: Option<String>,

    /// Reminder before the start, as a token ("-PT15M") or label ("15 Min"). Repeatable.
    #[arg(short, long = "reminder")]
    pub reminders: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = CalibridgeConfig::load()?;
    debug!(?config, "Loaded config");

    match cli.command {
        Commands::Config => commands::config::run(&config),
        Commands::List => commands::list::run(&open_store(&config)?),
        Commands::New {
            name,
            start,
            fields,
        } => commands::new::run(&mut open_store(&config)?, &config, name, start, fields),
        Commands::Edit {
            id,
            name,
            start,
            fields,
            clear_reminders,
        } => commands::edit::run(
            &mut open_store(&config)?,
            id,
            name,
            start,
            fields,
            clear_reminders,
        ),
        Commands::Delete { id } => commands::delete::run(&mut open_store(&config)?, id),
        Commands::Duplicate { id } => commands::duplicate::run(&mut open_store(&config)?, id),
        Commands::Clear { yes } => commands::clear::run(&mut open_store(&config)?, yes),
        Commands::Import { file } => {
            commands::import::run(&mut open_store(&config)?, &config, &file).await
        }
        Commands::Export { name } => {
            commands::export::run(&open_store(&config)?, &config, name.as_deref()).await
        }
        Commands::Due { at } => commands::due::run(&open_store(&config)?, at.as_deref()),
    }
}

fn open_store(config: &CalibridgeConfig) -> Result<EventStore> {
    let path = config.data_path()?;
    EventStore::load(&path).with_context(|| format!("Could not load events from {}", path.display()))
}
