//! Reading and writing .ics files.
//!
//! The file read is the only fallible step of an import. Decoding happens
//! after the whole file is in memory, so callers either get every event the
//! file contains or an error and nothing at all.

use chrono::TimeZone;
use std::path::Path;
use tracing::info;

use super::{IcsDecoder, encode_now};
use crate::error::CalibridgeResult;
use crate::event::{Event, NewEvent};

pub const DEFAULT_EXPORT_NAME: &str = "Calibridge_Export";

/// Read an .ics file and decode it with `decoder`.
///
/// Invalid UTF-8 is replaced rather than rejected.
pub async fn read_ics_file<Z: TimeZone>(
    path: impl AsRef<Path>,
    decoder: &IcsDecoder<Z>,
) -> CalibridgeResult<Vec<NewEvent>> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await?;
    let text = String::from_utf8_lossy(&bytes);

    let events = decoder.decode(&text);
    info!(path = %path.display(), events = events.len(), "Decoded ICS file");

    Ok(events)
}

/// Encode `events` and write them to `path`.
pub async fn write_ics_file(path: impl AsRef<Path>, events: &[Event]) -> CalibridgeResult<()> {
    let path = path.as_ref();
    tokio::fs::write(path, encode_now(events)).await?;
    info!(path = %path.display(), events = events.len(), "Wrote ICS file");

    Ok(())
}

/// File name for an export: the trimmed input (or the default name) with
/// `.ics` appended unless it already ends in it.
pub fn export_file_name(input: Option<&str>) -> String {
    let name = input
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_EXPORT_NAME);

    if name.to_ascii_lowercase().ends_with(".ics") {
        name.to_string()
    } else {
        format!("{name}.ics")
    }
}
