//! iCalendar (.ics) import and export.
//!
//! Handles the subset of RFC 5545 calibridge exchanges: VEVENTs with
//! summary, location, description, start/end and display alarms.

pub mod datetime;
mod generate;
mod io;
mod parse;
pub mod text;

pub use generate::{PRODID, encode, encode_now};
pub use io::{DEFAULT_EXPORT_NAME, export_file_name, read_ics_file, write_ics_file};
pub use parse::{IcsDecoder, decode};
