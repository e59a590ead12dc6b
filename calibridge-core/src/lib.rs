//! Core library for calibridge.
//!
//! - [`event`]: `Event` / `NewEvent` records
//! - [`reminder`]: reminder durations, labels and fire times
//! - [`ics`]: iCalendar import and export
//! - [`store`]: the JSON-backed event store
//! - [`config`]: user configuration

pub mod config;
pub mod error;
pub mod event;
pub mod ics;
pub mod reminder;
pub mod store;

pub use error::{CalibridgeError, CalibridgeResult};
pub use event::{Event, NewEvent};
