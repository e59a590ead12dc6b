//! Calendar event types.
//!
//! `Event` is what the store holds. `NewEvent` is the same record before the
//! store has assigned it an id: the ICS decoder produces these, and the CLI
//! builds them from user input.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::reminder::reminder_offset;

/// Zone assumed for events that don't carry one.
pub const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";

/// Name given to decoded events without a SUMMARY.
pub const UNTITLED: &str = "Untitled";

/// A stored calendar event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Store-assigned identifier (never written to .ics files)
    pub id: u64,
    #[serde(flatten)]
    pub details: NewEvent,
}

/// Event data without a store id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Wall-clock start, interpreted in `timezone`
    pub datetime_start: NaiveDateTime,
    /// Wall-clock end, interpreted in `timezone`
    pub datetime_end: NaiveDateTime,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Duration tokens such as `-PT15M` or `-P1D`
    #[serde(default)]
    pub reminders: Vec<String>,
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

impl NewEvent {
    /// A one-off event with no location, description or reminders.
    pub fn new(name: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        NewEvent {
            name: name.into(),
            location: None,
            description: None,
            datetime_start: start,
            datetime_end: end,
            timezone: default_timezone(),
            reminders: Vec::new(),
        }
    }

    pub fn with_id(self, id: u64) -> Event {
        Event { id, details: self }
    }

    pub fn duration(&self) -> Duration {
        self.datetime_end - self.datetime_start
    }

    /// When each reminder fires, as (token, wall-clock time).
    ///
    /// Tokens that aren't valid ISO 8601 durations, or whose offset falls
    /// outside the representable date range, are left out.
    pub fn reminder_fire_times(&self) -> Vec<(String, NaiveDateTime)> {
        self.reminders
            .iter()
            .filter_map(|token| {
                let offset = reminder_offset(token)?;
                let fires_at = self.datetime_start.checked_sub_signed(offset)?;
                Some((token.clone(), fires_at))
            })
            .collect()
    }
}

impl Event {
    pub fn details(&self) -> &NewEvent {
        &self.details
    }

    pub fn name(&self) -> &str {
        &self.details.name
    }

    pub fn start(&self) -> NaiveDateTime {
        self.details.datetime_start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.details.datetime_end
    }

    pub fn duration(&self) -> Duration {
        self.details.duration()
    }

    pub fn reminder_fire_times(&self) -> Vec<(String, NaiveDateTime)> {
        self.details.reminder_fire_times()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.details.name)
    }
}
