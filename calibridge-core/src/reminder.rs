//! Reminder durations.
//!
//! A reminder is stored on an event as an ISO 8601 duration token relative to
//! the event start (`-PT15M` fires fifteen minutes before). The same token is
//! written verbatim as the `TRIGGER` of a VALARM.
//!
//! Only whole minutes, hours and days have a human label; anything else the
//! decoder picked up from a foreign file is shown as "Custom Alarm" but still
//! fires on time through [`reminder_offset`].

use chrono::{Duration, NaiveDateTime, Timelike};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::CalibridgeError;
use crate::event::Event;

/// Unit of a [`ReminderDuration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DurationUnit {
    Minutes,
    Hours,
    Days,
}

/// How long before an event's start a reminder fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ReminderDuration {
    pub amount: u32,
    pub unit: DurationUnit,
}

/// Quick-pick reminders, in display order.
pub const PRESETS: [ReminderDuration; 7] = [
    ReminderDuration::minutes(5),
    ReminderDuration::minutes(15),
    ReminderDuration::minutes(30),
    ReminderDuration::hours(1),
    ReminderDuration::hours(2),
    ReminderDuration::days(1),
    ReminderDuration::days(2),
];

const PRESET_LABELS: [(&str, &str); 7] = [
    ("-PT5M", "5 Min"),
    ("-PT15M", "15 Min"),
    ("-PT30M", "30 Min"),
    ("-PT1H", "1 Hour"),
    ("-PT2H", "2 Hours"),
    ("-P1D", "1 Day"),
    ("-P2D", "2 Days"),
];

const CUSTOM_LABEL: &str = "Custom Alarm";

impl ReminderDuration {
    pub const fn minutes(amount: u32) -> Self {
        ReminderDuration {
            amount,
            unit: DurationUnit::Minutes,
        }
    }

    pub const fn hours(amount: u32) -> Self {
        ReminderDuration {
            amount,
            unit: DurationUnit::Hours,
        }
    }

    pub const fn days(amount: u32) -> Self {
        ReminderDuration {
            amount,
            unit: DurationUnit::Days,
        }
    }

    /// Parse `-PT<n>M`, `-PT<n>H`, `-P<n>H` or `-P<n>D`.
    pub fn from_token(token: &str) -> Option<Self> {
        let rest = token.trim().strip_prefix("-P")?;
        let (rest, timed) = match rest.strip_prefix('T') {
            Some(rest) => (rest, true),
            None => (rest, false),
        };

        let unit = match (timed, rest.chars().last()?) {
            (true, 'M') => DurationUnit::Minutes,
            (_, 'H') => DurationUnit::Hours,
            (false, 'D') => DurationUnit::Days,
            _ => return None,
        };

        let digits = &rest[..rest.len() - 1];
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        let amount: u32 = digits.parse().ok()?;
        if amount == 0 {
            return None;
        }

        Some(ReminderDuration { amount, unit })
    }

    /// Inverse of [`label`](Self::label).
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();

        if let Some((token, _)) = PRESET_LABELS.iter().find(|(_, l)| *l == label) {
            return Self::from_token(token);
        }

        let (amount, unit) = label.split_once(' ')?;
        let amount: u32 = amount.parse().ok().filter(|n| *n > 0)?;
        match unit {
            "Day(s)" => Some(Self::days(amount)),
            "Hour(s)" => Some(Self::hours(amount)),
            "Min(s)" => Some(Self::minutes(amount)),
            _ => None,
        }
    }

    pub fn to_token(&self) -> String {
        match self.unit {
            DurationUnit::Minutes => format!("-PT{}M", self.amount),
            DurationUnit::Hours => format!("-PT{}H", self.amount),
            DurationUnit::Days => format!("-P{}D", self.amount),
        }
    }

    /// Human label, e.g. "15 Min" or "3 Day(s)".
    pub fn label(&self) -> String {
        let token = self.to_token();
        if let Some((_, label)) = PRESET_LABELS.iter().find(|(t, _)| *t == token) {
            return label.to_string();
        }

        let unit = match self.unit {
            DurationUnit::Minutes => "Min(s)",
            DurationUnit::Hours => "Hour(s)",
            DurationUnit::Days => "Day(s)",
        };
        format!("{} {}", self.amount, unit)
    }

    pub fn to_duration(&self) -> Duration {
        let amount = i64::from(self.amount);
        match self.unit {
            DurationUnit::Minutes => Duration::minutes(amount),
            DurationUnit::Hours => Duration::hours(amount),
            DurationUnit::Days => Duration::days(amount),
        }
    }
}

impl fmt::Display for ReminderDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_token())
    }
}

impl FromStr for ReminderDuration {
    type Err = CalibridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s).ok_or_else(|| CalibridgeError::InvalidReminder(s.to_string()))
    }
}

/// Label for any stored token.
pub fn reminder_label(token: &str) -> String {
    ReminderDuration::from_token(token)
        .map(|d| d.label())
        .unwrap_or_else(|| CUSTOM_LABEL.to_string())
}

/// Offset before the event start for any ISO 8601 duration token.
///
/// Negative tokens (`-PT30M`) give a positive offset. Unsigned tokens fire
/// after the start and give a negative one.
pub fn reminder_offset(token: &str) -> Option<Duration> {
    let token = token.trim();
    let is_before = token.starts_with('-');
    let duration_str = token.trim_start_matches(['-', '+']);

    let duration = iso8601::duration(duration_str).ok()?;
    let std_duration: std::time::Duration = duration.into();
    let offset = Duration::from_std(std_duration).ok()?;

    Some(if is_before { offset } else { -offset })
}

/// A reminder that fires at a given minute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DueReminder {
    pub event_id: u64,
    pub event_name: String,
    pub token: String,
    pub fires_at: NaiveDateTime,
    pub starts_at: NaiveDateTime,
}

impl DueReminder {
    pub fn label(&self) -> String {
        reminder_label(&self.token)
    }
}

/// Reminders whose fire time falls within the same minute as `now`.
pub fn due_reminders(events: &[Event], now: NaiveDateTime) -> Vec<DueReminder> {
    let minute = truncate_to_minute(now);

    events
        .iter()
        .flat_map(|event| {
            event
                .reminder_fire_times()
                .into_iter()
                .filter(move |(_, fires_at)| truncate_to_minute(*fires_at) == minute)
                .map(move |(token, fires_at)| DueReminder {
                    event_id: event.id,
                    event_name: event.details.name.clone(),
                    token,
                    fires_at,
                    starts_at: event.details.datetime_start,
                })
        })
        .collect()
}

fn truncate_to_minute(dt: NaiveDateTime) -> NaiveDateTime {
    dt.with_second(0)
        .and_then(|dt| dt.with_nanosecond(0))
        .unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::NewEvent;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_from_token_accepts_day_hour_minute_subset() {
        assert_eq!(
            ReminderDuration::from_token("-PT15M"),
            Some(ReminderDuration::minutes(15))
        );
        assert_eq!(
            ReminderDuration::from_token("-PT2H"),
            Some(ReminderDuration::hours(2))
        );
        assert_eq!(
            ReminderDuration::from_token("-P2H"),
            Some(ReminderDuration::hours(2))
        );
        assert_eq!(
            ReminderDuration::from_token("-P3D"),
            Some(ReminderDuration::days(3))
        );
    }

    #[test]
    fn test_from_token_rejects_everything_else() {
        for token in ["PT15M", "-PT", "-P1W", "-PT1H30M", "-PT0M", "-PTxM", "-P1M", "-PT1D", ""] {
            assert_eq!(
                ReminderDuration::from_token(token),
                None,
                "{token:?} should not parse"
            );
        }
    }

    #[test]
    fn test_token_is_canonical() {
        let d = ReminderDuration::from_token("-P2H").unwrap();
        assert_eq!(d.to_token(), "-PT2H");
        assert_eq!(ReminderDuration::days(1).to_string(), "-P1D");
    }

    #[test]
    fn test_labels() {
        assert_eq!(reminder_label("-PT5M"), "5 Min");
        assert_eq!(reminder_label("-PT2H"), "2 Hours");
        assert_eq!(reminder_label("-P1D"), "1 Day");
        assert_eq!(reminder_label("-PT45M"), "45 Min(s)");
        assert_eq!(reminder_label("-PT3H"), "3 Hour(s)");
        assert_eq!(reminder_label("-P5D"), "5 Day(s)");
        assert_eq!(reminder_label("-P1W"), "Custom Alarm");
    }

    #[test]
    fn test_label_converts_back_to_token() {
        for d in PRESETS {
            assert_eq!(ReminderDuration::from_label(&d.label()), Some(d));
        }
        assert_eq!(
            ReminderDuration::from_label("45 Min(s)"),
            Some(ReminderDuration::minutes(45))
        );
        assert_eq!(ReminderDuration::from_label("Custom Alarm"), None);
    }

    #[test]
    fn test_from_str_error() {
        let err = "-P1W".parse::<ReminderDuration>().unwrap_err();
        assert!(matches!(err, CalibridgeError::InvalidReminder(t) if t == "-P1W"));
    }

    #[test]
    fn test_reminder_offset_handles_full_iso_durations() {
        assert_eq!(reminder_offset("-PT15M"), Some(Duration::minutes(15)));
        assert_eq!(reminder_offset("-P1D"), Some(Duration::days(1)));
        assert_eq!(reminder_offset("-PT1H30M"), Some(Duration::minutes(90)));
        assert_eq!(reminder_offset("-P1W"), Some(Duration::weeks(1)));
        assert_eq!(reminder_offset("PT10M"), Some(Duration::minutes(-10)));
        assert_eq!(reminder_offset("soon"), None);
    }

    #[test]
    fn test_due_reminders_matches_minute() {
        let mut details = NewEvent::new("Standup", at(9, 0, 0), at(9, 15, 0));
        details.reminders = vec!["-PT5M".to_string(), "-PT15M".to_string()];
        let events = vec![details.with_id(1)];

        let due = due_reminders(&events, at(8, 55, 42));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].token, "-PT5M");
        assert_eq!(due[0].event_name, "Standup");
        assert_eq!(due[0].label(), "5 Min");

        assert!(due_reminders(&events, at(8, 56, 0)).is_empty());
    }
}
