//! Terminal rendering for calibridge types.
//!
//! Extension traits that add colored output to calibridge-core types using
//! owo_colors.

use calibridge_core::event::Event;
use calibridge_core::reminder::{DueReminder, reminder_label};
use chrono::{NaiveDate, NaiveDateTime};
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for Event {
    fn render(&self) -> String {
        let details = self.details();
        let id = format!("#{}", self.id);
        let mut line = format!(
            "  {} {} {}",
            format_time_range(self.start(), self.end()),
            self.name(),
            id.dimmed()
        );

        if let Some(location) = &details.location {
            line.push_str(&format!(" {}", format!("@ {location}").cyan()));
        }

        if !details.reminders.is_empty() {
            let labels: Vec<String> = details.reminders.iter().map(|t| reminder_label(t)).collect();
            line.push_str(&format!(" {}", format!("⏰ {}", labels.join(", ")).yellow()));
        }

        line
    }
}

impl Render for DueReminder {
    fn render(&self) -> String {
        format!(
            "  {} {} {}",
            self.label().yellow(),
            self.event_name,
            format!("(starts {})", self.starts_at.format("%a %b %-d %H:%M")).dimmed()
        )
    }
}

/// Human-readable day label (e.g. "Today", "Tomorrow", "Wed Feb 25").
pub fn format_date_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a %b %-d").to_string(),
    }
}

/// "09:00-10:30", with the end date shown when the event spans days.
fn format_time_range(start: NaiveDateTime, end: NaiveDateTime) -> String {
    if start.date() == end.date() {
        format!("{}-{}", start.format("%H:%M"), end.format("%H:%M"))
    } else {
        format!("{}-{}", start.format("%H:%M"), end.format("%b %-d %H:%M"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, d).unwrap()
    }

    #[test]
    fn test_format_date_label() {
        assert_eq!(format_date_label(day(24), day(24)), "Today");
        assert_eq!(format_date_label(day(25), day(24)), "Tomorrow");
        assert_eq!(format_date_label(day(25), day(20)), "Wed Feb 25");
        assert_eq!(format_date_label(day(23), day(24)), "Mon Feb 23");
    }

    #[test]
    fn test_format_time_range() {
        let start = day(24).and_hms_opt(9, 0, 0).unwrap();
        assert_eq!(
            format_time_range(start, day(24).and_hms_opt(10, 30, 0).unwrap()),
            "09:00-10:30"
        );
        assert_eq!(
            format_time_range(start, day(25).and_hms_opt(1, 0, 0).unwrap()),
            "09:00-Feb 25 01:00",
            "multi-day events show the end date"
        );
    }
}
