//! ICS export.
//!
//! Documents are built with the icalendar crate, then post-processed to fix
//! the header and add the default zone's VTIMEZONE.

use chrono::{DateTime, NaiveDateTime, Utc};
use icalendar::{Alarm, Calendar, Component, EventLike, Property, Trigger};
use std::collections::HashSet;
use tracing::debug;

use super::datetime::{format_local, format_utc};
use super::text::escape_text;
use crate::event::{DEFAULT_TIMEZONE, Event};

pub const PRODID: &str = "-//Calibridge//EN";

/// Definition of the default zone, written once per document that uses it.
const DEFAULT_VTIMEZONE: [&str; 9] = [
    "BEGIN:VTIMEZONE",
    "TZID:Asia/Kolkata",
    "BEGIN:STANDARD",
    "DTSTART:19000101T000000",
    "TZOFFSETFROM:+0530",
    "TZOFFSETTO:+0530",
    "TZNAME:IST",
    "END:STANDARD",
    "END:VTIMEZONE",
];

/// Generate a complete VCALENDAR document for `events`, stamped with `now`.
///
/// Every line ends with CRLF. An empty slice yields just the calendar
/// header and footer.
pub fn encode(events: &[Event], now: DateTime<Utc>) -> String {
    let dtstamp = format_utc(&now);
    let mut uids = UidGenerator::new(now);

    let mut cal = Calendar::new();
    for event in events {
        cal.push(build_event(event, &uids.next(), &dtstamp));
    }
    let cal = cal.done();

    let with_timezone = events.iter().any(|e| timezone_of(e) == DEFAULT_TIMEZONE);
    let ics = finish_document(&cal.to_string(), with_timezone);

    debug!(events = events.len(), octets = ics.len(), "Encoded calendar");

    ics
}

/// [`encode`] stamped with the current time.
pub fn encode_now(events: &[Event]) -> String {
    encode(events, Utc::now())
}

fn build_event(event: &Event, uid: &str, dtstamp: &str) -> icalendar::Event {
    let details = event.details();
    let tzid = timezone_of(event);

    let mut ics_event = icalendar::Event::new();
    ics_event.uid(uid);
    ics_event.add_property("DTSTAMP", dtstamp);
    add_local_datetime(&mut ics_event, "DTSTART", &details.datetime_start, tzid);
    add_local_datetime(&mut ics_event, "DTEND", &details.datetime_end, tzid);
    ics_event.summary(&escape_text(&details.name));

    // Empty optional text is omitted rather than written as an empty property
    if let Some(location) = details.location.as_deref().filter(|s| !s.is_empty()) {
        ics_event.location(&escape_text(location));
    }
    if let Some(description) = details.description.as_deref().filter(|s| !s.is_empty()) {
        ics_event.description(&escape_text(description));
    }

    for (n, token) in details.reminders.iter().enumerate() {
        ics_event.alarm(build_alarm(token, &format!("{uid}-alarm-{}", n + 1), dtstamp));
    }

    ics_event.done()
}

/// Wall-clock time qualified by the event's zone.
fn add_local_datetime(
    ics_event: &mut icalendar::Event,
    name: &str,
    time: &NaiveDateTime,
    tzid: &str,
) {
    let mut prop = Property::new(name, format_local(time));
    prop.add_parameter("TZID", tzid);
    ics_event.append_property(prop);
}

/// A display alarm whose TRIGGER is the stored token, written as is.
fn build_alarm(token: &str, uid: &str, dtstamp: &str) -> Alarm {
    let mut alarm = Alarm::display("Reminder", Trigger::before_start(chrono::Duration::zero()));
    alarm.append_property(Property::new("TRIGGER", token.trim()));
    alarm.add_property("UID", uid);
    alarm.add_property("DTSTAMP", dtstamp);
    alarm.done()
}

/// Rewrite the calendar header produced by icalendar and insert the
/// VTIMEZONE block ahead of the first component.
fn finish_document(rendered: &str, with_timezone: bool) -> String {
    let mut out = String::with_capacity(rendered.len() + 256);
    let mut in_header = false;

    for line in rendered.lines() {
        if line == "BEGIN:VCALENDAR" {
            push_line(&mut out, line);
            push_line(&mut out, "VERSION:2.0");
            push_line(&mut out, &format!("PRODID:{PRODID}"));
            push_line(&mut out, "CALSCALE:GREGORIAN");
            in_header = true;
            continue;
        }

        if in_header {
            if line.starts_with("BEGIN:") || line == "END:VCALENDAR" {
                in_header = false;
                if with_timezone {
                    DEFAULT_VTIMEZONE.iter().for_each(|l| push_line(&mut out, l));
                }
            } else if ["VERSION:", "PRODID:", "CALSCALE:"]
                .iter()
                .any(|p| line.starts_with(p))
            {
                continue;
            }
        }

        push_line(&mut out, line);
    }

    out
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push_str("\r\n");
}

fn timezone_of(event: &Event) -> &str {
    let tz = event.details().timezone.trim();
    if tz.is_empty() { DEFAULT_TIMEZONE } else { tz }
}

/// Wire UIDs: a millisecond timestamp in base 36 plus a random suffix.
///
/// Unrelated to `Event::id`. Unique within one generator.
struct UidGenerator {
    prefix: String,
    issued: HashSet<String>,
}

impl UidGenerator {
    fn new(now: DateTime<Utc>) -> Self {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
        UidGenerator {
            prefix: to_base36(millis),
            issued: HashSet::new(),
        }
    }

    fn next(&mut self) -> String {
        loop {
            let random = uuid::Uuid::new_v4().simple().to_string();
            let uid = format!("{}-{}@calibridge", self.prefix, &random[..12]);
            if self.issued.insert(uid.clone()) {
                return uid;
            }
        }
    }
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if n == 0 {
        return "0".to_string();
    }

    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
