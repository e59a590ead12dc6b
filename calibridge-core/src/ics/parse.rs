//! ICS import.
//!
//! A line-oriented reader rather than a strict RFC 5545 parser: files
//! exported by other applications are often partial or slightly malformed,
//! and one bad line must not cost the user the rest of their calendar.
//! Lines that can't be understood are skipped, VEVENTs without a start time
//! are dropped, and everything else is kept.

use chrono::{Duration, NaiveDateTime, TimeZone};
use tracing::debug;

use super::datetime::WireTime;
use super::text::{unescape_text, unfold_lines};
use crate::event::{DEFAULT_TIMEZONE, NewEvent, UNTITLED};

/// Decode every VEVENT in `text`, converting UTC times into `local`.
pub fn decode<Z: TimeZone>(text: &str, local: &Z) -> Vec<NewEvent> {
    IcsDecoder::new(local.clone()).decode(text)
}

/// Configurable ICS reader.
#[derive(Debug, Clone)]
pub struct IcsDecoder<Z: TimeZone> {
    local: Z,
    default_timezone: String,
}

impl<Z: TimeZone> IcsDecoder<Z> {
    pub fn new(local: Z) -> Self {
        IcsDecoder {
            local,
            default_timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }

    /// Zone recorded on events whose DTSTART/DTEND carry no TZID.
    pub fn default_timezone(mut self, tz: impl Into<String>) -> Self {
        self.default_timezone = tz.into();
        self
    }

    pub fn decode(&self, text: &str) -> Vec<NewEvent> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut events = Vec::new();
        let mut state = State::Outside;

        for (n, raw) in unfold_lines(text).iter().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            let Some(content) = ContentLine::tokenize(line) else {
                debug!(line = n + 1, "Skipping line without a colon");
                continue;
            };

            state = match state {
                State::Outside => self.outside(content),
                State::InEvent { event, nested } => {
                    self.in_event(event, nested, content, &mut events)
                }
            };
        }

        if matches!(state, State::InEvent { .. }) {
            debug!("Discarding VEVENT without END:VEVENT");
        }

        events
    }

    fn outside(&self, content: ContentLine<'_>) -> State {
        if content.kind == FieldKind::Begin && content.value_is("VEVENT") {
            State::InEvent {
                event: PartialEvent::default(),
                nested: Vec::new(),
            }
        } else {
            State::Outside
        }
    }

    fn in_event(
        &self,
        mut event: PartialEvent,
        mut nested: Vec<String>,
        content: ContentLine<'_>,
        events: &mut Vec<NewEvent>,
    ) -> State {
        match content.kind {
            FieldKind::Begin if content.value_is("VEVENT") => {
                debug!("Discarding VEVENT interrupted by another BEGIN:VEVENT");
                return State::InEvent {
                    event: PartialEvent::default(),
                    nested: Vec::new(),
                };
            }
            FieldKind::Begin => {
                nested.push(content.value.trim().to_ascii_uppercase());
            }
            FieldKind::End if content.value_is("VEVENT") => {
                match event.commit(&self.default_timezone) {
                    Some(committed) => events.push(committed),
                    None => debug!("Discarding VEVENT without a usable DTSTART"),
                }
                return State::Outside;
            }
            FieldKind::End => {
                nested.pop();
            }
            _ => match nested.last().map(String::as_str) {
                None => self.apply_field(&mut event, &content),
                Some("VALARM") if content.kind == FieldKind::Trigger => {
                    event.add_trigger(content.value);
                }
                Some(_) => {}
            },
        }

        State::InEvent { event, nested }
    }

    fn apply_field(&self, event: &mut PartialEvent, content: &ContentLine<'_>) {
        match content.kind {
            FieldKind::Summary => event.name = Some(unescape_text(content.value)),
            FieldKind::Description => event.description = Some(unescape_text(content.value)),
            FieldKind::Location => event.location = Some(unescape_text(content.value)),
            FieldKind::DtStart => {
                if let Some(tzid) = content.param("TZID") {
                    event.timezone = Some(tzid.to_string());
                }
                match WireTime::find_in(content.value) {
                    Some(time) => event.start = Some(time.to_local(&self.local)),
                    None => debug!(value = content.value, "Unparseable DTSTART"),
                }
            }
            FieldKind::DtEnd => {
                if let Some(tzid) = content.param("TZID") {
                    event.end_timezone = Some(tzid.to_string());
                }
                match WireTime::find_in(content.value) {
                    Some(time) => event.end = Some(time.to_local(&self.local)),
                    None => debug!(value = content.value, "Unparseable DTEND"),
                }
            }
            // A TRIGGER directly on the VEVENT is not an alarm
            FieldKind::Trigger | FieldKind::Other => {}
            FieldKind::Begin | FieldKind::End => {}
        }
    }
}

enum State {
    Outside,
    InEvent {
        event: PartialEvent,
        /// Components opened inside the VEVENT, innermost last
        nested: Vec<String>,
    },
}

/// Property names the decoder acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Begin,
    End,
    Summary,
    Description,
    Location,
    DtStart,
    DtEnd,
    Trigger,
    Other,
}

impl FieldKind {
    fn from_name(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "BEGIN" => FieldKind::Begin,
            "END" => FieldKind::End,
            "SUMMARY" => FieldKind::Summary,
            "DESCRIPTION" => FieldKind::Description,
            "LOCATION" => FieldKind::Location,
            "DTSTART" => FieldKind::DtStart,
            "DTEND" => FieldKind::DtEnd,
            "TRIGGER" => FieldKind::Trigger,
            _ => FieldKind::Other,
        }
    }
}

/// One logical line split into name, parameters and value.
#[derive(Debug)]
struct ContentLine<'a> {
    kind: FieldKind,
    params: Vec<(&'a str, &'a str)>,
    value: &'a str,
}

impl<'a> ContentLine<'a> {
    /// Split at the first colon outside a quoted parameter value.
    ///
    /// `DTSTART;TZID=Asia/Kolkata:20250601T100000` gives name `DTSTART`,
    /// params `[("TZID", "Asia/Kolkata")]` and value `20250601T100000`.
    fn tokenize(line: &'a str) -> Option<Self> {
        let colon = find_unquoted(line, ':')?;
        let (key, value) = (&line[..colon], &line[colon + 1..]);

        let mut parts = split_unquoted(key, ';').into_iter();
        let name = parts.next()?.trim();
        let params = parts
            .filter_map(|param| {
                let (k, v) = param.split_once('=')?;
                Some((k.trim(), v.trim().trim_matches('"')))
            })
            .collect();

        Some(ContentLine {
            kind: FieldKind::from_name(name),
            params,
            value,
        })
    }

    fn param(&self, key: &str) -> Option<&'a str> {
        self.params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| *v)
            .filter(|v| !v.is_empty())
    }

    fn value_is(&self, expected: &str) -> bool {
        self.value.trim().eq_ignore_ascii_case(expected)
    }
}

fn find_unquoted(s: &str, needle: char) -> Option<usize> {
    let mut in_quotes = false;
    for (i, c) in s.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c == needle && !in_quotes => return Some(i),
            _ => {}
        }
    }
    None
}

fn split_unquoted(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = s;
    while let Some(i) = find_unquoted(rest, sep) {
        parts.push(&rest[..i]);
        rest = &rest[i + sep.len_utf8()..];
    }
    parts.push(rest);
    parts
}

/// A VEVENT being read. Every field stays optional until `commit`.
#[derive(Debug, Default)]
struct PartialEvent {
    name: Option<String>,
    location: Option<String>,
    description: Option<String>,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    timezone: Option<String>,
    end_timezone: Option<String>,
    reminders: Vec<String>,
}

impl PartialEvent {
    /// Record the duration token in a TRIGGER value, once.
    fn add_trigger(&mut self, value: &str) {
        match find_duration_token(value) {
            Some(token) => {
                if !self.reminders.iter().any(|r| r == token) {
                    self.reminders.push(token.to_string());
                }
            }
            None => debug!(value, "TRIGGER without a duration"),
        }
    }

    /// Turn into a `NewEvent`, or `None` if there is no start time.
    ///
    /// A missing end defaults to one hour after the start.
    fn commit(self, default_timezone: &str) -> Option<NewEvent> {
        let start = self.start?;
        let end = self.end.unwrap_or(start + Duration::hours(1));

        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| UNTITLED.to_string());

        let timezone = self
            .timezone
            .or(self.end_timezone)
            .unwrap_or_else(|| default_timezone.to_string());

        Some(NewEvent {
            name,
            location: self.location.filter(|s| !s.is_empty()),
            description: self.description.filter(|s| !s.is_empty()),
            datetime_start: start,
            datetime_end: end,
            timezone,
            reminders: self.reminders,
        })
    }
}

/// First ISO 8601 duration in a TRIGGER value, e.g. `-PT15M` or `P1W`.
///
/// The `P` must start a word and be followed by a digit, or by `T` and a
/// digit. The token runs over digits and the designators `DTWHMS` and must
/// end in a designator.
fn find_duration_token(value: &str) -> Option<&str> {
    let bytes = value.as_bytes();
    for (i, _) in value.match_indices('P') {
        if i > 0 && bytes[i - 1].is_ascii_alphanumeric() {
            continue;
        }

        let rest = &bytes[i + 1..];
        let leads_with_number = match rest {
            [d, ..] if d.is_ascii_digit() => true,
            [b'T', d, ..] if d.is_ascii_digit() => true,
            _ => false,
        };
        if !leads_with_number {
            continue;
        }

        let len = rest
            .iter()
            .take_while(|&&b| b.is_ascii_digit() || b"DTWHMS".contains(&b))
            .count();
        if rest[len - 1].is_ascii_digit() {
            continue;
        }

        let start = if i > 0 && bytes[i - 1] == b'-' { i - 1 } else { i };
        return Some(&value[start..i + 1 + len]);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use chrono_tz::Tz;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    fn kolkata() -> Tz {
        "Asia/Kolkata".parse().unwrap()
    }

    #[test]
    fn test_decode_basic_event() {
        let ics = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
BEGIN:VEVENT\r\n\
UID:abc\r\n\
DTSTART;TZID=Europe/Berlin:20250601T100000\r\n\
DTEND;TZID=Europe/Berlin:20250601T113000\r\n\
SUMMARY:Planning\\, Q3\r\n\
LOCATION:Room 4\r\n\
DESCRIPTION:Bring notes\\nand coffee\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

        let events = decode(ics, &kolkata());
        assert_eq!(events.len(), 1);

        let event = &events[0];
        assert_eq!(event.name, "Planning, Q3");
        assert_eq!(event.location.as_deref(), Some("Room 4"));
        assert_eq!(event.description.as_deref(), Some("Bring notes\nand coffee"));
        assert_eq!(event.datetime_start, at(2025, 6, 1, 10, 0));
        assert_eq!(event.datetime_end, at(2025, 6, 1, 11, 30));
        assert_eq!(event.timezone, "Europe/Berlin");
        assert!(event.reminders.is_empty());
    }

    #[test]
    fn test_decode_missing_dtend_defaults_to_one_hour() {
        let ics = "BEGIN:VEVENT\nDTSTART:20250601T100000\nEND:VEVENT\n";
        let events = decode(ics, &Utc);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].datetime_start, at(2025, 6, 1, 10, 0));
        assert_eq!(events[0].datetime_end, at(2025, 6, 1, 11, 0));
        assert_eq!(events[0].name, "Untitled");
        assert_eq!(events[0].timezone, "Asia/Kolkata");
    }

    #[test]
    fn test_decode_discards_event_without_start() {
        let ics = "BEGIN:VEVENT\nSUMMARY:No start\nDTEND:20250601T100000\nEND:VEVENT\n\
BEGIN:VEVENT\nSUMMARY:Garbled start\nDTSTART:soon\nEND:VEVENT\n\
BEGIN:VEVENT\nSUMMARY:Kept\nDTSTART:20250602\nEND:VEVENT\n";

        let events = decode(ics, &Utc);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "Kept");
        assert_eq!(events[0].datetime_start, at(2025, 6, 2, 0, 0));
    }

    #[test]
    fn test_decode_document_without_vevents_is_empty() {
        assert!(decode("", &Utc).is_empty());
        assert!(decode("hello world\nthis is not a calendar", &Utc).is_empty());
        assert!(decode("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nEND:VCALENDAR\r\n", &Utc).is_empty());
    }

    #[test]
    fn test_decode_deduplicates_triggers() {
        let ics = "BEGIN:VEVENT\r\n\
DTSTART:20250601T100000\r\n\
BEGIN:VALARM\r\nACTION:DISPLAY\r\nTRIGGER:-PT15M\r\nEND:VALARM\r\n\
BEGIN:VALARM\r\nACTION:DISPLAY\r\nTRIGGER;RELATED=START:-PT15M\r\nEND:VALARM\r\n\
BEGIN:VALARM\r\nACTION:DISPLAY\r\nTRIGGER:-P1D\r\nEND:VALARM\r\n\
END:VEVENT\r\n";

        let events = decode(ics, &Utc);
        assert_eq!(events[0].reminders, vec!["-PT15M", "-P1D"]);
    }

    #[test]
    fn test_decode_ignores_triggers_without_a_duration() {
        let ics = "BEGIN:VEVENT\r\n\
DTSTART:20250601T100000\r\n\
BEGIN:VALARM\r\nTRIGGER:SPAM\r\nEND:VALARM\r\n\
BEGIN:VALARM\r\nTRIGGER;VALUE=DATE-TIME:20250601T093000Z\r\nEND:VALARM\r\n\
BEGIN:VALARM\r\nTRIGGER:-PT10M\r\nEND:VALARM\r\n\
END:VEVENT\r\n";

        let events = decode(ics, &Utc);
        assert_eq!(
            events[0].reminders,
            vec!["-PT10M"],
            "junk and absolute triggers are not reminders"
        );
    }

    #[test]
    fn test_decode_alarm_fields_do_not_clobber_event() {
        let ics = "BEGIN:VEVENT\r\n\
DTSTART:20250601T100000\r\n\
DESCRIPTION:The real description\r\n\
BEGIN:VALARM\r\nACTION:DISPLAY\r\nDESCRIPTION:Reminder\r\nTRIGGER:-PT5M\r\nEND:VALARM\r\n\
END:VEVENT\r\n";

        let events = decode(ics, &Utc);
        assert_eq!(events[0].description.as_deref(), Some("The real description"));
        assert_eq!(events[0].reminders, vec!["-PT5M"]);
    }

    #[test]
    fn test_decode_ignores_vtimezone_and_unknown_fields() {
        let ics = "BEGIN:VCALENDAR\r\n\
BEGIN:VTIMEZONE\r\nTZID:Asia/Kolkata\r\nBEGIN:STANDARD\r\nDTSTART:19000101T000000\r\nEND:STANDARD\r\nEND:VTIMEZONE\r\n\
BEGIN:VEVENT\r\n\
X-CUSTOM;FOO=bar:whatever\r\n\
DTSTART:20250601T100000\r\n\
RRULE:FREQ=WEEKLY\r\n\
this line has no colon\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

        let events = decode(ics, &Utc);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].datetime_start, at(2025, 6, 1, 10, 0));
    }

    #[test]
    fn test_decode_unfolds_before_parsing() {
        let folded = "BEGIN:VEVENT\r\nDTSTART:20250601T100000\r\nSUMMARY:Quarterly plan\r\n ning review\r\nEND:VEVENT\r\n";
        let unfolded = "BEGIN:VEVENT\r\nDTSTART:20250601T100000\r\nSUMMARY:Quarterly planning review\r\nEND:VEVENT\r\n";

        assert_eq!(decode(folded, &Utc), decode(unfolded, &Utc));
        assert_eq!(decode(folded, &Utc)[0].name, "Quarterly planning review");
    }

    #[test]
    fn test_decode_utc_times_are_converted_to_local() {
        let ics = "BEGIN:VEVENT\nDTSTART:20250601T100000Z\nDTEND:20250601T110000Z\nEND:VEVENT";
        let events = decode(ics, &kolkata());

        assert_eq!(events[0].datetime_start, at(2025, 6, 1, 15, 30));
        assert_eq!(events[0].datetime_end, at(2025, 6, 1, 16, 30));
    }

    #[test]
    fn test_decode_lowercase_names_and_quoted_tzid() {
        let ics = "begin:vevent\ndtstart;tzid=\"America/New_York\":20250601T100000\nsummary:Lower\nend:vevent";
        let events = decode(ics, &Utc);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "Lower");
        assert_eq!(events[0].timezone, "America/New_York");
    }

    #[test]
    fn test_decode_unterminated_event_is_dropped() {
        let ics = "BEGIN:VEVENT\nDTSTART:20250601T100000\nSUMMARY:First\n\
BEGIN:VEVENT\nDTSTART:20250602T100000\nSUMMARY:Second\nEND:VEVENT\n\
BEGIN:VEVENT\nDTSTART:20250603T100000\nSUMMARY:Third";

        let events = decode(ics, &Utc);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "Second");
    }

    #[test]
    fn test_decoder_default_timezone() {
        let ics = "BEGIN:VEVENT\nDTSTART:20250601T100000\nEND:VEVENT";
        let events = IcsDecoder::new(Utc).default_timezone("UTC").decode(ics);
        assert_eq!(events[0].timezone, "UTC");
    }

    #[test]
    fn test_dtend_tzid_used_when_dtstart_has_none() {
        let ics = "BEGIN:VEVENT\nDTSTART:20250601T100000\nDTEND;TZID=Europe/Paris:20250601T110000\nEND:VEVENT";
        assert_eq!(decode(ics, &Utc)[0].timezone, "Europe/Paris");
    }

    #[test]
    fn test_tokenize_splits_on_first_colon_only() {
        let content = ContentLine::tokenize("DESCRIPTION:Call at 10:30: dial in").unwrap();
        assert_eq!(content.kind, FieldKind::Description);
        assert_eq!(content.value, "Call at 10:30: dial in");

        let content =
            ContentLine::tokenize("DTSTART;VALUE=DATE-TIME;TZID=\"GMT+5:30\":20250601T100000").unwrap();
        assert_eq!(content.kind, FieldKind::DtStart);
        assert_eq!(content.param("tzid"), Some("GMT+5:30"));
        assert_eq!(content.value, "20250601T100000");

        assert!(ContentLine::tokenize("no colon here").is_none());
    }

    #[test]
    fn test_find_duration_token() {
        assert_eq!(find_duration_token("-PT15M"), Some("-PT15M"));
        assert_eq!(find_duration_token("PT10M"), Some("PT10M"));
        assert_eq!(find_duration_token("-P1W"), Some("-P1W"));
        assert_eq!(find_duration_token("20250601T090000Z"), None);
        assert_eq!(find_duration_token("P"), None);
        assert_eq!(find_duration_token("SPAM"), None, "P inside a word");
        assert_eq!(find_duration_token("PAM"), None, "P must lead with a number");
        assert_eq!(find_duration_token("-P15"), None, "no designator");
        assert_eq!(
            find_duration_token("RELATED=START;-PT1H30M"),
            Some("-PT1H30M")
        );
    }
}
