//! Date and date-time values on the wire.
//!
//! Three shapes are recognised in DTSTART/DTEND values:
//! - `20250601` (DATE)
//! - `20250601T100000` (local or TZID-qualified DATE-TIME)
//! - `20250601T100000Z` (UTC DATE-TIME)
//!
//! Only the UTC form is converted. A local stamp is assumed to already be
//! wall-clock time in its stated zone and is copied through unchanged.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};

const DATE_FORMAT: &str = "%Y%m%d";
const LOCAL_FORMAT: &str = "%Y%m%dT%H%M%S";
const UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// A date or date-time token as it appeared on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireTime {
    Date(NaiveDate),
    Local(NaiveDateTime),
    Utc(NaiveDateTime),
}

impl WireTime {
    /// Find the first `YYYYMMDD[THHMMSS[Z]]` token in a property value.
    ///
    /// Returns `None` if there is no such token or its digits don't form a
    /// valid calendar date/time.
    pub fn find_in(value: &str) -> Option<Self> {
        let bytes = value.as_bytes();
        let start = (0..bytes.len()).find(|&i| digits_at(bytes, i, 8))?;
        let date = NaiveDate::parse_from_str(&value[start..start + 8], DATE_FORMAT).ok()?;

        let time_at = start + 8;
        if bytes.get(time_at) != Some(&b'T') || !digits_at(bytes, time_at + 1, 6) {
            return Some(WireTime::Date(date));
        }

        let time =
            NaiveTime::parse_from_str(&value[time_at + 1..time_at + 7], "%H%M%S").ok()?;
        let datetime = date.and_time(time);

        if bytes.get(time_at + 7) == Some(&b'Z') {
            Some(WireTime::Utc(datetime))
        } else {
            Some(WireTime::Local(datetime))
        }
    }

    /// Local wall-clock value at minute precision.
    ///
    /// UTC stamps are converted into `local`; the wall clock stored may
    /// therefore differ from the digits on the wire. Dates become midnight.
    pub fn to_local<Z: TimeZone>(self, local: &Z) -> NaiveDateTime {
        let datetime = match self {
            WireTime::Date(date) => date.and_time(NaiveTime::MIN),
            WireTime::Local(datetime) => datetime,
            WireTime::Utc(datetime) => Utc
                .from_utc_datetime(&datetime)
                .with_timezone(local)
                .naive_local(),
        };

        truncate_to_minute(datetime)
    }
}

fn digits_at(bytes: &[u8], at: usize, len: usize) -> bool {
    bytes
        .get(at..at + len)
        .is_some_and(|run| run.iter().all(u8::is_ascii_digit))
}

fn truncate_to_minute(dt: NaiveDateTime) -> NaiveDateTime {
    dt.with_second(0)
        .and_then(|dt| dt.with_nanosecond(0))
        .unwrap_or(dt)
}

/// `YYYYMMDDThhmmss`, for values qualified by a TZID parameter.
pub fn format_local(dt: &NaiveDateTime) -> String {
    dt.format(LOCAL_FORMAT).to_string()
}

/// `YYYYMMDDThhmmssZ`, for DTSTAMP.
pub fn format_utc(dt: &DateTime<Utc>) -> String {
    dt.format(UTC_FORMAT).to_string()
}
