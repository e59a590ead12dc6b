//! Parsing of command-line event fields.

use anyhow::{Result, anyhow};
use calibridge_core::reminder::ReminderDuration;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use chrono_tz::Tz;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse "YYYY-MM-DDTHH:MM" (a space or seconds are accepted too).
/// A bare date means midnight. Seconds are dropped.
pub fn parse_datetime(input: &str) -> Result<NaiveDateTime> {
    let input = input.trim();

    let parsed = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
        .ok_or_else(|| anyhow!("Could not parse date/time: \"{}\" (expected YYYY-MM-DDTHH:MM)", input))?;

    Ok(parsed.with_second(0).unwrap_or(parsed))
}

/// Turn reminder arguments into canonical tokens, dropping duplicates.
///
/// Each argument may be a token ("-PT15M", "-P1D") or a label ("15 Min", "3 Day(s)").
pub fn parse_reminders(inputs: &[String]) -> Result<Vec<String>> {
    let mut tokens: Vec<String> = Vec::new();

    for input in inputs {
        let duration = match ReminderDuration::from_label(input) {
            Some(d) => d,
            None => input.parse::<ReminderDuration>()?,
        };

        let token = duration.to_token();
        if !tokens.contains(&token) {
            tokens.push(token);
        }
    }

    Ok(tokens)
}

/// Append reminder arguments to stored tokens.
///
/// Stored tokens are kept as written, including ones outside the
/// minute/hour/day subset (e.g. `-P1W` from an import). Only the new
/// arguments are parsed and canonicalized.
pub fn merge_reminders(existing: &[String], inputs: &[String]) -> Result<Vec<String>> {
    let mut tokens = existing.to_vec();

    for token in parse_reminders(inputs)? {
        if !tokens.contains(&token) {
            tokens.push(token);
        }
    }

    Ok(tokens)
}

/// Check that `input` names a known IANA zone.
pub fn parse_timezone(input: &str) -> Result<String> {
    let name = input.trim();
    name.parse::<Tz>()
        .map_err(|_| anyhow!("Unknown timezone: \"{}\"", name))?;
    Ok(name.to_string())
}

/// Empty strings clear an optional text field.
pub fn optional_text(input: String) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}
