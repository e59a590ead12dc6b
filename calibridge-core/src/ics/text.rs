//! TEXT value escaping (RFC 5545 §3.3.11) and line unfolding.
//!
//! The icalendar builder writes property values as given, so exported text
//! is escaped here first. Folding on export is left to icalendar.

use icalendar::parser::unfold;

/// Escape a TEXT value: `\` `;` `,` and newlines.
///
/// CRLF and bare CR count as a single newline.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("\\n");
            }
            _ => out.push(c),
        }
    }

    out
}

/// Reverse [`escape_text`]. Accepts `\N` as well as `\n`.
///
/// Unknown escape sequences are kept as written.
pub fn unescape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') | Some('N') => out.push('\n'),
            Some(',') => out.push(','),
            Some(';') => out.push(';'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

/// Split raw content into logical lines, joining folded continuations.
///
/// CRLF, LF and bare CR all end a line. Line endings are normalized to CRLF
/// before [`unfold`] runs, so a fold works after any of them. Lines are
/// returned untrimmed.
pub fn unfold_lines(content: &str) -> Vec<String> {
    let normalized = content
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\n', "\r\n");

    unfold(&normalized).lines().map(str::to_string).collect()
}
