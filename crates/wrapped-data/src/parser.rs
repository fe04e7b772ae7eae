//! Line-level event extraction for chat exports.
//!
//! An export line looks like `[D/M/YYYY, HH:MM:SS] Sender: Body`. System
//! notices share that shape but start their body with a left-to-right mark
//! (U+200E); the ones announcing a new member become [`JoinEvent`]s.

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

use wrapped_core::error::{Result, WrappedError};
use wrapped_core::models::{JoinEvent, Message};

/// Timestamp layout inside the leading brackets.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

/// Date part of [`TIMESTAMP_FORMAT`].
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Parse the bracketed export timestamp, e.g. `"01/01/2023, 10:00:00"`.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .map_err(|_| WrappedError::TimestampParse(s.to_string()))
}

/// Parse the date part of an export timestamp, e.g. `"1/1/2023"`.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|_| WrappedError::TimestampParse(s.to_string()))
}

/// One recognised transcript line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// A chat message. `sender` is the label as exported, not yet normalized.
    Message(Message),
    /// A member joined or was added.
    Join(JoinEvent),
}

/// Compiled patterns for classifying transcript lines.
#[derive(Debug, Clone)]
pub struct LineParser {
    message_re: Regex,
    join_re: Regex,
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LineParser {
    pub fn new() -> Self {
        let message_re = Regex::new(r"^\[(.*?)\] (.*?): (.*)").expect("regex is valid");
        let join_re = Regex::new(concat!(
            r"\[(?P<date>\d{1,2}/\d{1,2}/\d{4}), \d{2}:\d{2}:\d{2}\] (?P<name>.+?): \x{200E}",
            r"(?:.+ joined using this group's invite link",
            r"|You joined using this group's invite link",
            r"|.+ was added",
            r"|.+ added .+)",
        ))
        .expect("regex is valid");
        Self {
            message_re,
            join_re,
        }
    }

    /// Classify one line.
    ///
    /// Join notices are checked first and never double as messages. Returns
    /// `None` for anything that fits neither shape or carries a bad date.
    pub fn parse_line(&self, line: &str) -> Option<LineEvent> {
        let line = line.trim();

        if let Some(caps) = self.join_re.captures(line) {
            return parse_date(&caps["date"])
                .ok()
                .map(|date| LineEvent::Join(JoinEvent { date }));
        }

        let caps = self.message_re.captures(line)?;
        let timestamp = parse_timestamp(&caps[1]).ok()?;
        Some(LineEvent::Message(Message {
            timestamp,
            sender: caps[2].to_string(),
            text: caps[3].to_string(),
        }))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
