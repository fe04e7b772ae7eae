//! Transcript loading.
//!
//! Reads an exported chat once, line by line, routing messages into an
//! [`Aggregator`] and collecting join events up to a cutoff date.

use std::io::BufRead;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use wrapped_core::error::{Result, WrappedError};
use wrapped_core::models::JoinEvent;
use wrapped_core::normalizer::AliasTable;
use wrapped_core::settings::Settings;
use wrapped_core::tokenizer::Tokenizer;

use crate::aggregator::Aggregator;
use crate::parser::{LineEvent, LineParser};

/// Last join date counted when none is configured.
pub fn default_cutoff() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 1).expect("date is valid")
}

// ── ReaderConfig ──────────────────────────────────────────────────────────────

/// What the reader needs to know besides the lines themselves.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Join events after this date are dropped; on it, kept.
    pub cutoff: NaiveDate,
    pub aliases: AliasTable,
    pub tokenizer: Tokenizer,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            cutoff: default_cutoff(),
            aliases: AliasTable::default(),
            tokenizer: Tokenizer::default(),
        }
    }
}

impl ReaderConfig {
    /// Cutoff and alias table from the command line.
    ///
    /// Fails when an alias file is named or present but cannot be loaded.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            cutoff: settings.cutoff,
            aliases: settings.alias_table()?,
            tokenizer: Tokenizer::default(),
        })
    }
}

// ── Output ────────────────────────────────────────────────────────────────────

/// Line accounting for one read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadStats {
    pub lines_read: u64,
    pub messages: u64,
    pub join_events: u64,
    /// Join notices dated after the cutoff.
    pub joins_after_cutoff: u64,
    /// Lines that fit neither shape or had a bad timestamp.
    pub lines_skipped: u64,
    /// Lines that were not valid UTF-8.
    pub lines_undecodable: u64,
}

/// Everything extracted from one transcript.
#[derive(Debug, Clone)]
pub struct ParsedTranscript {
    pub aggregator: Aggregator,
    /// Retained join events, sorted by date.
    pub join_events: Vec<JoinEvent>,
    pub stats: ReadStats,
}

// ── TranscriptReader ──────────────────────────────────────────────────────────

pub struct TranscriptReader {
    parser: LineParser,
    config: ReaderConfig,
}

impl TranscriptReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self {
            parser: LineParser::new(),
            config,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(ReaderConfig::default())
    }

    /// Open and read the transcript at `path`.
    pub fn read_file(&self, path: &Path) -> Result<ParsedTranscript> {
        let file = std::fs::File::open(path).map_err(|source| WrappedError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed = self.read(std::io::BufReader::new(file));
        debug!(
            "File {}: {} lines, {} messages, {} joins, {} skipped",
            path.display(),
            parsed.stats.lines_read,
            parsed.stats.messages,
            parsed.stats.join_events,
            parsed.stats.lines_skipped,
        );
        Ok(parsed)
    }

    /// Read every line from `reader`.
    ///
    /// Lines that are not valid UTF-8 are skipped. Only a hard I/O error stops
    /// the loop before end of input.
    pub fn read<R: BufRead>(&self, mut reader: R) -> ParsedTranscript {
        let mut state = self.start();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("Stopped reading transcript early: {}", e);
                    break;
                }
            }
            match std::str::from_utf8(&buf) {
                Ok(line) => self.ingest(&mut state, line),
                Err(_) => {
                    state.stats.lines_read += 1;
                    state.stats.lines_undecodable += 1;
                }
            }
        }

        self.finish(state)
    }

    /// Parse in-memory lines.
    pub fn parse_lines<'a, I>(&self, lines: I) -> ParsedTranscript
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut state = self.start();
        for line in lines {
            self.ingest(&mut state, line);
        }
        self.finish(state)
    }

    fn start(&self) -> ParsedTranscript {
        ParsedTranscript {
            aggregator: Aggregator::new(self.config.tokenizer.clone()),
            join_events: Vec::new(),
            stats: ReadStats::default(),
        }
    }

    fn ingest(&self, state: &mut ParsedTranscript, line: &str) {
        state.stats.lines_read += 1;
        match self.parser.parse_line(line) {
            Some(LineEvent::Message(mut message)) => {
                message.sender = self.config.aliases.normalize(&message.sender);
                state.aggregator.add_message(&message);
                state.stats.messages += 1;
            }
            Some(LineEvent::Join(event)) if event.date <= self.config.cutoff => {
                state.join_events.push(event);
                state.stats.join_events += 1;
            }
            Some(LineEvent::Join(_)) => {
                state.stats.joins_after_cutoff += 1;
            }
            None => {
                state.stats.lines_skipped += 1;
            }
        }
    }

    fn finish(&self, mut state: ParsedTranscript) -> ParsedTranscript {
        state.join_events.sort();
        state
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn reader_with_cutoff(cutoff: NaiveDate) -> TranscriptReader {
        TranscriptReader::new(ReaderConfig {
            cutoff,
            ..Default::default()
        })
    }

    #[test]
    fn test_message_and_join_example() {
        let parsed = TranscriptReader::with_defaults().parse_lines([
            "[01/01/2023, 10:00:00] Alice: hi there",
            "[01/01/2023, 11:00:00] Bob: \u{200E}Alice added Carol",
        ]);

        assert_eq!(parsed.aggregator.total_messages(), 1);
        assert_eq!(
            parsed.aggregator.user_stats("Alice").unwrap().message_count,
            1
        );
        assert!(parsed.aggregator.user_stats("Bob").is_none());
        assert_eq!(parsed.join_events, vec![JoinEvent { date: date(2023, 1, 1) }]);
        assert_eq!(parsed.stats.messages, 1);
        assert_eq!(parsed.stats.join_events, 1);
    }

    #[test]
    fn test_aliases_merge_senders() {
        let parsed = TranscriptReader::with_defaults().parse_lines([
            "[01/01/2023, 10:00:00] ~ callum: morning",
            "[01/01/2023, 10:05:00] Callum: evening",
        ]);
        assert_eq!(parsed.aggregator.total_participants(), 1);
        let stats = parsed.aggregator.user_stats("Callum 🇿🇦").unwrap();
        assert_eq!(stats.message_count, 2);
    }

    #[test]
    fn test_cutoff_is_inclusive() {
        let reader = reader_with_cutoff(date(2023, 6, 1));
        let parsed = reader.parse_lines([
            "[31/05/2023, 09:00:00] Bob: \u{200E}Bob added Ann",
            "[01/06/2023, 09:00:00] Bob: \u{200E}Bob added Ben",
            "[02/06/2023, 09:00:00] Bob: \u{200E}Bob added Cal",
        ]);
        assert_eq!(
            parsed.join_events,
            vec![
                JoinEvent { date: date(2023, 5, 31) },
                JoinEvent { date: date(2023, 6, 1) },
            ]
        );
        assert_eq!(parsed.stats.joins_after_cutoff, 1);
    }

    #[test]
    fn test_cutoff_does_not_filter_messages() {
        let reader = reader_with_cutoff(date(2020, 1, 1));
        let parsed = reader.parse_lines(["[01/01/2023, 10:00:00] Alice: hi"]);
        assert_eq!(parsed.aggregator.total_messages(), 1);
    }

    #[test]
    fn test_join_events_are_sorted() {
        let parsed = TranscriptReader::with_defaults().parse_lines([
            "[05/01/2023, 09:00:00] A: \u{200E}X was added",
            "[02/01/2023, 09:00:00] A: \u{200E}Y was added",
        ]);
        assert_eq!(parsed.join_events[0].date, date(2023, 1, 2));
        assert_eq!(parsed.join_events[1].date, date(2023, 1, 5));
    }

    #[test]
    fn test_noise_lines_are_counted_as_skipped() {
        let parsed = TranscriptReader::with_defaults().parse_lines([
            "",
            "second line of a multi-line message",
            "[99/99/2023, 10:00:00] Alice: broken date",
            "[01/01/2023, 10:00:00] Alice: ok",
        ]);
        assert_eq!(parsed.stats.lines_read, 4);
        assert_eq!(parsed.stats.lines_skipped, 3);
        assert_eq!(parsed.stats.messages, 1);
    }

    #[test]
    fn test_read_skips_invalid_utf8_and_continues() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"[01/01/2023, 10:00:00] Alice: first\n");
        bytes.extend_from_slice(b"[01/01/2023, 10:01:00] Bob: \xff\xfe broken\n");
        bytes.extend_from_slice(b"[01/01/2023, 10:02:00] Alice: last\r\n");

        let parsed = TranscriptReader::with_defaults().read(std::io::Cursor::new(bytes));
        assert_eq!(parsed.stats.lines_read, 3);
        assert_eq!(parsed.stats.lines_undecodable, 1);
        assert_eq!(parsed.aggregator.user_stats("Alice").unwrap().message_count, 2);
        assert_eq!(
            parsed.aggregator.user_stats("Alice").unwrap().messages[1],
            "last"
        );
    }

    #[test]
    fn test_read_file() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("_chat.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[01/01/2023, 10:00:00] Alice: hi there").unwrap();
        writeln!(file, "[02/01/2023, 12:00:00] Bob: hello: world").unwrap();
        drop(file);

        let parsed = TranscriptReader::with_defaults()
            .read_file(&path)
            .expect("read");
        assert_eq!(parsed.aggregator.total_messages(), 2);
        assert_eq!(
            parsed.aggregator.user_stats("Bob").unwrap().messages[0],
            "hello: world"
        );
    }

    #[test]
    fn test_reader_config_from_settings() {
        let tmp = TempDir::new().expect("tempdir");
        let aliases = tmp.path().join("aliases.json");
        std::fs::write(&aliases, r#"{"Bobby": "Bob"}"#).unwrap();

        let settings = Settings::load_from_args([
            "chat-wrapped".into(),
            "--cutoff".into(),
            "2024-02-29".into(),
            "--aliases".into(),
            aliases.into_os_string(),
        ]);
        let config = ReaderConfig::from_settings(&settings).expect("config");
        assert_eq!(config.cutoff, date(2024, 2, 29));
        assert_eq!(config.aliases.normalize("Bobby"), "Bob");
    }

    #[test]
    fn test_read_file_missing() {
        let tmp = TempDir::new().expect("tempdir");
        let err = TranscriptReader::with_defaults()
            .read_file(&tmp.path().join("missing.txt"))
            .unwrap_err();
        assert!(matches!(err, WrappedError::FileRead { .. }));
    }
}
