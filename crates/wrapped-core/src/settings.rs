use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

use crate::error::Result;
use crate::normalizer::AliasTable;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Year-in-review statistics and membership forecast for a chat export
#[derive(Parser, Debug, Clone)]
#[command(
    name = "chat-wrapped",
    about = "Year-in-review statistics and membership forecast for a chat export",
    version
)]
pub struct Settings {
    /// Exported chat transcript
    #[arg(default_value = "_chat.txt")]
    pub chat_file: PathBuf,

    /// Where to write the summary JSON
    #[arg(long, default_value = "whatsapp_wrapped.json")]
    pub output: PathBuf,

    /// Where to write the growth forecast JSON (not written when absent)
    #[arg(long)]
    pub growth_output: Option<PathBuf>,

    /// Last join date (inclusive) counted towards membership growth
    #[arg(long, default_value = "2025-09-01")]
    pub cutoff: NaiveDate,

    /// Number of 30-day steps to forecast
    #[arg(long, default_value = "6", value_parser = clap::value_parser!(u32).range(1..=120))]
    pub months_ahead: u32,

    /// Number of most recent growth points used for fitting
    #[arg(long, default_value = "90", value_parser = clap::value_parser!(u32).range(2..))]
    pub window: u32,

    /// Evaluation budget for the exponential fit
    #[arg(long, default_value = "2000", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_evaluations: u32,

    /// JSON file mapping sender labels to canonical names
    #[arg(long, env = "CHAT_WRAPPED_ALIASES")]
    pub aliases: Option<PathBuf>,

    /// Skip the membership growth forecast
    #[arg(long)]
    pub skip_growth: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Parse the process arguments and apply derived values.
    pub fn load() -> Self {
        Self::resolve(Settings::parse())
    }

    /// Same as [`Settings::load`] with an explicit argument list.
    pub fn load_from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::resolve(Settings::parse_from(args))
    }

    /// `--debug` overrides the log level.
    fn resolve(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// Alias table for this run: `--aliases`, then the default file, then
    /// the built-in table.
    pub fn alias_table(&self) -> Result<AliasTable> {
        AliasTable::resolve(self.aliases.as_deref())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
