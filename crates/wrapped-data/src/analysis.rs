//! Main analysis pipeline for Chat Wrapped.
//!
//! Reads the transcript, builds the wrapped summary from the aggregated
//! messages, and fits the membership growth forecast from the join events.

use std::path::{Path, PathBuf};

use chrono::{NaiveDateTime, Utc};
use tracing::{info, warn};

use wrapped_core::error::{Result, WrappedError};
use wrapped_core::models::{GrowthReport, JoinEvent, WrappedSummary};

use crate::growth::{cumulative_series, FitConfig, TrendFitter};
use crate::reader::{ReadStats, ReaderConfig, TranscriptReader};

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the analysis result.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AnalysisMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// Line accounting from the reader.
    pub read_stats: ReadStats,
    /// Wall-clock seconds spent reading and aggregating the transcript.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent fitting the growth model.
    pub fit_time_seconds: f64,
}

/// What became of the growth forecast.
#[derive(Debug, Clone, PartialEq)]
pub enum GrowthOutcome {
    Forecast(GrowthReport),
    /// No join events on or before the cutoff.
    NoJoinEvents,
    /// The caller did not ask for a forecast.
    Skipped,
}

impl GrowthOutcome {
    pub fn report(&self) -> Option<&GrowthReport> {
        match self {
            GrowthOutcome::Forecast(report) => Some(report),
            _ => None,
        }
    }
}

/// The complete output of [`analyze_transcript`].
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub source: PathBuf,
    pub summary: WrappedSummary,
    /// Timestamps of the first and last message.
    pub period: (NaiveDateTime, NaiveDateTime),
    pub growth: GrowthOutcome,
    pub metadata: AnalysisMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Fit and forecast membership growth from join events.
///
/// `source` only labels the [`WrappedError::NoJoinEvents`] error returned for
/// an empty slice.
pub fn forecast_growth(
    join_events: &[JoinEvent],
    config: &FitConfig,
    source: &Path,
) -> Result<GrowthReport> {
    if join_events.is_empty() {
        return Err(WrappedError::NoJoinEvents(source.to_path_buf()));
    }
    let series = cumulative_series(join_events);
    TrendFitter::new(config.clone()).report(&series)
}

/// Run the full analysis pipeline.
///
/// 1. Read and aggregate the transcript at `path`.
/// 2. Build the wrapped summary; no messages is an error.
/// 3. Unless `fit` is `None`, forecast membership growth; no join events is
///    reported through [`GrowthOutcome::NoJoinEvents`].
pub fn analyze_transcript(
    path: &Path,
    reader_config: ReaderConfig,
    fit: Option<&FitConfig>,
) -> Result<AnalysisResult> {
    // ── Step 1: Read ──────────────────────────────────────────────────────────
    let load_start = std::time::Instant::now();
    let parsed = TranscriptReader::new(reader_config).read_file(path)?;
    let load_time = load_start.elapsed().as_secs_f64();

    info!(
        "Read {} messages and {} join events from {}",
        parsed.stats.messages,
        parsed.stats.join_events,
        path.display()
    );

    // ── Step 2: Summary ───────────────────────────────────────────────────────
    let (summary, period) = parsed
        .aggregator
        .summary()
        .zip(parsed.aggregator.period())
        .ok_or_else(|| WrappedError::NoMessages(path.to_path_buf()))?;

    // ── Step 3: Growth ────────────────────────────────────────────────────────
    let fit_start = std::time::Instant::now();
    let growth = match fit {
        None => GrowthOutcome::Skipped,
        Some(config) => match forecast_growth(&parsed.join_events, config, path) {
            Ok(report) => GrowthOutcome::Forecast(report),
            Err(e) if e.is_no_data() => {
                warn!("No member join data found in {}", path.display());
                GrowthOutcome::NoJoinEvents
            }
            Err(e) => return Err(e),
        },
    };
    let fit_time = fit_start.elapsed().as_secs_f64();

    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        read_stats: parsed.stats,
        load_time_seconds: load_time,
        fit_time_seconds: fit_time,
    };

    Ok(AnalysisResult {
        source: path.to_path_buf(),
        summary,
        period,
        growth,
        metadata,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
