//! JSON export of the summary and growth records.

use std::path::Path;

use serde::Serialize;
use tracing::info;

use wrapped_core::error::Result;
use wrapped_core::models::{GrowthReport, WrappedSummary};

/// Atomically write `value` as pretty-printed JSON, creating parent
/// directories if needed.
///
/// Non-ASCII text (emoji, flags) is written as-is rather than escaped.
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(value)?;

    // Write to a temp file then rename for atomicity.
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json)?;
    std::fs::rename(&tmp, path)?;

    Ok(())
}

pub fn save_summary(summary: &WrappedSummary, path: &Path) -> Result<()> {
    save_json(summary, path)?;
    info!("Saved wrapped summary to {}", path.display());
    Ok(())
}

pub fn save_growth(report: &GrowthReport, path: &Path) -> Result<()> {
    save_json(report, path)?;
    info!("Saved growth forecast to {}", path.display());
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
