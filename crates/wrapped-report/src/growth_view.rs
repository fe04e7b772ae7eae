//! Plain-text membership growth table.
//!
//! Shows the fitted model, the most recent observed points, and the
//! forecast at 30-day steps.

use std::fmt::Write as _;

use wrapped_core::models::{GrowthReport, TrendModel};

use crate::formatting::{format_count, format_number, pad_left};

/// Observed rows shown when the caller does not pick a number.
pub const DEFAULT_OBSERVED_ROWS: usize = 5;

const VALUE_WIDTH: usize = 10;

/// One-line description of a fitted model.
pub fn describe_model(model: &TrendModel) -> String {
    match *model {
        TrendModel::Exponential { a, b, c } => format!(
            "exponential: y = {:.4} * e^({:.6} * x) + {:.4}",
            a, b, c
        ),
        TrendModel::Linear { m, k } => {
            format!("linear: y = {:.4} * x + {:.4}", m, k)
        }
    }
}

/// Render the growth report, showing the last `observed_rows` observed points.
pub fn render_growth(report: &GrowthReport, observed_rows: usize) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Member Growth ===");
    if let Some((date, total)) = report.observed.last() {
        let _ = writeln!(
            out,
            "Members so far: {} (as of {})",
            format_count(*total),
            date.format("%Y-%m-%d")
        );
    }
    let _ = writeln!(out, "Model ({}): {}", fit_label(&report.model), describe_model(&report.model));
    let _ = writeln!(
        out,
        "x = days since {}",
        report.window_start.format("%Y-%m-%d")
    );

    let _ = writeln!(out);
    let _ = writeln!(out, "--- Recent ---");
    let skip = report.observed.len().saturating_sub(observed_rows);
    for (date, total) in &report.observed[skip..] {
        let _ = writeln!(
            out,
            "👥 {}  {}",
            date.format("%Y-%m-%d"),
            pad_left(&format_count(*total), VALUE_WIDTH)
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "--- Forecast ---");
    for (date, value) in &report.forecast {
        let _ = writeln!(
            out,
            "📈 {}  {}",
            date.format("%Y-%m-%d"),
            pad_left(&format_number(*value, 1), VALUE_WIDTH)
        );
    }
    out
}

fn fit_label(model: &TrendModel) -> &'static str {
    if model.is_linear() {
        "linear fallback"
    } else {
        "fitted"
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
