//! Plain-text "wrapped" report: overall totals plus the five leaderboards.

use std::fmt::Write as _;

use wrapped_core::models::WrappedSummary;

use crate::formatting::{display_width, format_count, format_hour, pad_right, share};

/// One leaderboard section.
struct Section<'a> {
    title: &'a str,
    icon: &'a str,
    unit: &'a str,
    rows: Vec<(String, u64)>,
}

/// Render the full report for the given year.
pub fn render_wrapped(summary: &WrappedSummary, year: i32) -> String {
    let top = &summary.top_stats;
    let mut out = String::new();

    let _ = writeln!(out, "🎉 WhatsApp Group Wrapped {}! 🎉", year);
    let _ = writeln!(out);
    let _ = writeln!(out, "=== Overall Stats ===");
    let _ = writeln!(out, "Total Messages: {}", format_count(summary.total_messages));
    let _ = writeln!(
        out,
        "Active Participants: {}",
        format_count(summary.total_participants)
    );

    let sections = [
        Section {
            title: "Top 5 Most Active Members",
            icon: "👤",
            unit: "messages",
            rows: top.top_active_members.clone(),
        },
        Section {
            title: "Top 5 Busiest Days",
            icon: "📅",
            unit: "messages",
            rows: top
                .top_busy_days
                .iter()
                .map(|(date, n)| (date.format("%Y-%m-%d").to_string(), *n))
                .collect(),
        },
        Section {
            title: "Top 5 Most Used Words",
            icon: "📝",
            unit: "times",
            rows: top.top_words.clone(),
        },
        Section {
            title: "Top 5 Emoji Users",
            icon: "😊",
            unit: "emojis",
            rows: top.top_emoji_users.clone(),
        },
        Section {
            title: "Top 5 Most Active Hours",
            icon: "🕐",
            unit: "messages",
            rows: top
                .top_active_hours
                .iter()
                .map(|(hour, n)| (format_hour(*hour), *n))
                .collect(),
        },
    ];

    for section in &sections {
        let _ = writeln!(out);
        render_section(&mut out, section, summary.total_messages);
    }
    out
}

fn render_section(out: &mut String, section: &Section<'_>, total_messages: u64) {
    let _ = writeln!(out, "=== {} ===", section.title);
    if section.rows.is_empty() {
        let _ = writeln!(out, "(none)");
        return;
    }

    let label_width = section
        .rows
        .iter()
        .map(|(label, _)| display_width(label) + 1)
        .max()
        .unwrap_or(0);

    for (label, count) in &section.rows {
        let label = format!("{}:", label);
        let _ = write!(
            out,
            "{} {} {} {}",
            section.icon,
            pad_right(&label, label_width),
            format_count(*count),
            section.unit
        );
        if section.unit == "messages" {
            let _ = write!(out, " ({}%)", share(*count, total_messages));
        }
        let _ = writeln!(out);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
