use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of hour-of-day buckets in an activity histogram.
pub const HOURS_PER_DAY: usize = 24;

/// A single chat message read from the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Local wall-clock time printed in the export.
    pub timestamp: NaiveDateTime,
    /// Canonical sender name, after alias normalization.
    pub sender: String,
    /// Message body exactly as exported.
    pub text: String,
}

impl Message {
    /// Calendar date the message was sent on.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Hour of day (0–23) the message was sent in.
    pub fn hour(&self) -> usize {
        self.timestamp.hour() as usize
    }
}

/// A member joining, or being added to, the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JoinEvent {
    pub date: NaiveDate,
}

/// Running per-sender statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserStats {
    pub message_count: u64,
    pub emoji_count: u64,
    /// Messages sent per hour of day.
    pub active_hours: [u64; HOURS_PER_DAY],
    /// Hours in the order they first appeared.
    pub hour_order: Vec<u32>,
    /// Message bodies in arrival order.
    pub messages: Vec<String>,
}

impl Default for UserStats {
    fn default() -> Self {
        Self {
            message_count: 0,
            emoji_count: 0,
            active_hours: [0; HOURS_PER_DAY],
            hour_order: Vec::new(),
            messages: Vec::new(),
        }
    }
}

impl UserStats {
    /// Fold one message into the running totals.
    pub fn add_message(&mut self, message: &Message, emoji_count: u64) {
        self.message_count += 1;
        self.emoji_count += emoji_count;
        let hour = message.hour();
        if self.active_hours[hour] == 0 {
            self.hour_order.push(hour as u32);
        }
        self.active_hours[hour] += 1;
        self.messages.push(message.text.clone());
    }

    /// Histogram as an `hour -> count` map, omitting silent hours.
    pub fn active_hours_map(&self) -> BTreeMap<u32, u64> {
        self.active_hours
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(hour, &count)| (hour as u32, count))
            .collect()
    }

    /// Non-zero `(hour, count)` buckets in first-seen order.
    pub fn hours_first_seen(&self) -> impl Iterator<Item = (u32, u64)> + '_ {
        self.hour_order
            .iter()
            .map(|&hour| (hour, self.active_hours[hour as usize]))
    }

    /// Serializable view without the message bodies.
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            message_count: self.message_count,
            emoji_count: self.emoji_count,
            active_hours: self.active_hours_map(),
        }
    }
}

/// Per-user entry of the wrapped summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub message_count: u64,
    pub emoji_count: u64,
    pub active_hours: BTreeMap<u32, u64>,
}

/// The five leaderboards of the wrapped summary.
///
/// Each list holds at most five `(key, count)` pairs, highest count first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopStats {
    pub top_active_members: Vec<(String, u64)>,
    pub top_busy_days: Vec<(NaiveDate, u64)>,
    pub top_words: Vec<(String, u64)>,
    pub top_emoji_users: Vec<(String, u64)>,
    pub top_active_hours: Vec<(u32, u64)>,
}

/// Retrospective summary of group activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrappedSummary {
    pub total_messages: u64,
    pub total_participants: u64,
    /// Per-sender entries in first-message order; serialized as a JSON object.
    #[serde(with = "ordered_map")]
    pub user_stats: Vec<(String, UserSummary)>,
    pub top_stats: TopStats,
}

impl WrappedSummary {
    pub fn user(&self, name: &str) -> Option<&UserSummary> {
        self.user_stats
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, summary)| summary)
    }
}

/// (De)serialize `Vec<(String, V)>` as a map, keeping entry order.
mod ordered_map {
    use std::fmt;
    use std::marker::PhantomData;

    use serde::de::{MapAccess, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[allow(clippy::ptr_arg)]
    pub fn serialize<S, V>(entries: &Vec<(String, V)>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        V: Serialize,
    {
        serializer.collect_map(entries.iter().map(|(k, v)| (k, v)))
    }

    pub fn deserialize<'de, D, V>(deserializer: D) -> Result<Vec<(String, V)>, D::Error>
    where
        D: Deserializer<'de>,
        V: Deserialize<'de>,
    {
        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
            type Value = Vec<(String, V)>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of names to entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry()? {
                    entries.push(entry);
                }
                Ok(entries)
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

// ── Growth ────────────────────────────────────────────────────────────────────

/// Cumulative member count per distinct join date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthSeries {
    /// Distinct join dates, ascending.
    pub dates: Vec<NaiveDate>,
    /// Join events on or before the matching date.
    pub cumulative_counts: Vec<u64>,
}

impl GrowthSeries {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Total members at the last observed date.
    pub fn total(&self) -> u64 {
        self.cumulative_counts.last().copied().unwrap_or(0)
    }

    /// The series as `(date, cumulative)` pairs.
    pub fn points(&self) -> Vec<(NaiveDate, u64)> {
        self.dates
            .iter()
            .copied()
            .zip(self.cumulative_counts.iter().copied())
            .collect()
    }

    /// The last `window` points, or the whole series if it is shorter.
    pub fn tail(&self, window: usize) -> GrowthSeries {
        let start = self.len().saturating_sub(window);
        GrowthSeries {
            dates: self.dates[start..].to_vec(),
            cumulative_counts: self.cumulative_counts[start..].to_vec(),
        }
    }
}

/// A fitted growth curve over elapsed days `x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TrendModel {
    /// `y = a·e^(b·x) + c`
    Exponential { a: f64, b: f64, c: f64 },
    /// `y = m·x + k`, used when the exponential fit does not converge.
    Linear { m: f64, k: f64 },
}

impl TrendModel {
    /// Predicted cumulative count after `x` elapsed days.
    pub fn evaluate(&self, x: f64) -> f64 {
        match *self {
            TrendModel::Exponential { a, b, c } => a * (b * x).exp() + c,
            TrendModel::Linear { m, k } => m * x + k,
        }
    }

    pub fn is_linear(&self) -> bool {
        matches!(self, TrendModel::Linear { .. })
    }
}

/// Observed growth plus the forecast derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthReport {
    pub observed: Vec<(NaiveDate, u64)>,
    pub forecast: Vec<(NaiveDate, f64)>,
    pub model: TrendModel,
    /// First date of the fitting window; `x = 0` for the model.
    pub window_start: NaiveDate,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
