//! Per-user, per-day and word-frequency aggregation over chat messages.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::{NaiveDate, NaiveDateTime};
use wrapped_core::models::{Message, TopStats, UserStats, WrappedSummary};
use wrapped_core::tokenizer::{EmojiCounter, Tokenizer};

/// Length of every leaderboard in [`TopStats`].
pub const TOP_N: usize = 5;

// ── Tally ─────────────────────────────────────────────────────────────────────

/// Counter that remembers the order keys were first seen in.
///
/// Ranking is a stable sort, so equal counts keep first-seen order.
#[derive(Debug, Clone)]
pub struct Tally<K> {
    entries: Vec<(K, u64)>,
    index: HashMap<K, usize>,
}

impl<K> Default for Tally<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> Tally<K> {
    /// Add `n` to the count for `key`, inserting it at the end if new.
    pub fn add(&mut self, key: K, n: u64) {
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 += n,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, n));
            }
        }
    }

    pub fn get(&self, key: &K) -> u64 {
        self.index.get(key).map(|&i| self.entries[i].1).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, n)| n).sum()
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> {
        self.entries.iter().map(|(k, n)| (k, *n))
    }

    /// The `n` highest counts, descending.
    pub fn top(&self, n: usize) -> Vec<(K, u64)> {
        rank(self.entries.clone(), n)
    }
}

/// Stable descending sort by count, truncated to `n`.
fn rank<K>(mut entries: Vec<(K, u64)>, n: usize) -> Vec<(K, u64)> {
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(n);
    entries
}

// ── Aggregator ────────────────────────────────────────────────────────────────

/// Aggregation context for one transcript.
///
/// Created empty, fed messages in file order, then queried. Counters only
/// ever grow.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    tokenizer: Tokenizer,
    emoji: EmojiCounter,
    users: Vec<(String, UserStats)>,
    user_index: HashMap<String, usize>,
    daily_counts: Tally<NaiveDate>,
    word_counts: Tally<String>,
    total_messages: u64,
    first_seen: Option<NaiveDateTime>,
    last_seen: Option<NaiveDateTime>,
}

impl Aggregator {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self {
            tokenizer,
            ..Default::default()
        }
    }

    /// Fold one message (with an already-canonical sender) into every counter.
    pub fn add_message(&mut self, message: &Message) {
        let emoji_count = self.emoji.count(&message.text);
        self.user_entry(&message.sender)
            .add_message(message, emoji_count);

        self.daily_counts.add(message.date(), 1);
        for word in self.tokenizer.tokenize(&message.text) {
            self.word_counts.add(word, 1);
        }
        self.total_messages += 1;

        let ts = message.timestamp;
        self.first_seen = Some(self.first_seen.map_or(ts, |t| t.min(ts)));
        self.last_seen = Some(self.last_seen.map_or(ts, |t| t.max(ts)));
    }

    fn user_entry(&mut self, sender: &str) -> &mut UserStats {
        let i = match self.user_index.get(sender) {
            Some(&i) => i,
            None => {
                let i = self.users.len();
                self.user_index.insert(sender.to_string(), i);
                self.users.push((sender.to_string(), UserStats::default()));
                i
            }
        };
        &mut self.users[i].1
    }

    pub fn total_messages(&self) -> u64 {
        self.total_messages
    }

    pub fn total_participants(&self) -> u64 {
        self.users.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.total_messages == 0
    }

    /// Earliest and latest message timestamps.
    pub fn period(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        self.first_seen.zip(self.last_seen)
    }

    pub fn user_stats(&self, sender: &str) -> Option<&UserStats> {
        self.user_index.get(sender).map(|&i| &self.users[i].1)
    }

    pub fn daily_counts(&self) -> &Tally<NaiveDate> {
        &self.daily_counts
    }

    pub fn word_counts(&self) -> &Tally<String> {
        &self.word_counts
    }

    // ── Leaderboards ──────────────────────────────────────────────────────────

    pub fn top_active_members(&self) -> Vec<(String, u64)> {
        self.rank_users(|stats| stats.message_count)
    }

    pub fn top_emoji_users(&self) -> Vec<(String, u64)> {
        self.rank_users(|stats| stats.emoji_count)
    }

    pub fn top_busy_days(&self) -> Vec<(NaiveDate, u64)> {
        self.daily_counts.top(TOP_N)
    }

    pub fn top_words(&self) -> Vec<(String, u64)> {
        self.word_counts.top(TOP_N)
    }

    /// Busiest hours of day; hours without messages are left out.
    ///
    /// Ties keep the order hours first appear when walking senders in
    /// first-message order.
    pub fn top_active_hours(&self) -> Vec<(u32, u64)> {
        let mut hours = Tally::default();
        for (_, stats) in &self.users {
            for (hour, count) in stats.hours_first_seen() {
                hours.add(hour, count);
            }
        }
        hours.top(TOP_N)
    }

    fn rank_users(&self, metric: impl Fn(&UserStats) -> u64) -> Vec<(String, u64)> {
        let scored: Vec<(String, u64)> = self
            .users
            .iter()
            .map(|(name, stats)| (name.clone(), metric(stats)))
            .collect();
        rank(scored, TOP_N)
    }

    pub fn top_stats(&self) -> TopStats {
        TopStats {
            top_active_members: self.top_active_members(),
            top_busy_days: self.top_busy_days(),
            top_words: self.top_words(),
            top_emoji_users: self.top_emoji_users(),
            top_active_hours: self.top_active_hours(),
        }
    }

    /// Serializable summary, or `None` when no message was recorded.
    pub fn summary(&self) -> Option<WrappedSummary> {
        if self.is_empty() {
            return None;
        }
        let user_stats = self
            .users
            .iter()
            .map(|(name, stats)| (name.clone(), stats.summary()))
            .collect();

        Some(WrappedSummary {
            total_messages: self.total_messages,
            total_participants: self.total_participants(),
            user_stats,
            top_stats: self.top_stats(),
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(day: u32, hour: u32, sender: &str, text: &str) -> Message {
        Message {
            timestamp: NaiveDate::from_ymd_opt(2023, 1, day)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            sender: sender.to_string(),
            text: text.to_string(),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, d).unwrap()
    }

    // ── Tally ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_tally_counts_and_order() {
        let mut tally = Tally::default();
        tally.add("b", 1);
        tally.add("a", 2);
        tally.add("b", 2);

        assert_eq!(tally.get(&"a"), 2);
        assert_eq!(tally.get(&"b"), 3);
        assert_eq!(tally.get(&"z"), 0);
        assert_eq!(tally.total(), 5);
        let keys: Vec<_> = tally.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_tally_top_breaks_ties_by_first_seen() {
        let mut tally = Tally::default();
        for key in ["x", "y", "z", "y", "w"] {
            tally.add(key, 1);
        }
        assert_eq!(tally.top(3), vec![("y", 2), ("x", 1), ("z", 1)]);
    }

    #[test]
    fn test_tally_top_truncates() {
        let mut tally = Tally::default();
        for i in 0..10u64 {
            tally.add(i, i);
        }
        let top = tally.top(TOP_N);
        assert_eq!(top.len(), TOP_N);
        assert_eq!(top[0], (9, 9));
        assert_eq!(top[4], (5, 5));
    }

    // ── Aggregator ────────────────────────────────────────────────────────────

    #[test]
    fn test_add_message_updates_every_counter() {
        let mut agg = Aggregator::default();
        agg.add_message(&msg(1, 10, "Alice", "Meetup tonight 🎉"));

        let stats = agg.user_stats("Alice").expect("alice stats");
        assert_eq!(stats.message_count, 1);
        assert_eq!(stats.emoji_count, 1);
        assert_eq!(stats.active_hours[10], 1);
        assert_eq!(stats.messages, vec!["Meetup tonight 🎉".to_string()]);

        assert_eq!(agg.daily_counts().get(&day(1)), 1);
        assert_eq!(agg.word_counts().get(&"meetup".to_string()), 1);
        assert_eq!(agg.word_counts().get(&"tonight".to_string()), 1);
        assert_eq!(agg.total_messages(), 1);
        assert_eq!(agg.total_participants(), 1);
    }

    #[test]
    fn test_period_spans_all_messages() {
        let mut agg = Aggregator::default();
        assert!(agg.period().is_none());
        agg.add_message(&msg(5, 12, "Ann", "b"));
        agg.add_message(&msg(2, 8, "Ben", "a"));
        agg.add_message(&msg(9, 23, "Ann", "c"));

        let (first, last) = agg.period().unwrap();
        assert_eq!(first, msg(2, 8, "", "").timestamp);
        assert_eq!(last, msg(9, 23, "", "").timestamp);
    }

    #[test]
    fn test_message_count_matches_message_list() {
        let mut agg = Aggregator::default();
        for i in 0..7 {
            agg.add_message(&msg(1 + i % 3, 9, "Bob", "hello"));
        }
        let stats = agg.user_stats("Bob").unwrap();
        assert_eq!(stats.message_count, 7);
        assert_eq!(stats.messages.len(), 7);
    }

    #[test]
    fn test_top_active_members_and_emoji_users() {
        let mut agg = Aggregator::default();
        agg.add_message(&msg(1, 9, "Ann", "😀😀😀"));
        agg.add_message(&msg(1, 9, "Ben", "plain"));
        agg.add_message(&msg(1, 9, "Ben", "plain again"));
        agg.add_message(&msg(1, 9, "Cat", "one 👍"));

        assert_eq!(
            agg.top_active_members(),
            vec![
                ("Ben".to_string(), 2),
                ("Ann".to_string(), 1),
                ("Cat".to_string(), 1)
            ]
        );
        assert_eq!(
            agg.top_emoji_users(),
            vec![
                ("Ann".to_string(), 3),
                ("Cat".to_string(), 1),
                ("Ben".to_string(), 0)
            ]
        );
    }

    #[test]
    fn test_top_busy_days_and_hours() {
        let mut agg = Aggregator::default();
        agg.add_message(&msg(2, 8, "Ann", "a"));
        agg.add_message(&msg(3, 20, "Ann", "b"));
        agg.add_message(&msg(3, 20, "Ben", "c"));
        agg.add_message(&msg(4, 8, "Ben", "d"));
        agg.add_message(&msg(4, 13, "Ben", "e"));
        agg.add_message(&msg(4, 8, "Cat", "f"));

        assert_eq!(agg.top_busy_days(), vec![(day(4), 3), (day(3), 2), (day(2), 1)]);
        assert_eq!(agg.top_active_hours(), vec![(8, 3), (20, 2), (13, 1)]);
    }

    #[test]
    fn test_top_active_hours_ties_keep_first_seen_order() {
        let mut agg = Aggregator::default();
        agg.add_message(&msg(1, 20, "Ann", "a"));
        agg.add_message(&msg(1, 3, "Ann", "b"));
        agg.add_message(&msg(1, 7, "Ben", "c"));
        agg.add_message(&msg(2, 3, "Ben", "d"));

        assert_eq!(agg.top_active_hours(), vec![(3, 2), (20, 1), (7, 1)]);
    }

    #[test]
    fn test_summary_lists_users_in_first_message_order() {
        let mut agg = Aggregator::default();
        agg.add_message(&msg(1, 9, "Zoe", "a"));
        agg.add_message(&msg(1, 9, "Adam", "b"));
        agg.add_message(&msg(1, 9, "Mia", "c"));

        let names: Vec<_> = agg
            .summary()
            .unwrap()
            .user_stats
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["Zoe", "Adam", "Mia"]);
    }

    #[test]
    fn test_top_words() {
        let mut agg = Aggregator::default();
        agg.add_message(&msg(1, 9, "Ann", "rust rust python"));
        agg.add_message(&msg(1, 9, "Ben", "python rust golang that"));

        assert_eq!(
            agg.top_words(),
            vec![
                ("rust".to_string(), 3),
                ("python".to_string(), 2),
                ("golang".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_summary_none_when_empty() {
        assert!(Aggregator::default().summary().is_none());
    }

    #[test]
    fn test_summary_shape() {
        let mut agg = Aggregator::default();
        agg.add_message(&msg(1, 9, "Ann", "hello"));
        agg.add_message(&msg(1, 21, "Ann", "night 🌙"));
        agg.add_message(&msg(2, 9, "Ben", "morning"));

        let summary = agg.summary().expect("summary");
        assert_eq!(summary.total_messages, 3);
        assert_eq!(summary.total_participants, 2);

        let ann = summary.user("Ann").expect("ann");
        assert_eq!(ann.message_count, 2);
        assert_eq!(ann.emoji_count, 1);
        assert_eq!(ann.active_hours.get(&9), Some(&1));
        assert_eq!(ann.active_hours.get(&21), Some(&1));
        assert_eq!(ann.active_hours.len(), 2);

        assert_eq!(summary.top_stats.top_active_members[0], ("Ann".to_string(), 2));
        assert_eq!(summary.top_stats.top_active_hours[0], (9, 2));
    }

    #[test]
    fn test_custom_tokenizer_is_used() {
        let mut agg = Aggregator::new(Tokenizer::with_stop_words(["hello"]));
        agg.add_message(&msg(1, 9, "Ann", "hello world"));
        assert_eq!(agg.word_counts().get(&"hello".to_string()), 0);
        assert_eq!(agg.word_counts().get(&"world".to_string()), 1);
    }
}
