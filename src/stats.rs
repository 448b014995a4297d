use crate::entry::{LogEntry, TimeInterval};
use crate::parser::generic;
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Options controlling a statistics pass.
#[derive(Debug, Clone)]
pub struct StatsOptions {
    /// Bucket counts by this time granularity, if set.
    pub group_by: Option<TimeInterval>,
    /// How many top messages to keep.
    pub top_n: usize,
    /// Substring patterns to count independently.
    pub patterns: Vec<String>,
}

impl Default for StatsOptions {
    fn default() -> Self {
        StatsOptions {
            group_by: None,
            top_n: 10,
            patterns: Vec::new(),
        }
    }
}

/// A recurring normalized message and how often it was seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageCount {
    pub message: String,
    pub count: usize,
}

/// Aggregate statistics over one set of entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSummary {
    pub total_lines: usize,
    pub level_counts: FxHashMap<String, usize>,
    pub pattern_counts: FxHashMap<String, usize>,
    pub time_groups: FxHashMap<String, usize>,
    pub top_messages: Vec<MessageCount>,
}

/// Compute aggregate statistics over the full entry set.
///
/// Pure function of its input: the entries are read, never modified, so
/// repeated invocations yield identical summaries.
pub fn compute_stats(entries: &[LogEntry], options: &StatsOptions) -> StatsSummary {
    let mut level_counts: FxHashMap<String, usize> = FxHashMap::default();
    let mut pattern_counts: FxHashMap<String, usize> = FxHashMap::default();
    let mut time_groups: FxHashMap<String, usize> = FxHashMap::default();

    // Message tallies keep first-seen order so equal counts rank stably
    let mut message_order: Vec<MessageCount> = Vec::new();
    let mut message_index: FxHashMap<String, usize> = FxHashMap::default();

    for entry in entries {
        // Level tally, guessing from the raw line when parsing found none
        let level_name = match entry.level {
            Some(level) => level.as_str().to_string(),
            None => generic::extract_level(&entry.raw_line)
                .map(|level| level.as_str().to_string())
                .unwrap_or_else(|| "UNKNOWN".to_string()),
        };
        *level_counts.entry(level_name).or_insert(0) += 1;

        // Each pattern counts independently; one entry may hit several
        for pattern in &options.patterns {
            if entry.matches_pattern(pattern) {
                *pattern_counts.entry(pattern.clone()).or_insert(0) += 1;
            }
        }

        if let Some(interval) = options.group_by {
            if entry.timestamp.is_some() {
                *time_groups.entry(entry.time_group(interval)).or_insert(0) += 1;
            }
        }

        let normalized = entry.normalized_message();
        match message_index.get(normalized) {
            Some(&idx) => message_order[idx].count += 1,
            None => {
                message_index.insert(normalized.to_string(), message_order.len());
                message_order.push(MessageCount {
                    message: normalized.to_string(),
                    count: 1,
                });
            }
        }
    }

    // Stable sort preserves first-seen order among equal counts
    let mut top_messages = message_order;
    top_messages.sort_by_key(|mc| std::cmp::Reverse(mc.count));
    top_messages.truncate(options.top_n);

    StatsSummary {
        total_lines: entries.len(),
        level_counts,
        pattern_counts,
        time_groups,
        top_messages,
    }
}
