use crate::entry::LogEntry;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Options controlling a merge invocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOptions {
    /// Drop entries whose normalized message was already emitted.
    pub deduplicate: bool,
    /// Prefix each entry's message with its source file name.
    pub tag_source: bool,
}

/// Lazy k-way merge of entry streams ordered by timestamp.
///
/// The heap is keyed by `(epoch, stream index, position)`, so entries
/// without a timestamp sort after all timestamped ones and ties resolve
/// deterministically by stream order then original position. At most
/// one pending entry per active stream is held at a time.
pub struct MergedEntries {
    streams: Vec<Vec<LogEntry>>,
    heap: BinaryHeap<Reverse<(i64, usize, usize)>>,
    seen: FxHashSet<String>,
    options: MergeOptions,
}

impl Iterator for MergedEntries {
    type Item = LogEntry;

    fn next(&mut self) -> Option<LogEntry> {
        while let Some(Reverse((_, stream_idx, pos))) = self.heap.pop() {
            // Advance the popped stream before anything else, so a
            // discarded duplicate still keeps its stream active.
            let next_pos = pos + 1;
            if let Some(next) = self.streams[stream_idx].get(next_pos) {
                self.heap.push(Reverse((
                    next.epoch_millis_or_max(),
                    stream_idx,
                    next_pos,
                )));
            }

            let entry = self.streams[stream_idx][pos].clone();

            if self.options.deduplicate {
                let key = entry.normalized_message().to_string();
                if !self.seen.insert(key) {
                    continue;
                }
            }

            if self.options.tag_source {
                if let Some(source) = &entry.source_file {
                    let tagged = format!("[{}] {}", source, entry.message);
                    return Some(entry.with_message(tagged));
                }
            }

            return Some(entry);
        }
        None
    }
}

/// Merge multiple entry streams chronologically.
///
/// Each stream is consumed in its original order; emission is lazy so
/// the merged sequence can be consumed incrementally.
pub fn merge_entries(streams: Vec<Vec<LogEntry>>, options: &MergeOptions) -> MergedEntries {
    let mut heap = BinaryHeap::with_capacity(streams.len());
    for (stream_idx, stream) in streams.iter().enumerate() {
        if let Some(first) = stream.first() {
            heap.push(Reverse((first.epoch_millis_or_max(), stream_idx, 0)));
        }
    }
    MergedEntries {
        streams,
        heap,
        seen: FxHashSet::default(),
        options: *options,
    }
}

/// Per-invocation state for the live follow merge.
///
/// Tracks how many entries of each file have already been handled and
/// the dedup set shared across all followed files. Scoped to one follow
/// run so concurrent or repeated runs do not interfere.
pub struct FollowState {
    baselines: FxHashMap<String, usize>,
    seen: FxHashSet<String>,
    options: MergeOptions,
}

impl FollowState {
    /// Start a follow run. Baselines begin at the given per-file entry
    /// counts, which skips content that existed before the run.
    pub fn new(initial_counts: FxHashMap<String, usize>, options: MergeOptions) -> Self {
        FollowState {
            baselines: initial_counts,
            seen: FxHashSet::default(),
            options,
        }
    }

    /// Take the full current entry list for one file and return only
    /// the entries appended since the last call, with tagging and
    /// deduplication applied.
    pub fn collect_new(&mut self, file: &str, entries: Vec<LogEntry>) -> Vec<LogEntry> {
        let baseline = self.baselines.get(file).copied().unwrap_or(0);
        if entries.len() <= baseline {
            return Vec::new();
        }
        self.baselines.insert(file.to_string(), entries.len());

        let mut new_entries = Vec::new();
        for entry in entries.into_iter().skip(baseline) {
            let entry = if self.options.tag_source {
                entry.with_message(format!("[{}] {}", file, entry.message))
            } else {
                entry
            };

            if self.options.deduplicate {
                let key = entry.normalized_message().to_string();
                if !self.seen.insert(key) {
                    continue;
                }
            }

            new_entries.push(entry);
        }
        new_entries
    }

    /// Order a tick's batch chronologically; entries without a
    /// timestamp go last, otherwise arrival order is preserved.
    pub fn sort_batch(batch: &mut [LogEntry]) {
        batch.sort_by_key(|entry| entry.epoch_millis_or_max());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn entry(msg: &str, ts: Option<&str>) -> LogEntry {
        let mut entry = LogEntry::new(msg);
        entry.timestamp = ts.map(|ts| {
            NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap()
        });
        entry
    }

    fn messages(merged: MergedEntries) -> Vec<String> {
        merged.map(|e| e.message).collect()
    }

    #[test]
    fn merges_in_timestamp_order() {
        let streams = vec![
            vec![entry("a", Some("2023-09-09 10:00:01"))],
            vec![entry("b", Some("2023-09-09 10:00:00"))],
        ];
        let merged = merge_entries(streams, &MergeOptions::default());
        assert_eq!(messages(merged), vec!["b", "a"]);
    }

    #[test]
    fn entries_without_timestamp_come_last() {
        let streams = vec![
            vec![entry("late", None)],
            vec![
                entry("first", Some("2023-09-09 10:00:00")),
                entry("second", Some("2023-09-09 10:00:05")),
            ],
        ];
        let merged = merge_entries(streams, &MergeOptions::default());
        assert_eq!(messages(merged), vec!["first", "second", "late"]);
    }

    #[test]
    fn ties_resolve_by_stream_order() {
        let streams = vec![
            vec![entry("from stream zero", Some("2023-09-09 10:00:00"))],
            vec![entry("from stream one", Some("2023-09-09 10:00:00"))],
        ];
        let merged = merge_entries(streams, &MergeOptions::default());
        assert_eq!(
            messages(merged),
            vec!["from stream zero", "from stream one"]
        );
    }

    #[test]
    fn deduplicate_emits_each_message_once() {
        let stream = vec![
            entry("alpha", Some("2023-09-09 10:00:00")),
            entry("beta", Some("2023-09-09 10:00:01")),
        ];
        let streams = vec![stream.clone(), stream];
        let options = MergeOptions {
            deduplicate: true,
            tag_source: false,
        };
        let merged = merge_entries(streams, &options);
        assert_eq!(messages(merged), vec!["alpha", "beta"]);
    }

    #[test]
    fn tag_source_prefixes_message_but_not_raw_line() {
        let mut tagged = entry("hello", Some("2023-09-09 10:00:00"));
        tagged.source_file = Some("app.log".to_string());
        let streams = vec![vec![tagged]];
        let options = MergeOptions {
            deduplicate: false,
            tag_source: true,
        };
        let merged: Vec<_> = merge_entries(streams, &options).collect();

        assert_eq!(merged[0].message, "[app.log] hello");
        assert_eq!(merged[0].raw_line, "hello");
        // Stripping the tag recovers the original message
        let stripped = merged[0]
            .message
            .strip_prefix("[app.log] ")
            .unwrap();
        assert_eq!(stripped, "hello");
    }

    #[test]
    fn follow_skips_preexisting_entries() {
        let mut counts = FxHashMap::default();
        counts.insert("app.log".to_string(), 2);
        let mut state = FollowState::new(counts, MergeOptions::default());

        // First tick: same two entries, nothing new
        let existing = vec![entry("one", None), entry("two", None)];
        assert!(state.collect_new("app.log", existing.clone()).is_empty());

        // Second tick: one appended entry
        let mut grown = existing;
        grown.push(entry("three", None));
        let fresh = state.collect_new("app.log", grown);
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].message, "three");
    }

    #[test]
    fn follow_dedup_spans_files() {
        let mut state = FollowState::new(
            FxHashMap::default(),
            MergeOptions {
                deduplicate: true,
                tag_source: false,
            },
        );
        let first = state.collect_new("a.log", vec![entry("same line", None)]);
        let second = state.collect_new("b.log", vec![entry("same line", None)]);
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
    }

    #[test]
    fn batch_sort_is_stable_and_timestamp_ordered() {
        let mut batch = vec![
            entry("untimed", None),
            entry("later", Some("2023-09-09 10:00:05")),
            entry("earlier", Some("2023-09-09 10:00:00")),
        ];
        FollowState::sort_batch(&mut batch);
        let order: Vec<_> = batch.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(order, vec!["earlier", "later", "untimed"]);
    }
}
