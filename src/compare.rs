use crate::entry::LogEntry;
use rustc_hash::FxHashSet;
use serde::Serialize;

/// Options controlling how entries are reduced for comparison.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompareOptions {
    /// Compare normalized messages instead of raw lines.
    pub ignore_timestamps: bool,
    /// Collapse whitespace runs and lowercase before comparing.
    pub fuzzy: bool,
}

/// Result of comparing two entry sequences.
///
/// The comparison is set-based, not sequence-aligned: a comparable
/// string appearing N times on one side and M times on the other is a
/// pure membership test, not a multiset difference. `modified` stays
/// empty until a paired-diff algorithm exists for it.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
    /// Entries in B whose comparable string is absent from A.
    pub added: Vec<LogEntry>,
    /// Entries in A whose comparable string is absent from B.
    pub removed: Vec<LogEntry>,
    /// Paired old/new entries; currently always empty.
    pub modified: Vec<(LogEntry, LogEntry)>,
    /// Entries in A whose comparable string is present in B.
    pub common: Vec<LogEntry>,
}

impl ComparisonResult {
    pub fn total_differences(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }

    pub fn has_differences(&self) -> bool {
        self.total_differences() > 0
    }
}

/// Classify two entry sequences into added/removed/common sets, in
/// original sequence order within each side.
pub fn compare_entries(
    entries_a: &[LogEntry],
    entries_b: &[LogEntry],
    options: &CompareOptions,
) -> ComparisonResult {
    let lines_a: Vec<String> = entries_a
        .iter()
        .map(|entry| comparable_string(entry, options))
        .collect();
    let lines_b: Vec<String> = entries_b
        .iter()
        .map(|entry| comparable_string(entry, options))
        .collect();

    let set_a: FxHashSet<&str> = lines_a.iter().map(String::as_str).collect();
    let set_b: FxHashSet<&str> = lines_b.iter().map(String::as_str).collect();

    let added = entries_b
        .iter()
        .zip(&lines_b)
        .filter(|(_, line)| !set_a.contains(line.as_str()))
        .map(|(entry, _)| entry.clone())
        .collect();
    let removed = entries_a
        .iter()
        .zip(&lines_a)
        .filter(|(_, line)| !set_b.contains(line.as_str()))
        .map(|(entry, _)| entry.clone())
        .collect();
    let common = entries_a
        .iter()
        .zip(&lines_a)
        .filter(|(_, line)| set_b.contains(line.as_str()))
        .map(|(entry, _)| entry.clone())
        .collect();

    ComparisonResult {
        added,
        removed,
        modified: Vec::new(),
        common,
    }
}

/// Reduce an entry to the string actually compared.
fn comparable_string(entry: &LogEntry, options: &CompareOptions) -> String {
    let comparable = if options.ignore_timestamps {
        entry.normalized_message().to_string()
    } else {
        entry.raw_line.clone()
    };

    if options.fuzzy {
        comparable
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    } else {
        comparable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{GenericLogParser, LogParser};

    fn parse_all(lines: &[&str]) -> Vec<LogEntry> {
        let parser = GenericLogParser;
        lines
            .iter()
            .map(|line| parser.parse_line(line, None, None))
            .collect()
    }

    #[test]
    fn classifies_added_removed_common() {
        let a = parse_all(&["First", "Second"]);
        let b = parse_all(&["First", "Third"]);
        let result = compare_entries(&a, &b, &CompareOptions::default());

        assert_eq!(result.common.len(), 1);
        assert_eq!(result.common[0].raw_line, "First");
        assert_eq!(result.added.len(), 1);
        assert_eq!(result.added[0].raw_line, "Third");
        assert_eq!(result.removed.len(), 1);
        assert_eq!(result.removed[0].raw_line, "Second");
        assert!(result.modified.is_empty());
        assert_eq!(result.total_differences(), 2);
        assert!(result.has_differences());
    }

    #[test]
    fn identical_inputs_have_no_differences() {
        let a = parse_all(&["one", "two"]);
        let b = parse_all(&["one", "two"]);
        let result = compare_entries(&a, &b, &CompareOptions::default());
        assert!(!result.has_differences());
        assert_eq!(result.common.len(), 2);
    }

    #[test]
    fn ignore_timestamps_compares_messages() {
        let a = parse_all(&["2023-09-09 10:00:00 ERROR disk full"]);
        let b = parse_all(&["2023-09-10 22:30:00 ERROR disk full"]);

        let strict = compare_entries(&a, &b, &CompareOptions::default());
        assert!(strict.has_differences());

        let relaxed = compare_entries(
            &a,
            &b,
            &CompareOptions {
                ignore_timestamps: true,
                fuzzy: false,
            },
        );
        assert!(!relaxed.has_differences());
    }

    #[test]
    fn fuzzy_collapses_whitespace_and_case() {
        let a = parse_all(&["Server   Started OK"]);
        let b = parse_all(&["server started ok"]);

        assert!(compare_entries(&a, &b, &CompareOptions::default()).has_differences());
        let fuzzy = compare_entries(
            &a,
            &b,
            &CompareOptions {
                ignore_timestamps: false,
                fuzzy: true,
            },
        );
        assert!(!fuzzy.has_differences());
    }

    #[test]
    fn duplicates_are_membership_not_multiset() {
        // Two copies on one side, one on the other: still only common
        let a = parse_all(&["repeat", "repeat"]);
        let b = parse_all(&["repeat"]);
        let result = compare_entries(&a, &b, &CompareOptions::default());
        assert!(!result.has_differences());
        assert_eq!(result.common.len(), 2);
    }
}
