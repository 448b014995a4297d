use crate::entry::LogEntry;

/// Lazy pass-through filter over an entry stream.
///
/// The level filter compares the parsed level name case-insensitively,
/// falling back to a substring scan of the raw line for entries whose
/// level could not be parsed. Pattern filters are conjunctive: an entry
/// must contain every supplied pattern (case-insensitive) to pass. Both
/// filters apply when both are given.
pub fn filter_entries<'a, I>(
    entries: I,
    level: Option<&'a str>,
    patterns: &'a [String],
) -> impl Iterator<Item = LogEntry> + 'a
where
    I: Iterator<Item = LogEntry> + 'a,
{
    entries.filter(move |entry| {
        if let Some(level_filter) = level {
            if !entry.matches_level(level_filter) {
                return false;
            }
        }
        patterns.iter().all(|pattern| entry.matches_pattern(pattern))
    })
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
    fn level_filter_uses_parsed_level() {
        let entries = parse_all(&[
            "2023-09-09 10:00:00 ERROR boom",
            "2023-09-09 10:00:01 INFO fine",
        ]);
        let kept: Vec<_> = filter_entries(entries.into_iter(), Some("error"), &[]).collect();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].message, "boom");
    }

    #[test]
    fn level_filter_falls_back_to_substring() {
        let entries = parse_all(&["no parsed severity but ERR appears", "nothing relevant"]);
        let kept: Vec<_> = filter_entries(entries.into_iter(), Some("err"), &[]).collect();
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn patterns_are_conjunctive() {
        let entries = parse_all(&[
            "DB timeout during backup",
            "db error unrelated",
            "timeout in scheduler",
        ]);
        let patterns = vec!["db".to_string(), "timeout".to_string()];
        let kept: Vec<_> = filter_entries(entries.into_iter(), None, &patterns).collect();
        assert_eq!(kept.len(), 1);
        assert!(kept[0].raw_line.contains("backup"));
    }

    #[test]
    fn level_and_patterns_combine() {
        let entries = parse_all(&[
            "2023-09-09 10:00:00 ERROR db timeout",
            "2023-09-09 10:00:01 ERROR db ok",
            "2023-09-09 10:00:02 WARN db timeout",
        ]);
        let patterns = vec!["timeout".to_string()];
        let kept: Vec<_> =
            filter_entries(entries.into_iter(), Some("ERROR"), &patterns).collect();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].message, "db timeout");
    }
}
